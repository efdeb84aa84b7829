//! # Ver-ID 注册导出缩略图 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │        宿主 (verid-thumbnailer CLI / 嵌入方)              │
//! │   ThumbnailRequest { file_path, maximum_size, scale }    │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ render / provide_thumbnail
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓          thumbnail::ThumbnailHandler             │
//! │                                                          │
//! │  扩展名分发 ── zip ───────── ZipArchiveReader            │
//! │            └─ verid ─────── JsonRegistrationDecoder      │
//! │                     ↓ 头像原始字节                       │
//! │  pipeline（签名/限制/解码）→ geometry（aspect-fill）      │
//! │                     ↓                                    │
//! │  canvas（裁剪 + 重采样 + 合成）→ RenderedThumbnail        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`thumbnail`] | 缩略图链路：分发、提取、解码、几何、绘制 |
//! | [`error`] | 宿主程序的统一错误类型 `AppError` 与退出码 |
//! | [`settings`] | JSON 设置文件的读取与合并 |

pub mod error;
pub mod settings;
pub mod thumbnail;
