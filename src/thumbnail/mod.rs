//! # 缩略图模块（thumbnail）
//!
//! ## 设计思路
//!
//! 该模块把“扩展名分发 → 提取头像字节 → 解码 → 几何计算 → 绘制”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `handler`：编排整条处理流水线
//! - `archive`：从 zip 归档中按标记提取头像（`ImageExtractable`）
//! - `registration`：解析 `.verid` 注册导出（`ContainerDecodable`）
//! - `pipeline`：签名识别、资源上限与解码
//! - `geometry`：aspect-fit / aspect-fill 几何
//! - `canvas`：裁剪、重采样与合成
//! - `config/error/source`：配置、错误、请求与中间数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 宿主（CLI / 嵌入方）
//!    ↓
//! handler.rs（配置快照 + 扩展名分发 + 阶段耗时日志）
//!    ├─ archive.rs / registration.rs（取出原始字节）
//!    ├─ pipeline.rs（签名 + 像素限制 + 解码）
//!    ├─ geometry.rs（aspect-fill 裁剪矩形）
//!    └─ canvas.rs（绘制到目标尺寸画布）
//!    ↓
//! RenderedThumbnail / ThumbnailReply::Failed
//! ```

pub mod archive;
pub mod canvas;
mod config;
mod error;
pub mod geometry;
mod handler;
mod pipeline;
pub mod registration;
mod source;

pub use archive::{ImageExtractable, ZipArchiveReader};
pub use canvas::Canvas;
pub use config::{DEFAULT_PROFILE_ENTRY_TOKEN, ThumbnailConfig, ThumbnailQuality, ThumbnailSettings};
pub use error::ThumbnailError;
pub use geometry::{CropGeometry, Point, Rect, Size, aspect_fill_crop, aspect_fit_rect};
pub use handler::ThumbnailHandler;
pub use registration::{ContainerDecodable, JsonRegistrationDecoder, RegistrationArchive};
pub use source::{ContainerKind, RenderedThumbnail, ThumbnailReply, ThumbnailRequest};
