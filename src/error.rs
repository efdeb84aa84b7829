//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 宿主程序（CLI）只面对一个 `AppError`：缩略图链路错误、设置文件错误、
//! 输出写入错误都收敛到这里，并映射为进程退出码。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ThumbnailError` / `std::io::Error` 提供 `From` 转换，无需手动 map。

use crate::thumbnail::ThumbnailError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 缩略图链路错误（分发 / 提取 / 解码 / 绘制）
    #[error("{0}")]
    Thumbnail(#[from] ThumbnailError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件无法读取或解析
    #[error("设置文件错误: {0}")]
    Settings(String),

    /// 缩略图写出失败
    #[error("写出缩略图失败: {0}")]
    Output(String),
}

impl AppError {
    /// 缩略图本身失败返回 1（宿主回退为通用图标），其他环境问题返回 2。
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Thumbnail(_) => 1,
            Self::Io(_) | Self::Settings(_) | Self::Output(_) => 2,
        }
    }

    /// 日志用分类标签。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Thumbnail(err) => err.kind(),
            Self::Io(_) => "io",
            Self::Settings(_) => "settings",
            Self::Output(_) => "output",
        }
    }
}
