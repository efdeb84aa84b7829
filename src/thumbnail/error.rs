//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 缩略图链路的每个阶段（分发 → 提取 → 解码 → 几何 → 绘制）都有独立的错误分支，
//! 调用侧可按分支匹配做诊断；宿主协议只关心成功/失败，由 `ThumbnailReply` 折叠。
//! 通过 `thiserror` 保持人类可读错误。

/// 缩略图处理统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    /// 扩展名不在支持列表内（在任何 I/O 之前判定）。
    #[error("不支持的文件格式：{0}")]
    UnsupportedFormat(String),

    #[error("无法打开归档：{0}")]
    ArchiveOpen(String),

    #[error("注册文件格式错误：{0}")]
    MalformedRegistration(String),

    /// 归档中没有任何路径包含头像标记的条目。
    #[error("归档中没有路径包含 \"{0}\" 的条目")]
    EntryNotFound(String),

    #[error("注册文件缺少头像数据")]
    MissingProfilePicture,

    #[error("解压失败：{0}")]
    Extraction(String),

    #[error("图片解码失败：{0}")]
    ImageDecode(String),

    #[error("绘制失败：{0}")]
    Render(String),

    #[error("请求参数无效：{0}")]
    InvalidRequest(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("请求已被宿主取消")]
    Cancelled,
}

impl ThumbnailError {
    /// 稳定的错误分类标签，用于日志与诊断输出。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::ArchiveOpen(_) => "archive_open",
            Self::MalformedRegistration(_) => "malformed_registration",
            Self::EntryNotFound(_) => "entry_not_found",
            Self::MissingProfilePicture => "missing_profile_picture",
            Self::Extraction(_) => "extraction",
            Self::ImageDecode(_) => "image_decode",
            Self::Render(_) => "render",
            Self::InvalidRequest(_) => "invalid_request",
            Self::ResourceLimit(_) => "resource_limit",
            Self::Cancelled => "cancelled",
        }
    }
}

impl From<ThumbnailError> for String {
    fn from(error: ThumbnailError) -> Self {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_are_stable() {
        assert_eq!(ThumbnailError::MissingProfilePicture.kind(), "missing_profile_picture");
        assert_eq!(
            ThumbnailError::EntryNotFound("image".to_string()).kind(),
            "entry_not_found"
        );
        assert_eq!(ThumbnailError::Cancelled.kind(), "cancelled");
    }

    #[test]
    fn display_includes_detail() {
        let err = ThumbnailError::UnsupportedFormat("txt".to_string());
        let message: String = err.into();
        assert!(message.contains("txt"));
    }
}
