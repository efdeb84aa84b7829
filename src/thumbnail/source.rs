//! # 请求与中间模型
//!
//! ## 设计思路
//!
//! 将“宿主输入”和“流水线中间结果”解耦：
//! - `ThumbnailRequest` 表示宿主的一次缩略图请求
//! - `ContainerKind` 表示按扩展名分发后的容器类型
//! - `RawImageData` 表示已提取但未解码的字节
//! - `RenderedThumbnail` / `ThumbnailReply` 表示交还宿主的结果

use std::path::{Path, PathBuf};

use image::RgbaImage;

use super::ThumbnailError;
use super::geometry::{CropGeometry, Size};

/// 宿主提交的一次缩略图请求。
#[derive(Debug, Clone)]
pub struct ThumbnailRequest {
    /// 源文件路径。
    pub file_path: PathBuf,
    /// 最大输出尺寸（设备无关单位）。
    pub maximum_size: Size,
    /// 每单位对应的像素数。
    pub scale: f64,
}

impl ThumbnailRequest {
    pub fn new(file_path: impl Into<PathBuf>, maximum_size: Size) -> Self {
        Self {
            file_path: file_path.into(),
            maximum_size,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// 校验尺寸与缩放系数，不触碰文件系统。
    pub(crate) fn validate(&self) -> Result<(), ThumbnailError> {
        if !self.maximum_size.is_positive() {
            return Err(ThumbnailError::InvalidRequest(format!(
                "最大尺寸必须为正数：{}x{}",
                self.maximum_size.width, self.maximum_size.height
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ThumbnailError::InvalidRequest(format!(
                "缩放系数必须为正数：{}",
                self.scale
            )));
        }
        Ok(())
    }
}

/// 按扩展名识别出的容器类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// 通用 zip 归档，交给 `ImageExtractable`。
    Zip,
    /// `.verid` / `.registration` 注册导出，交给 `ContainerDecodable`。
    Registration,
}

impl ContainerKind {
    /// 仅根据扩展名分发（ASCII 大小写不敏感），不做任何 I/O。
    pub fn from_path(path: &Path) -> Result<Self, ThumbnailError> {
        let extension = path.extension().ok_or_else(|| {
            ThumbnailError::UnsupportedFormat(format!("缺少扩展名：{}", path.display()))
        })?;
        let extension = extension.to_str().ok_or_else(|| {
            ThumbnailError::UnsupportedFormat(format!(
                "扩展名不是有效的 UTF-8：{}",
                extension.to_string_lossy()
            ))
        })?;

        match extension.to_ascii_lowercase().as_str() {
            "zip" => Ok(Self::Zip),
            "verid" | "registration" => Ok(Self::Registration),
            other => Err(ThumbnailError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::Registration => "registration",
        }
    }
}

/// 提取阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 绘制完成的缩略图。
#[derive(Debug, Clone)]
pub struct RenderedThumbnail {
    /// 画布像素（RGBA，未覆盖区域为透明）。
    pub image: RgbaImage,
    /// 本次绘制使用的几何信息。
    pub geometry: CropGeometry,
    pub source_width: u32,
    pub source_height: u32,
}

/// 交还宿主的结果：要么是完整的缩略图，要么是失败信号。
#[derive(Debug)]
pub enum ThumbnailReply {
    Rendered(RenderedThumbnail),
    Failed,
}

impl ThumbnailReply {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }

    pub fn into_thumbnail(self) -> Option<RenderedThumbnail> {
        match self {
            Self::Rendered(thumbnail) => Some(thumbnail),
            Self::Failed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_extension() {
        assert_eq!(
            ContainerKind::from_path(Path::new("/tmp/export.zip")).expect("zip"),
            ContainerKind::Zip
        );
        assert_eq!(
            ContainerKind::from_path(Path::new("/tmp/Ver-ID registration.verid")).expect("verid"),
            ContainerKind::Registration
        );
        assert_eq!(
            ContainerKind::from_path(Path::new("/tmp/user.REGISTRATION")).expect("registration"),
            ContainerKind::Registration
        );
    }

    #[test]
    fn unknown_or_missing_extension_is_unsupported() {
        assert!(matches!(
            ContainerKind::from_path(Path::new("/tmp/notes.txt")),
            Err(ThumbnailError::UnsupportedFormat(ext)) if ext == "txt"
        ));
        assert!(matches!(
            ContainerKind::from_path(Path::new("/tmp/no_extension")),
            Err(ThumbnailError::UnsupportedFormat(msg)) if msg.contains("缺少扩展名")
        ));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_extension_is_reported_separately() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/tmp/export.z\xFFp"));

        assert!(matches!(
            ContainerKind::from_path(path),
            Err(ThumbnailError::UnsupportedFormat(msg)) if msg.contains("UTF-8")
        ));
    }

    #[test]
    fn request_validation_rejects_bad_sizes() {
        let request = ThumbnailRequest::new("/tmp/a.zip", Size::new(0.0, 10.0));
        assert!(matches!(request.validate(), Err(ThumbnailError::InvalidRequest(_))));

        let request = ThumbnailRequest::new("/tmp/a.zip", Size::new(10.0, 10.0)).with_scale(0.0);
        assert!(matches!(request.validate(), Err(ThumbnailError::InvalidRequest(_))));

        let request = ThumbnailRequest::new("/tmp/a.zip", Size::new(10.0, 10.0)).with_scale(2.0);
        assert!(request.validate().is_ok());
    }
}
