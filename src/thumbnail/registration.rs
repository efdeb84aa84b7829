//! # 注册导出解码模块
//!
//! ## 设计思路
//!
//! `.verid` 是注册导出容器：一个 JSON 对象，`faces` 为不透明的人脸模板数组，
//! `profilePicture` 为 base64 编码的头像。
//! 编排层只依赖 `ContainerDecodable`，容器内部编码可以整体替换。
//!
//! ## 实现思路
//!
//! - 文件体积先按 metadata 校验，再一次性读入。
//! - JSON 结构不合法、base64 无法解码 → `MalformedRegistration`。
//! - 头像字段缺失、为 `null` 或为空 → `MissingProfilePicture`。

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;

use super::{ThumbnailConfig, ThumbnailError};

/// 解码后的注册数据。
#[derive(Debug, Clone, Default)]
pub struct RegistrationArchive {
    /// 人脸模板（由识别引擎解释，这里只透传）。
    pub faces: Vec<serde_json::Value>,
    /// 头像原始字节。
    pub profile_picture: Vec<u8>,
}

/// 解析注册导出容器的能力。
pub trait ContainerDecodable {
    fn registration_data(
        &self,
        file_path: &Path,
        config: &ThumbnailConfig,
    ) -> Result<RegistrationArchive, ThumbnailError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationFile {
    #[serde(default)]
    faces: Vec<serde_json::Value>,
    #[serde(default)]
    profile_picture: Option<String>,
}

/// 默认的 JSON 注册导出解码器。
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRegistrationDecoder;

impl JsonRegistrationDecoder {
    pub fn new() -> Self {
        Self
    }

    /// 从内存中的容器字节解码注册数据。
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<RegistrationArchive, ThumbnailError> {
        let file: RegistrationFile = serde_json::from_slice(bytes)
            .map_err(|e| ThumbnailError::MalformedRegistration(format!("JSON 解析失败：{}", e)))?;

        let encoded = file
            .profile_picture
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ThumbnailError::MissingProfilePicture)?;

        let profile_picture = Self::decode_picture(encoded)?;
        if profile_picture.is_empty() {
            return Err(ThumbnailError::MissingProfilePicture);
        }

        log::debug!(
            "🧾 注册数据解码完成 - faces={} profile_picture={} bytes",
            file.faces.len(),
            profile_picture.len()
        );

        Ok(RegistrationArchive {
            faces: file.faces,
            profile_picture,
        })
    }

    /// 头像字段既可能是纯 base64，也可能是 Data URL。
    fn decode_picture(encoded: &str) -> Result<Vec<u8>, ThumbnailError> {
        let payload = match encoded.strip_prefix("data:") {
            Some(rest) => {
                let marker = rest.find(";base64,").ok_or_else(|| {
                    ThumbnailError::MalformedRegistration("头像 Data URL 缺少 base64 标记".to_string())
                })?;
                &rest[marker + ";base64,".len()..]
            }
            None => encoded,
        };

        general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ThumbnailError::MalformedRegistration(format!("头像 base64 解码失败：{}", e)))
    }
}

impl ContainerDecodable for JsonRegistrationDecoder {
    fn registration_data(
        &self,
        file_path: &Path,
        config: &ThumbnailConfig,
    ) -> Result<RegistrationArchive, ThumbnailError> {
        log::info!("🪪 读取注册文件 - 路径: {}", file_path.display());

        let metadata = std::fs::metadata(file_path).map_err(|e| {
            ThumbnailError::MalformedRegistration(format!("无法读取文件信息：{}", e))
        })?;

        if metadata.len() > config.max_file_size {
            return Err(ThumbnailError::ResourceLimit(format!(
                "注册文件过大：{:.2} MB（限制：{:.2} MB）",
                metadata.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let bytes = std::fs::read(file_path).map_err(|e| {
            ThumbnailError::MalformedRegistration(format!("无法读取注册文件：{}", e))
        })?;

        self.decode_bytes(&bytes)
    }
}
