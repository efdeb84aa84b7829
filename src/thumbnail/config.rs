//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ThumbnailConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中画质档位（quality / balanced / speed）作为高层语义，映射到底层重采样滤镜。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的平衡配置。
//! - `ThumbnailQuality` 负责档位字符串解析与反向输出。
//! - `ThumbnailSettings` 是设置文件的可选覆盖项，只覆盖出现的字段。

use image::imageops::FilterType;
use serde::Deserialize;

use super::ThumbnailError;

/// 默认的头像条目标记：归档内路径包含该子串即视为头像。
pub const DEFAULT_PROFILE_ENTRY_TOKEN: &str = "image";

/// 缩略图处理配置。
///
/// 字段覆盖了提取、解码与绘制三个阶段。
#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    /// 读取注册文件或解压单个条目时允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 画布单边最大像素数。
    pub max_canvas_dimension: u32,
    /// 归档条目匹配标记（子串匹配，先到先得）。
    pub profile_entry_token: String,
    /// 重采样滤镜策略。
    pub resize_filter: FilterType,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            max_canvas_dimension: 4096,
            profile_entry_token: DEFAULT_PROFILE_ENTRY_TOKEN.to_string(),
            resize_filter: FilterType::Triangle,
        }
    }
}

/// 缩略图画质档位。
///
/// - `Quality`：尽量保真
/// - `Balanced`：质量与性能平衡
/// - `Speed`：优先渲染速度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailQuality {
    Quality,
    Balanced,
    Speed,
}

impl ThumbnailQuality {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use verid_thumbnails::thumbnail::ThumbnailQuality;
    ///
    /// let q = ThumbnailQuality::parse("Balanced")?;
    /// assert_eq!(q.as_str(), "balanced");
    /// # Ok::<(), verid_thumbnails::thumbnail::ThumbnailError>(())
    /// ```
    pub fn parse(profile: &str) -> Result<Self, ThumbnailError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(ThumbnailError::InvalidRequest(format!(
                "未知画质档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    /// 将档位输出为稳定字符串。
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl ThumbnailConfig {
    /// 基于当前滤镜反推画质档位。
    pub fn infer_quality(&self) -> ThumbnailQuality {
        match self.resize_filter {
            FilterType::CatmullRom | FilterType::Lanczos3 | FilterType::Gaussian => {
                ThumbnailQuality::Quality
            }
            FilterType::Nearest => ThumbnailQuality::Speed,
            FilterType::Triangle => ThumbnailQuality::Balanced,
        }
    }

    /// 应用指定画质档位到实际参数。
    pub fn apply_quality(&mut self, quality: ThumbnailQuality) {
        self.resize_filter = match quality {
            ThumbnailQuality::Quality => FilterType::Lanczos3,
            ThumbnailQuality::Balanced => FilterType::Triangle,
            ThumbnailQuality::Speed => FilterType::Nearest,
        };
    }

    /// 合并设置文件中的覆盖项，并校验取值范围。
    pub fn apply_settings(&mut self, settings: &ThumbnailSettings) -> Result<(), ThumbnailError> {
        if let Some(max_file_size) = settings.max_file_size {
            if max_file_size == 0 {
                return Err(ThumbnailError::InvalidRequest(
                    "max_file_size 必须大于 0".to_string(),
                ));
            }
            self.max_file_size = max_file_size;
        }
        if let Some(max_decoded_pixels) = settings.max_decoded_pixels {
            if max_decoded_pixels == 0 {
                return Err(ThumbnailError::InvalidRequest(
                    "max_decoded_pixels 必须大于 0".to_string(),
                ));
            }
            self.max_decoded_pixels = max_decoded_pixels;
        }
        if let Some(max_decoded_bytes) = settings.max_decoded_bytes {
            if max_decoded_bytes < 1024 * 1024 {
                return Err(ThumbnailError::InvalidRequest(
                    "max_decoded_bytes 不能小于 1MB".to_string(),
                ));
            }
            self.max_decoded_bytes = max_decoded_bytes;
        }
        if let Some(max_canvas_dimension) = settings.max_canvas_dimension {
            if !(16..=16_384).contains(&max_canvas_dimension) {
                return Err(ThumbnailError::InvalidRequest(
                    "max_canvas_dimension 必须在 16~16384 之间".to_string(),
                ));
            }
            self.max_canvas_dimension = max_canvas_dimension;
        }
        if let Some(token) = settings.profile_entry_token.as_deref() {
            if token.is_empty() {
                return Err(ThumbnailError::InvalidRequest(
                    "profile_entry_token 不能为空".to_string(),
                ));
            }
            self.profile_entry_token = token.to_string();
        }
        if let Some(quality) = settings.quality.as_deref() {
            self.apply_quality(ThumbnailQuality::parse(quality)?);
        }
        Ok(())
    }
}

/// 设置文件中的可选覆盖项（JSON）。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    pub max_file_size: Option<u64>,
    pub max_decoded_pixels: Option<u64>,
    pub max_decoded_bytes: Option<u64>,
    pub max_canvas_dimension: Option<u32>,
    pub profile_entry_token: Option<String>,
    pub quality: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_roundtrips_through_config() {
        let mut config = ThumbnailConfig::default();
        assert_eq!(config.infer_quality(), ThumbnailQuality::Balanced);

        config.apply_quality(ThumbnailQuality::Speed);
        assert_eq!(config.infer_quality(), ThumbnailQuality::Speed);

        config.apply_quality(ThumbnailQuality::Quality);
        assert_eq!(config.infer_quality(), ThumbnailQuality::Quality);
    }

    #[test]
    fn unknown_quality_is_rejected() {
        assert!(matches!(
            ThumbnailQuality::parse("ultra"),
            Err(ThumbnailError::InvalidRequest(_))
        ));
    }

    #[test]
    fn settings_override_only_present_fields() {
        let settings: ThumbnailSettings =
            serde_json::from_str(r#"{ "profile_entry_token": "avatar", "quality": "speed" }"#)
                .expect("parse settings");

        let mut config = ThumbnailConfig::default();
        config.apply_settings(&settings).expect("apply settings");

        assert_eq!(config.profile_entry_token, "avatar");
        assert_eq!(config.resize_filter, FilterType::Nearest);
        assert_eq!(config.max_file_size, ThumbnailConfig::default().max_file_size);
    }

    #[test]
    fn settings_reject_out_of_range_values() {
        let mut config = ThumbnailConfig::default();

        let settings = ThumbnailSettings {
            max_canvas_dimension: Some(8),
            ..Default::default()
        };
        assert!(matches!(
            config.apply_settings(&settings),
            Err(ThumbnailError::InvalidRequest(_))
        ));

        let settings = ThumbnailSettings {
            profile_entry_token: Some(String::new()),
            ..Default::default()
        };
        assert!(matches!(
            config.apply_settings(&settings),
            Err(ThumbnailError::InvalidRequest(_))
        ));
    }
}
