use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::thumbnail::{ThumbnailConfig, ThumbnailSettings};

/// 读取 JSON 设置文件。文件不存在时返回 `None`。
pub fn load_settings(path: &Path) -> Result<Option<ThumbnailSettings>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    let parsed = serde_json::from_str::<ThumbnailSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

    Ok(Some(parsed))
}

/// 在默认配置上合并设置文件；未提供路径时直接返回默认配置。
///
/// 路径由调用方显式给出，文件缺失视为错误。
pub fn resolve_config(path: Option<&Path>) -> Result<ThumbnailConfig, AppError> {
    let mut config = ThumbnailConfig::default();

    let Some(path) = path else {
        return Ok(config);
    };

    let settings = load_settings(path)?
        .ok_or_else(|| AppError::Settings(format!("设置文件不存在: {}", path.display())))?;
    config.apply_settings(&settings)?;
    log::info!("⚙️ 已加载设置文件: {}", path.display());

    Ok(config)
}
