//! # 解码流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先做签名与尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 文件签名识别，拒绝空内容与非图片内容
//! 2. 读取 header 尺寸与 EXIF 方向，按像素与内存上限快速拒绝
//! 3. 完整解码，按方向旋转/翻转后复核尺寸

use std::io::Cursor;

use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader};

use super::source::RawImageData;
use super::{ThumbnailConfig, ThumbnailError};

/// 解码阶段输出。
pub(crate) struct DecodedImage {
    pub(crate) image: DynamicImage,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// 将提取出的原始字节解码为位图。
///
/// 输出的宽高已按 EXIF 方向校正，几何计算直接使用显示方向的尺寸。
pub(crate) fn decode_image(
    raw: RawImageData,
    config: &ThumbnailConfig,
) -> Result<DecodedImage, ThumbnailError> {
    validate_image_signature(&raw.bytes)?;

    let mut decoder = ImageReader::new(Cursor::new(raw.bytes.as_slice()))
        .with_guessed_format()
        .map_err(|e| ThumbnailError::ImageDecode(format!("无法识别图片格式：{}", e)))?
        .into_decoder()
        .map_err(|e| ThumbnailError::ImageDecode(format!("无法读取图片头：{}", e)))?;

    // 方向信息缺失或损坏时按原样显示
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let (header_width, header_height) = oriented_dimensions(decoder.dimensions(), orientation);
    validate_pixel_limits(config, header_width, header_height)?;
    validate_decoded_memory_limits(config, header_width, header_height)?;

    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|e| ThumbnailError::ImageDecode(e.to_string()))?;
    image.apply_orientation(orientation);

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ThumbnailError::ImageDecode("图片尺寸为 0".to_string()));
    }
    validate_pixel_limits(config, width, height)?;

    log::info!(
        "✅ 图片解码成功 - 来源: {} 尺寸: {}x{} 方向: {:?}",
        raw.source_hint,
        width,
        height,
        orientation
    );

    Ok(DecodedImage {
        image,
        width,
        height,
    })
}

/// 旋转 90°/270° 的方向会交换宽高。
fn oriented_dimensions((width, height): (u32, u32), orientation: Orientation) -> (u32, u32) {
    match orientation {
        Orientation::Rotate90
        | Orientation::Rotate270
        | Orientation::Rotate90FlipH
        | Orientation::Rotate270FlipH => (height, width),
        _ => (width, height),
    }
}

fn validate_image_signature(bytes: &[u8]) -> Result<(), ThumbnailError> {
    if bytes.is_empty() {
        return Err(ThumbnailError::ImageDecode("图片内容为空".to_string()));
    }

    let kind = infer::get(bytes)
        .ok_or_else(|| ThumbnailError::ImageDecode("无法识别图片类型".to_string()))?;

    if kind.matcher_type() != infer::MatcherType::Image {
        return Err(ThumbnailError::ImageDecode(format!(
            "文件签名不是图片类型：{}",
            kind.mime_type()
        )));
    }

    Ok(())
}

fn validate_pixel_limits(
    config: &ThumbnailConfig,
    width: u32,
    height: u32,
) -> Result<(), ThumbnailError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| ThumbnailError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels > config.max_decoded_pixels {
        return Err(ThumbnailError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}

fn validate_decoded_memory_limits(
    config: &ThumbnailConfig,
    width: u32,
    height: u32,
) -> Result<(), ThumbnailError> {
    let estimated = (width as u64)
        .checked_mul(height as u64)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or_else(|| ThumbnailError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

    if estimated > config.max_decoded_bytes {
        return Err(ThumbnailError::ResourceLimit(format!(
            "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
            estimated as f64 / 1024.0 / 1024.0,
            config.max_decoded_bytes as f64 / 1024.0 / 1024.0
        )));
    }

    Ok(())
}
