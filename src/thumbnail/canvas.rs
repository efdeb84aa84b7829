//! # 画布绘制模块
//!
//! ## 设计思路
//!
//! `Canvas` 对应宿主提供的绘制上下文：尺寸以设备无关单位给出，
//! 内部按 `scale` 换算为像素。`draw_image` 把整张源图画进一个矩形（可超出画布），
//! 只对落在画布内的部分重采样，避免为被裁掉的区域分配内存。
//!
//! ## 实现思路
//!
//! 1. 矩形换算为像素坐标，并与画布求交
//! 2. 交集向外取整对齐到像素，反推源图上的可见窗口
//! 3. `fast_image_resize` 按窗口裁剪并缩放，失败时回退 `image` 自带缩放
//! 4. 合成到画布对应位置
//!
//! 绘制失败时返回错误，画布由调用方丢弃，不会作为结果交还宿主。

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageBuffer, Rgba, RgbaImage};

use super::geometry::{Rect, Size};
use super::{ThumbnailConfig, ThumbnailError};

/// RGBA 绘制画布，初始全透明。
pub struct Canvas {
    pixels: RgbaImage,
    scale: f64,
}

impl Canvas {
    /// 按目标尺寸与缩放系数创建画布。
    pub fn new(size: Size, scale: f64, config: &ThumbnailConfig) -> Result<Self, ThumbnailError> {
        if !size.is_positive() || !scale.is_finite() || scale <= 0.0 {
            return Err(ThumbnailError::InvalidRequest(format!(
                "画布参数无效：{}x{} @{}",
                size.width, size.height, scale
            )));
        }

        let width = (size.width * scale).round().max(1.0);
        let height = (size.height * scale).round().max(1.0);
        let limit = config.max_canvas_dimension as f64;

        if width > limit || height > limit {
            return Err(ThumbnailError::ResourceLimit(format!(
                "画布过大：{}x{}（单边限制：{}）",
                width, height, config.max_canvas_dimension
            )));
        }

        Ok(Self {
            pixels: RgbaImage::new(width as u32, height as u32),
            scale,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// 将整张 `image` 画进 `rect`（设备无关单位，原点可为负）。
    pub fn draw_image(
        &mut self,
        image: &DynamicImage,
        rect: Rect,
        filter: FilterType,
    ) -> Result<(), ThumbnailError> {
        if !rect.is_finite() || !rect.size.is_positive() {
            return Err(ThumbnailError::Render(format!(
                "绘制矩形无效：({}, {}) {}x{}",
                rect.min_x(),
                rect.min_y(),
                rect.width(),
                rect.height()
            )));
        }

        let (image_width, image_height) = image.dimensions();
        if image_width == 0 || image_height == 0 {
            return Err(ThumbnailError::Render("源图尺寸为 0".to_string()));
        }

        let dest_x = rect.min_x() * self.scale;
        let dest_y = rect.min_y() * self.scale;
        let dest_w = rect.width() * self.scale;
        let dest_h = rect.height() * self.scale;

        let canvas_w = self.pixels.width() as f64;
        let canvas_h = self.pixels.height() as f64;

        let left = dest_x.max(0.0);
        let top = dest_y.max(0.0);
        let right = (dest_x + dest_w).min(canvas_w);
        let bottom = (dest_y + dest_h).min(canvas_h);

        if right <= left || bottom <= top {
            log::debug!("🖌️ 绘制矩形完全位于画布之外，跳过");
            return Ok(());
        }

        let px_left = left.floor();
        let px_top = top.floor();
        let px_right = right.ceil().min(canvas_w);
        let px_bottom = bottom.ceil().min(canvas_h);
        let patch_width = (px_right - px_left) as u32;
        let patch_height = (px_bottom - px_top) as u32;

        let x_ratio = image_width as f64 / dest_w;
        let y_ratio = image_height as f64 / dest_h;
        let src_x = ((px_left - dest_x) * x_ratio).clamp(0.0, image_width as f64);
        let src_y = ((px_top - dest_y) * y_ratio).clamp(0.0, image_height as f64);
        let src_w = ((px_right - px_left) * x_ratio).min(image_width as f64 - src_x);
        let src_h = ((px_bottom - px_top) * y_ratio).min(image_height as f64 - src_y);

        if src_w <= 0.0 || src_h <= 0.0 || patch_width == 0 || patch_height == 0 {
            return Err(ThumbnailError::Render("可见源图区域为空".to_string()));
        }

        let window = Rect::new(src_x, src_y, src_w, src_h);
        let patch = match resize_with_fast_image_resize(image, window, patch_width, patch_height, filter) {
            Ok(patch) => patch,
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 重采样失败，回退 image::resize_exact：{}", err);
                resize_with_image(image, window, patch_width, patch_height, filter)?
            }
        };

        image::imageops::overlay(&mut self.pixels, &patch, px_left as i64, px_top as i64);

        log::debug!(
            "🖌️ 绘制完成 - 源窗口: ({:.1}, {:.1}) {:.1}x{:.1} → 画布: ({}, {}) {}x{}",
            src_x,
            src_y,
            src_w,
            src_h,
            px_left,
            px_top,
            patch_width,
            patch_height
        );

        Ok(())
    }
}

fn resize_with_fast_image_resize(
    image: &DynamicImage,
    window: Rect,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, ThumbnailError> {
    let src = image.to_rgba8();
    let (src_width, src_height) = src.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        src.into_raw(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| ThumbnailError::Render(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Convolution(to_fast_filter(filter)))
        .crop(window.min_x(), window.min_y(), window.width(), window.height());

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ThumbnailError::Render(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| ThumbnailError::Render("fast_image_resize 输出缓冲长度异常".to_string()))
}

/// 回退路径：整数像素裁剪后用 `image` 缩放。
fn resize_with_image(
    image: &DynamicImage,
    window: Rect,
    target_width: u32,
    target_height: u32,
    filter: FilterType,
) -> Result<RgbaImage, ThumbnailError> {
    let (image_width, image_height) = image.dimensions();
    let x = (window.min_x().floor() as u32).min(image_width.saturating_sub(1));
    let y = (window.min_y().floor() as u32).min(image_height.saturating_sub(1));
    let right = (window.max_x().ceil() as u32).clamp(x + 1, image_width);
    let bottom = (window.max_y().ceil() as u32).clamp(y + 1, image_height);

    let cropped = image.crop_imm(x, y, right - x, bottom - y);
    let resized = cropped.resize_exact(target_width, target_height, filter).to_rgba8();

    if resized.dimensions() != (target_width, target_height) {
        return Err(ThumbnailError::Render("回退缩放输出尺寸异常".to_string()));
    }

    Ok(resized)
}

fn to_fast_filter(filter: FilterType) -> fr::FilterType {
    match filter {
        FilterType::Nearest => fr::FilterType::Box,
        FilterType::Triangle => fr::FilterType::Bilinear,
        FilterType::CatmullRom => fr::FilterType::CatmullRom,
        FilterType::Gaussian => fr::FilterType::Mitchell,
        FilterType::Lanczos3 => fr::FilterType::Lanczos3,
    }
}
