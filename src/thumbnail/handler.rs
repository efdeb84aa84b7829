//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ThumbnailHandler` 只负责流程编排与配置管理，不关心宿主协议细节。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 按扩展名分发（不做 I/O）
//! 3. 提取头像原始字节（归档读取器 / 注册解码器）
//! 4. 解码并计算 aspect-fill 几何
//! 5. 绘制到画布
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ThumbnailConfig>>` 支持运行时切换画质档位。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 任一阶段失败立即返回，不重试，不交出半成品画布。
//! - 记录 `extract/decode/draw/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::archive::{ImageExtractable, ZipArchiveReader};
use super::canvas::Canvas;
use super::geometry::{Size, aspect_fill_crop};
use super::pipeline::decode_image;
use super::registration::{ContainerDecodable, JsonRegistrationDecoder};
use super::source::{ContainerKind, RawImageData, RenderedThumbnail, ThumbnailReply, ThumbnailRequest};
use super::{ThumbnailConfig, ThumbnailError, ThumbnailQuality};

/// 缩略图处理器。
///
/// 持有配置与两个提取能力，可在多个线程间共享。
pub struct ThumbnailHandler {
    config: Arc<RwLock<ThumbnailConfig>>,
    archive_reader: Box<dyn ImageExtractable + Send + Sync>,
    registration_decoder: Box<dyn ContainerDecodable + Send + Sync>,
}

impl ThumbnailHandler {
    /// 使用默认的 zip 读取器与 JSON 注册解码器创建处理器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use verid_thumbnails::thumbnail::{Size, ThumbnailConfig, ThumbnailHandler, ThumbnailRequest};
    ///
    /// let handler = ThumbnailHandler::new(ThumbnailConfig::default());
    /// let request = ThumbnailRequest::new("Ver-ID registration.verid", Size::new(128.0, 128.0));
    /// let thumbnail = handler.render(&request)?;
    /// thumbnail.image.save("thumbnail.png").ok();
    /// # Ok::<(), verid_thumbnails::thumbnail::ThumbnailError>(())
    /// ```
    pub fn new(config: ThumbnailConfig) -> Self {
        Self::with_collaborators(
            config,
            Box::new(ZipArchiveReader::new()),
            Box::new(JsonRegistrationDecoder::new()),
        )
    }

    /// 注入自定义的提取能力（测试或替换容器编码时使用）。
    pub fn with_collaborators(
        config: ThumbnailConfig,
        archive_reader: Box<dyn ImageExtractable + Send + Sync>,
        registration_decoder: Box<dyn ContainerDecodable + Send + Sync>,
    ) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            archive_reader,
            registration_decoder,
        }
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub fn config_snapshot(&self) -> Result<ThumbnailConfig, ThumbnailError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ThumbnailError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 设置画质档位。
    pub fn set_quality(&self, quality: ThumbnailQuality) -> Result<(), ThumbnailError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ThumbnailError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_quality(quality);

        log::info!(
            "⚙️ 已切换缩略图画质档位：{}（filter={:?}）",
            quality.as_str(),
            config.resize_filter
        );

        Ok(())
    }

    /// 获取当前生效档位。
    pub fn quality(&self) -> Result<ThumbnailQuality, ThumbnailError> {
        let config = self
            .config
            .read()
            .map_err(|_| ThumbnailError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_quality())
    }

    /// 宿主入口：只交还“完整缩略图”或“失败”，错误细节只进日志。
    pub fn provide_thumbnail(&self, request: &ThumbnailRequest) -> ThumbnailReply {
        match self.render(request) {
            Ok(thumbnail) => ThumbnailReply::Rendered(thumbnail),
            Err(err) => {
                log::warn!(
                    "❌ 缩略图生成失败 - 文件: {} 类型: {} 原因: {}",
                    request.file_path.display(),
                    err.kind(),
                    err
                );
                ThumbnailReply::Failed
            }
        }
    }

    /// 执行完整缩略图链路，返回带类型的错误便于诊断。
    pub fn render(&self, request: &ThumbnailRequest) -> Result<RenderedThumbnail, ThumbnailError> {
        self.render_with_cancellation(request, || false)
    }

    /// 与 `render` 相同，但在每个阶段之间询问宿主是否已放弃该请求。
    pub fn render_with_cancellation<C>(
        &self,
        request: &ThumbnailRequest,
        is_cancelled: C,
    ) -> Result<RenderedThumbnail, ThumbnailError>
    where
        C: Fn() -> bool,
    {
        let total_start = Instant::now();

        let kind = ContainerKind::from_path(&request.file_path)?;
        request.validate()?;
        let config = self.config_snapshot()?;
        ensure_not_cancelled(&is_cancelled)?;

        let extract_start = Instant::now();
        let raw = self.extract_raw_image(kind, request, &config)?;
        let extract_elapsed = extract_start.elapsed();
        ensure_not_cancelled(&is_cancelled)?;

        let decode_start = Instant::now();
        let decoded = decode_image(raw, &config)?;
        let decode_elapsed = decode_start.elapsed();
        ensure_not_cancelled(&is_cancelled)?;

        let draw_start = Instant::now();
        let geometry = aspect_fill_crop(
            Size::new(decoded.width as f64, decoded.height as f64),
            request.maximum_size,
        )?;
        let mut canvas = Canvas::new(request.maximum_size, request.scale, &config)?;
        canvas.draw_image(&decoded.image, geometry.draw_rect, config.resize_filter)?;
        let draw_elapsed = draw_start.elapsed();
        ensure_not_cancelled(&is_cancelled)?;

        log::info!(
            "✅ 缩略图生成完成 - {} {}x{} -> {}x{} extract={}ms decode={}ms draw={}ms total={}ms",
            kind.as_str(),
            decoded.width,
            decoded.height,
            canvas.width(),
            canvas.height(),
            extract_elapsed.as_millis(),
            decode_elapsed.as_millis(),
            draw_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(RenderedThumbnail {
            image: canvas.into_image(),
            geometry,
            source_width: decoded.width,
            source_height: decoded.height,
        })
    }

    fn extract_raw_image(
        &self,
        kind: ContainerKind,
        request: &ThumbnailRequest,
        config: &ThumbnailConfig,
    ) -> Result<RawImageData, ThumbnailError> {
        match kind {
            ContainerKind::Zip => {
                let bytes = self.archive_reader.extract_image(&request.file_path, config)?;
                Ok(RawImageData {
                    bytes,
                    source_hint: "zip",
                })
            }
            ContainerKind::Registration => {
                let registration = self
                    .registration_decoder
                    .registration_data(&request.file_path, config)?;
                if registration.profile_picture.is_empty() {
                    return Err(ThumbnailError::MissingProfilePicture);
                }
                log::debug!("🪪 注册数据包含 {} 个人脸模板", registration.faces.len());
                Ok(RawImageData {
                    bytes: registration.profile_picture,
                    source_hint: "registration",
                })
            }
        }
    }
}

fn ensure_not_cancelled<C: Fn() -> bool>(is_cancelled: &C) -> Result<(), ThumbnailError> {
    if is_cancelled() {
        log::debug!("🛑 宿主已取消缩略图请求");
        return Err(ThumbnailError::Cancelled);
    }
    Ok(())
}
