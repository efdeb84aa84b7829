//! # Ver-ID 注册导出缩略图 — 命令行入口
//!
//! 本文件仅负责参数解析、日志初始化与结果写出。
//! 缩略图链路详见 `lib.rs` 架构文档。

mod cli;

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use image::{ImageFormat, RgbaImage};
use verid_thumbnails::error::AppError;
use verid_thumbnails::settings;
use verid_thumbnails::thumbnail::{Size, ThumbnailHandler, ThumbnailQuality, ThumbnailRequest};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("缩略图生成失败 [{}]: {}", err.kind(), err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = settings::resolve_config(cli.config.as_deref())?;
    let handler = ThumbnailHandler::new(config);

    if let Some(quality) = cli.quality.as_deref() {
        handler.set_quality(ThumbnailQuality::parse(quality)?)?;
    }

    let (width, height) = cli.maximum_size();
    let request =
        ThumbnailRequest::new(&cli.input, Size::new(width, height)).with_scale(cli.scale);

    // 失败时不创建输出文件，宿主自行回退为通用图标
    let thumbnail = handler.render(&request)?;

    write_png_atomically(&thumbnail.image, &cli.output)?;

    log::info!(
        "🖼️ 已写出缩略图 - {} ({}x{})",
        cli.output.display(),
        thumbnail.image.width(),
        thumbnail.image.height()
    );

    Ok(())
}

/// 先在内存中编码，再写入同目录临时文件并 rename 到目标路径。
///
/// 任一步失败都不会在 `output` 留下不完整的 PNG。
fn write_png_atomically(image: &RgbaImage, output: &Path) -> Result<(), AppError> {
    let mut encoded = Cursor::new(Vec::new());
    image
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(|e| AppError::Output(format!("PNG 编码失败: {}", e)))?;

    let tmp_path = temp_path_for(output);
    if let Err(e) = fs::write(&tmp_path, encoded.get_ref()) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AppError::Output(format!("{}: {}", tmp_path.display(), e)));
    }

    fs::rename(&tmp_path, output).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        AppError::Output(format!("{}: {}", output.display(), e))
    })
}

fn temp_path_for(output: &Path) -> PathBuf {
    let file_name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "thumbnail.png".to_string());
    output.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use image::Rgba;

    use super::*;

    fn unique_temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("verid-thumbnailer-{label}-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn output_is_written_without_leftover_temp_file() {
        let dir = unique_temp_dir("output");
        let output = dir.join("thumb.png");
        let image = RgbaImage::from_pixel(4, 3, Rgba([1, 2, 3, 255]));

        write_png_atomically(&image, &output).expect("write");

        let reloaded = image::open(&output).expect("reload").to_rgba8();
        assert_eq!(reloaded.dimensions(), (4, 3));
        let entries: Vec<_> = std::fs::read_dir(&dir).expect("list").collect();
        assert_eq!(entries.len(), 1);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn failed_write_leaves_no_output() {
        let dir = unique_temp_dir("output-missing");
        let output = dir.join("missing-subdir").join("thumb.png");
        let image = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));

        let result = write_png_atomically(&image, &output);

        assert!(matches!(result, Err(AppError::Output(_))));
        assert!(!output.exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
