//! # 归档提取模块
//!
//! ## 设计思路
//!
//! `ImageExtractable` 是“从通用归档里取出头像字节”的能力接口，
//! 编排层只依赖该接口，测试可以注入假实现。
//! 默认实现 `ZipArchiveReader` 基于 `zip` crate：
//!
//! 1. 只读打开归档，容器损坏或不可读 → `ArchiveOpen`
//! 2. 按中央目录顺序扫描，第一个路径包含标记（默认 `"image"`）的文件条目胜出
//! 3. 流式解压到内存，数据损坏或校验失败 → `Extraction`
//!
//! 子串匹配是宽松约定：任何路径里含有标记的条目都会被接受，
//! 例如 `images/thumbs/other.png` 也可能先于真正的头像命中。

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use super::{ThumbnailConfig, ThumbnailError};

const MAX_PREALLOCATION: u64 = 8 * 1024 * 1024;

/// 从通用归档中提取头像原始字节的能力。
pub trait ImageExtractable {
    fn extract_image(&self, archive_path: &Path, config: &ThumbnailConfig)
    -> Result<Vec<u8>, ThumbnailError>;
}

/// 基于 zip 的默认归档读取器。
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipArchiveReader;

impl ZipArchiveReader {
    pub fn new() -> Self {
        Self
    }

    /// 从任意可随机访问的数据源中提取头像字节。
    pub fn extract_from_reader<R: Read + Seek>(
        &self,
        reader: R,
        config: &ThumbnailConfig,
    ) -> Result<Vec<u8>, ThumbnailError> {
        let mut archive = zip::ZipArchive::new(reader)
            .map_err(|e| ThumbnailError::ArchiveOpen(format!("归档结构无效：{}", e)))?;

        let token = config.profile_entry_token.as_str();
        log::debug!("🗜️ 扫描归档条目 - 共 {} 个，标记: {:?}", archive.len(), token);

        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| ThumbnailError::ArchiveOpen(format!("无法读取第 {} 个条目：{}", index, e)))?;

            if entry.is_dir() || !entry.name().contains(token) {
                continue;
            }

            let name = entry.name().to_string();
            if entry.size() > config.max_file_size {
                return Err(ThumbnailError::ResourceLimit(format!(
                    "条目过大：{}（{:.2} MB，限制：{:.2} MB）",
                    name,
                    entry.size() as f64 / 1024.0 / 1024.0,
                    config.max_file_size as f64 / 1024.0 / 1024.0
                )));
            }

            log::info!("📦 命中头像条目 - {} ({} bytes)", name, entry.size());

            // 声明大小来自归档本身，预分配需设上限
            let capacity = entry.size().min(MAX_PREALLOCATION) as usize;
            let mut bytes = Vec::with_capacity(capacity);
            (&mut entry)
                .take(config.max_file_size.saturating_add(1))
                .read_to_end(&mut bytes)
                .map_err(|e| ThumbnailError::Extraction(format!("{}：{}", name, e)))?;

            if bytes.len() as u64 > config.max_file_size {
                return Err(ThumbnailError::ResourceLimit(format!(
                    "条目解压后超过大小限制：{}",
                    name
                )));
            }

            return Ok(bytes);
        }

        Err(ThumbnailError::EntryNotFound(token.to_string()))
    }
}

impl ImageExtractable for ZipArchiveReader {
    fn extract_image(
        &self,
        archive_path: &Path,
        config: &ThumbnailConfig,
    ) -> Result<Vec<u8>, ThumbnailError> {
        log::info!("📁 打开 zip 归档 - 路径: {}", archive_path.display());

        let file = File::open(archive_path)
            .map_err(|e| ThumbnailError::ArchiveOpen(format!("{}：{}", archive_path.display(), e)))?;

        self.extract_from_reader(BufReader::new(file), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thumbnail::ThumbnailSettings;
    use std::io::{Cursor, Write};
    use zip::CompressionMethod;
    use zip::write::SimpleFileOptions;

    fn build_zip(entries: &[(&str, &[u8])], method: CompressionMethod) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(method);
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, options).expect("add directory");
            } else {
                writer.start_file(*name, options).expect("start file");
                writer.write_all(data).expect("write entry");
            }
        }
        writer.finish().expect("finish zip").into_inner()
    }

    #[test]
    fn first_matching_entry_wins() {
        let bytes = build_zip(
            &[
                ("faces.json", b"[]"),
                ("profile_image.jpg", b"first"),
                ("second_image.png", b"second"),
            ],
            CompressionMethod::Deflated,
        );

        let extracted = ZipArchiveReader::new()
            .extract_from_reader(Cursor::new(bytes), &ThumbnailConfig::default())
            .expect("extract");

        assert_eq!(extracted, b"first");
    }

    #[test]
    fn substring_match_is_loose() {
        let bytes = build_zip(
            &[("nested/imagery/avatar.png", b"loose")],
            CompressionMethod::Stored,
        );

        let extracted = ZipArchiveReader::new()
            .extract_from_reader(Cursor::new(bytes), &ThumbnailConfig::default())
            .expect("extract");

        assert_eq!(extracted, b"loose");
    }

    #[test]
    fn directory_entries_are_skipped() {
        let bytes = build_zip(
            &[("images/", b""), ("images/face.png", b"payload")],
            CompressionMethod::Stored,
        );

        let extracted = ZipArchiveReader::new()
            .extract_from_reader(Cursor::new(bytes), &ThumbnailConfig::default())
            .expect("extract");

        assert_eq!(extracted, b"payload");
    }

    #[test]
    fn missing_entry_reports_token() {
        let bytes = build_zip(
            &[("faces.json", b"[]"), ("readme.txt", b"hello")],
            CompressionMethod::Deflated,
        );

        let result = ZipArchiveReader::new()
            .extract_from_reader(Cursor::new(bytes), &ThumbnailConfig::default());

        assert!(matches!(result, Err(ThumbnailError::EntryNotFound(token)) if token == "image"));
    }

    #[test]
    fn custom_token_is_honoured() {
        let bytes = build_zip(
            &[("profile_image.jpg", b"image"), ("avatar.png", b"avatar")],
            CompressionMethod::Stored,
        );
        let config = ThumbnailConfig {
            profile_entry_token: "avatar".to_string(),
            ..ThumbnailConfig::default()
        };

        let extracted = ZipArchiveReader::new()
            .extract_from_reader(Cursor::new(bytes), &config)
            .expect("extract");

        assert_eq!(extracted, b"avatar");
    }

    #[test]
    fn garbage_is_not_an_archive() {
        let result = ZipArchiveReader::new().extract_from_reader(
            Cursor::new(b"definitely not a zip file".to_vec()),
            &ThumbnailConfig::default(),
        );

        assert!(matches!(result, Err(ThumbnailError::ArchiveOpen(_))));
    }

    #[test]
    fn corrupt_entry_data_fails_extraction() {
        let payload: &[u8] = b"0123456789abcdef-payload-bytes";
        let mut bytes = build_zip(&[("profile_image.jpg", payload)], CompressionMethod::Stored);

        let position = bytes
            .windows(payload.len())
            .position(|window| window == payload)
            .expect("payload stored verbatim");
        bytes[position] ^= 0xFF;

        let result = ZipArchiveReader::new()
            .extract_from_reader(Cursor::new(bytes), &ThumbnailConfig::default());

        assert!(matches!(result, Err(ThumbnailError::Extraction(_))));
    }

    #[test]
    fn oversized_entry_hits_resource_limit() {
        let payload = vec![7u8; 4096];
        let bytes = build_zip(&[("profile_image.jpg", &payload)], CompressionMethod::Deflated);
        let config = ThumbnailConfig {
            max_file_size: 1024,
            ..ThumbnailConfig::default()
        };

        let result = ZipArchiveReader::new().extract_from_reader(Cursor::new(bytes), &config);

        assert!(matches!(result, Err(ThumbnailError::ResourceLimit(_))));
    }

    #[test]
    fn unbounded_size_limit_still_extracts() {
        let bytes = build_zip(&[("profile_image.jpg", b"payload")], CompressionMethod::Deflated);
        let mut config = ThumbnailConfig::default();
        config
            .apply_settings(&ThumbnailSettings {
                max_file_size: Some(u64::MAX),
                ..ThumbnailSettings::default()
            })
            .expect("u64::MAX is an accepted limit");

        let extracted = ZipArchiveReader::new()
            .extract_from_reader(Cursor::new(bytes), &config)
            .expect("extract");

        assert_eq!(extracted, b"payload");
    }

    #[test]
    fn missing_file_cannot_be_opened() {
        let result = ZipArchiveReader::new().extract_image(
            Path::new("/definitely/not/here/export.zip"),
            &ThumbnailConfig::default(),
        );

        assert!(matches!(result, Err(ThumbnailError::ArchiveOpen(_))));
    }
}
