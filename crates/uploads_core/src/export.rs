use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::ScraperError;
use crate::models::VideoRecord;
use crate::timestamp::filename_timestamp;

/// 无数据与序列化失败统一产出的两字节哨兵，历史契约，保持不变。
pub const EMPTY_SENTINEL: &[u8] = b"{}";

/// 导出产物的扁平字段子集。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportRecord {
    pub bvid: String,
    pub title: String,
    pub description: String,
    pub pic: String,
    pub created_str: String,
    pub duration: String,
}

impl From<&VideoRecord> for ExportRecord {
    fn from(video: &VideoRecord) -> Self {
        Self {
            bvid: video.bvid.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            pic: video.pic.clone(),
            created_str: video.created_str.clone(),
            // 列表接口的length字段即时长文本
            duration: video.length.clone(),
        }
    }
}

/// 序列化为UTF-8 JSON，2空格缩进，非ASCII字符原样保留。
/// 空列表与序列化失败都退化为`{}`哨兵而非报错。
pub fn export_json(records: &[ExportRecord]) -> Vec<u8> {
    if records.is_empty() {
        return EMPTY_SENTINEL.to_vec();
    }
    match serde_json::to_vec_pretty(records) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("JSON数据准备失败: {err}");
            EMPTY_SENTINEL.to_vec()
        }
    }
}

pub fn export_filename(username: &str) -> String {
    format!("videos_{}_{}.json", username, filename_timestamp())
}

pub fn write_export(path: &Path, records: &[ExportRecord]) -> Result<PathBuf, ScraperError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, export_json(records))?;
    Ok(path.to_path_buf())
}
