use chrono::{Local, TimeZone};
use url::Url;

use crate::errors::ScraperError;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const FILENAME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 每月按固定30天折算，刻意不做日历精确换算。
pub const SECONDS_PER_MONTH: i64 = 30 * 24 * 60 * 60;

pub fn format_epoch(epoch: i64) -> String {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

pub fn filename_timestamp() -> String {
    Local::now().format(FILENAME_FORMAT).to_string()
}

pub fn cutoff_epoch(months_back: u32) -> i64 {
    Local::now().timestamp() - i64::from(months_back) * SECONDS_PER_MONTH
}

/// 支持直接输入UID数字，或粘贴 space.bilibili.com 个人主页链接。
pub fn parse_uid(input: &str) -> Result<u64, ScraperError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ScraperError::InvalidInput("UID不能为空".to_string()));
    }
    if trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        return trimmed
            .parse::<u64>()
            .map_err(|_| ScraperError::InvalidInput(format!("UID数值无效: {trimmed}")));
    }

    let url = Url::parse(trimmed)
        .map_err(|err| ScraperError::InvalidInput(format!("URL解析失败: {err}")))?;
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.find(|s| !s.is_empty()))
        .unwrap_or_default();
    if segment.chars().all(|ch| ch.is_ascii_digit()) && !segment.is_empty() {
        segment
            .parse::<u64>()
            .map_err(|_| ScraperError::InvalidInput(format!("UID数值无效: {segment}")))
    } else {
        Err(ScraperError::InvalidInput(format!(
            "未能从链接中解析UID: {trimmed}"
        )))
    }
}
