use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::client::BiliClient;
use crate::errors::ScraperError;
use crate::models::VideoRecord;
use crate::timestamp::cutoff_epoch;

/// 单次抓取的总量上限。
pub const MAX_RECORDS: usize = 500;
/// 单次抓取的翻页上限。
pub const MAX_PAGES: u32 = 20;
/// 单页请求条数，上游接口最大50。
pub const PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    pub videos: Vec<VideoRecord>,
    /// 成功拉回的页数，中途失败的那次请求不计入。
    pub pages_fetched: u32,
    /// 翻页中途请求失败时置位。结果仍按“没有更多数据”返回，
    /// 前端据此提示结果可能不完整。
    pub fetch_degraded: bool,
}

impl Collection {
    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

/// 抓取用户最近 `months_back` 个月内的投稿。
pub async fn collect_videos(client: &BiliClient, uid: u64, months_back: u32) -> Collection {
    collect_since(client, uid, cutoff_epoch(months_back)).await
}

/// 逐页抓取并按发布时间过滤。上游按发布时间倒序返回，
/// 因此整页无命中即可提前终止，后续页只会更旧。
pub async fn collect_since(client: &BiliClient, uid: u64, cutoff: i64) -> Collection {
    let mut videos: Vec<VideoRecord> = Vec::new();
    let mut page = 1u32;
    let mut pages_fetched = 0u32;
    let mut continue_flag = true;
    let mut fetch_degraded = false;

    while videos.len() < MAX_RECORDS && page <= MAX_PAGES && continue_flag {
        let fetched = match client.get_user_videos(uid, page, PAGE_SIZE).await {
            Ok(records) => records,
            Err(err) => {
                warn_fetch_failure(page, &err);
                fetch_degraded = true;
                break;
            }
        };
        pages_fetched += 1;
        if fetched.is_empty() {
            break;
        }

        let added = append_in_window(&mut videos, fetched, cutoff);
        debug!("第{page}页命中{added}条，累计{}", videos.len());
        if added == 0 {
            continue_flag = false;
        }
        page += 1;
    }

    videos.truncate(MAX_RECORDS);
    Collection {
        videos,
        pages_fetched,
        fetch_degraded,
    }
}

/// 把一页中发布时间不早于cutoff的记录并入结果，返回并入条数。
pub fn append_in_window(videos: &mut Vec<VideoRecord>, page: Vec<VideoRecord>, cutoff: i64) -> usize {
    let mut added = 0usize;
    for record in page {
        if record.created >= cutoff {
            videos.push(record);
            added += 1;
        }
    }
    added
}

fn warn_fetch_failure(page: u32, err: &ScraperError) {
    warn!("第{page}页投稿抓取失败，按无更多数据处理: {err}");
}
