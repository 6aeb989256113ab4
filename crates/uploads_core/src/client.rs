use std::time::Duration;

use log::warn;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};
use serde::de::DeserializeOwned;

use crate::config::Credential;
use crate::errors::ScraperError;
use crate::models::{
    ApiResponse, CommentListPayload, CommentRecord, UserProfile, UserProfilePayload,
    VideoListPayload, VideoRecord,
};

pub const API_BASE: &str = "https://api.bilibili.com";
pub const PROFILE_PATH: &str = "/x/space/acc/info";
pub const VIDEOS_PATH: &str = "/x/space/arc/search";
pub const COMMENTS_PATH: &str = "/x/v2/reply";

pub const DEFAULT_HEADERS: [(&str, &str); 2] = [
    (
        "user-agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0 Safari/537.36",
    ),
    ("referer", "https://www.bilibili.com/"),
];

/// 评论分页之间的固定停顿，避免触发风控限流。
pub const COMMENT_PAGE_PAUSE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub credential: Option<Credential>,
    pub base_url: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            credential: None,
            base_url: None,
        }
    }
}

#[derive(Clone)]
pub struct BiliClient {
    client: Client,
    base_url: String,
}

impl BiliClient {
    pub fn new(options: ClientOptions) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        for (name, value) in DEFAULT_HEADERS.iter() {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        if let Some(credential) = &options.credential {
            headers.insert(
                HeaderName::from_static("cookie"),
                HeaderValue::from_str(&credential.cookie_header())
                    .map_err(|err| ScraperError::Auth(format!("Cookie格式无效: {err}")))?,
            );
        }

        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()
            .map_err(ScraperError::Request)?;

        let base_url = options
            .base_url
            .unwrap_or_else(|| API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self { client, base_url })
    }

    pub async fn get_user_profile(&self, uid: u64) -> Result<UserProfile, ScraperError> {
        let payload: UserProfilePayload = self
            .request(PROFILE_PATH, &[("mid", uid.to_string())])
            .await?;
        Ok(payload.into_profile(uid))
    }

    /// 拉取用户投稿的单页，空页是合法结果（表示没有更多数据）。
    pub async fn get_user_videos(
        &self,
        uid: u64,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<VideoRecord>, ScraperError> {
        let payload: VideoListPayload = self
            .request(
                VIDEOS_PATH,
                &[
                    ("mid", uid.to_string()),
                    ("pn", page.to_string()),
                    ("ps", page_size.to_string()),
                ],
            )
            .await?;
        Ok(payload
            .list
            .vlist
            .into_iter()
            .map(|item| item.into_record())
            .collect())
    }

    /// 按时间序抓取视频评论，逐页拉取，页间固定停顿1秒。
    /// 某页出错时仅记录日志并结束，已获取的评论原样返回。
    pub async fn get_video_comments(
        &self,
        aid: i64,
        max_pages: u32,
    ) -> Result<Vec<CommentRecord>, ScraperError> {
        let mut comments = Vec::new();
        let mut page = 1u32;
        while page <= max_pages {
            let payload: Result<CommentListPayload, ScraperError> = self
                .request(
                    COMMENTS_PATH,
                    &[
                        ("type", "1".to_string()),
                        ("oid", aid.to_string()),
                        ("pn", page.to_string()),
                        ("sort", "0".to_string()),
                    ],
                )
                .await;
            let replies = match payload {
                Ok(payload) => payload.replies.unwrap_or_default(),
                Err(err) => {
                    warn!("第{page}页评论抓取失败: {err}");
                    break;
                }
            };
            if replies.is_empty() {
                break;
            }
            comments.extend(replies.into_iter().map(|item| item.into_record()));
            page += 1;
            tokio::time::sleep(COMMENT_PAGE_PAUSE).await;
        }
        Ok(comments)
    }

    /// 抓取封面或头像，带防盗链请求头。
    pub async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, ScraperError> {
        let normalized = normalize_image_url(image_url);
        if normalized.is_empty() {
            return Err(ScraperError::InvalidInput("图片URL为空".to_string()));
        }
        let response = self
            .client
            .get(&normalized)
            .send()
            .await
            .map_err(ScraperError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Other(format!("图片加载失败，状态码: {status}")));
        }
        let bytes = response.bytes().await.map_err(ScraperError::Request)?;
        Ok(bytes.to_vec())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ScraperError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.get(&url);
        for (k, v) in params {
            req = req.query(&[(k, v.as_str())]);
        }
        let response = req.send().await.map_err(ScraperError::Request)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::Other(format!("HTTP请求失败: {status}")));
        }
        let bytes = response.bytes().await.map_err(ScraperError::Request)?;
        let payload: ApiResponse<T> = serde_json::from_slice(&bytes)
            .map_err(|err| ScraperError::InvalidJson(err.to_string()))?;
        if payload.code != 0 {
            return Err(ScraperError::Api {
                code: payload.code,
                message: payload.message.unwrap_or_else(|| "unknown".to_string()),
            });
        }
        payload
            .data
            .ok_or_else(|| ScraperError::InvalidJson("响应缺少data字段".to_string()))
    }
}

/// B站图片地址可能缺协议或仍为http，统一成https。
pub fn normalize_image_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("http://") {
        format!("https://{rest}")
    } else if trimmed.starts_with("//") {
        format!("https:{trimmed}")
    } else {
        trimmed.to_string()
    }
}
