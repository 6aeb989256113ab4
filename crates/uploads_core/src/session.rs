use std::path::{Path, PathBuf};

use tokio::runtime::Builder;

use crate::client::BiliClient;
use crate::collector::{collect_videos, Collection};
use crate::config::Credential;
use crate::errors::ScraperError;
use crate::export::{export_filename, write_export, ExportRecord};
use crate::models::{UserProfile, VideoRecord};
use crate::selection::{keyword_match, parse_keywords, MatchField, MatchMode, Selection};

/// 凭据校验结论。ok为false时message是给操作者看的诊断文本，
/// 单次往返、不重试，是否重新输入由调用方决定。
#[derive(Debug, Clone)]
pub struct CredentialCheck {
    pub ok: bool,
    pub message: String,
}

pub async fn validate_credential(
    client: &BiliClient,
    credential: &Credential,
) -> CredentialCheck {
    let uid = match credential.uid() {
        Ok(uid) => uid,
        Err(err) => {
            return CredentialCheck {
                ok: false,
                message: err.to_string(),
            }
        }
    };
    match client.get_user_profile(uid).await {
        Ok(profile) if !profile.name.is_empty() => CredentialCheck {
            ok: true,
            message: profile.name,
        },
        Ok(_) => CredentialCheck {
            ok: false,
            message: "无法获取用户信息".to_string(),
        },
        Err(err) => CredentialCheck {
            ok: false,
            message: format!("验证失败: {err}"),
        },
    }
}

pub fn validate_credential_blocking(
    client: &BiliClient,
    credential: &Credential,
) -> Result<CredentialCheck, ScraperError> {
    let rt = runtime()?;
    Ok(rt.block_on(validate_credential(client, credential)))
}

/// 一次操作会话的全部可变状态：用户资料、抓取结果与勾选向量。
/// 取代原实现里的全局会话字典，所有操作都显式经过该对象。
pub struct ScrapeSession {
    client: BiliClient,
    profile: Option<UserProfile>,
    collection: Collection,
    selection: Selection,
}

impl ScrapeSession {
    pub fn new(client: BiliClient) -> Self {
        Self {
            client,
            profile: None,
            collection: Collection::default(),
            selection: Selection::default(),
        }
    }

    pub fn client(&self) -> &BiliClient {
        &self.client
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn videos(&self) -> &[VideoRecord] {
        &self.collection.videos
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// 抓取目标用户近 `months_back` 个月的投稿并重置勾选向量。
    /// 用户资料获取失败会报错；翻页失败按既有约定静默截断。
    pub async fn fetch_videos(&mut self, uid: u64, months_back: u32) -> Result<(), ScraperError> {
        let profile = self.client.get_user_profile(uid).await?;
        let collection = collect_videos(&self.client, uid, months_back).await;
        self.selection.sync_len(collection.len());
        self.profile = Some(profile);
        self.collection = collection;
        Ok(())
    }

    pub fn fetch_videos_blocking(&mut self, uid: u64, months_back: u32) -> Result<(), ScraperError> {
        let rt = runtime()?;
        rt.block_on(self.fetch_videos(uid, months_back))
    }

    pub fn select_all(&mut self) {
        self.selection.select_all();
    }

    pub fn clear_all(&mut self) {
        self.selection.clear_all();
    }

    pub fn invert_all(&mut self) {
        self.selection.invert_all();
    }

    /// 把命中关键词的条目并入勾选，返回命中条数。
    pub fn keyword_select(&mut self, field: MatchField, input: &str, mode: MatchMode) -> usize {
        self.with_matches(field, input, mode, |selection, matches| {
            selection.apply_select(matches)
        })
    }

    /// 仅翻转命中条目的勾选状态，返回命中条数。
    pub fn keyword_invert(&mut self, field: MatchField, input: &str, mode: MatchMode) -> usize {
        self.with_matches(field, input, mode, |selection, matches| {
            selection.apply_invert_on_match(matches)
        })
    }

    /// 勾选整体替换为命中集合，返回命中条数。
    pub fn keyword_restrict(&mut self, field: MatchField, input: &str, mode: MatchMode) -> usize {
        self.with_matches(field, input, mode, |selection, matches| {
            selection.apply_restrict_to(matches)
        })
    }

    fn with_matches<F>(&mut self, field: MatchField, input: &str, mode: MatchMode, apply: F) -> usize
    where
        F: FnOnce(&mut Selection, &[bool]),
    {
        let keywords = parse_keywords(input);
        if keywords.is_empty() {
            return 0;
        }
        let matches = keyword_match(&self.collection.videos, field, &keywords, mode);
        let matched = matches.iter().filter(|hit| **hit).count();
        apply(&mut self.selection, &matches);
        matched
    }

    pub fn manual_edit(&mut self, new_flags: Vec<bool>) -> Result<(), ScraperError> {
        self.selection.manual_edit(new_flags)
    }

    pub fn toggle(&mut self, index: usize) -> Result<(), ScraperError> {
        self.selection.toggle(index)
    }

    pub fn selected_records(&self) -> Vec<ExportRecord> {
        self.selection
            .selected_indices()
            .into_iter()
            .filter_map(|idx| self.collection.videos.get(idx))
            .map(ExportRecord::from)
            .collect()
    }

    /// 导出勾选的视频到 `dir` 下的带时间戳文件，返回路径与条数。
    pub fn export_selected(&self, dir: &Path) -> Result<(PathBuf, usize), ScraperError> {
        let records = self.selected_records();
        let username = self
            .profile
            .as_ref()
            .map(|profile| profile.name.as_str())
            .unwrap_or("unknown");
        let path = dir.join(export_filename(username));
        let written = write_export(&path, &records)?;
        Ok((written, records.len()))
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, ScraperError> {
    Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| ScraperError::Other(format!("Tokio运行时初始化失败: {err}")))
}
