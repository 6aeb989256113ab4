use serde::{Deserialize, Serialize};

use crate::errors::ScraperError;
use crate::models::VideoRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchField {
    Title,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// 命中任意一个关键词即算匹配。
    Any,
    /// 必须命中全部关键词才算匹配。
    All,
}

/// 解析关键词输入：含逗号按逗号切分，否则按空白切分，
/// 去除首尾空白并丢弃空token。
pub fn parse_keywords(input: &str) -> Vec<String> {
    let tokens: Vec<&str> = if input.contains(',') {
        input.split(',').collect()
    } else {
        input.split_whitespace().collect()
    };
    tokens
        .into_iter()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// 对每条记录做小写子串匹配，返回与记录列表等长的命中向量。
pub fn keyword_match(
    videos: &[VideoRecord],
    field: MatchField,
    keywords: &[String],
    mode: MatchMode,
) -> Vec<bool> {
    let lowered: Vec<String> = keywords.iter().map(|kw| kw.to_lowercase()).collect();
    videos
        .iter()
        .map(|video| {
            let haystack = match field {
                MatchField::Title => video.title.to_lowercase(),
                MatchField::Description => video.description.to_lowercase(),
            };
            match mode {
                MatchMode::Any => lowered.iter().any(|kw| haystack.contains(kw.as_str())),
                MatchMode::All => lowered.iter().all(|kw| haystack.contains(kw.as_str())),
            }
        })
        .collect()
}

/// 与视频列表等长的勾选向量，列表长度变化时整体重置。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    flags: Vec<bool>,
}

impl Selection {
    pub fn new(len: usize) -> Self {
        Self {
            flags: vec![false; len],
        }
    }

    /// 集合尺寸变化后重新对齐：重置为全false的新长度向量。
    pub fn sync_len(&mut self, len: usize) {
        if self.flags.len() != len {
            self.flags = vec![false; len];
        }
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn select_all(&mut self) {
        self.flags.iter_mut().for_each(|flag| *flag = true);
    }

    pub fn clear_all(&mut self) {
        self.flags.iter_mut().for_each(|flag| *flag = false);
    }

    pub fn invert_all(&mut self) {
        self.flags.iter_mut().for_each(|flag| *flag = !*flag);
    }

    /// 并集：命中的条目加入勾选，其余保持不变。
    pub fn apply_select(&mut self, matches: &[bool]) {
        for (flag, matched) in self.flags.iter_mut().zip(matches) {
            *flag |= *matched;
        }
    }

    /// 仅翻转命中的条目。
    pub fn apply_invert_on_match(&mut self, matches: &[bool]) {
        for (flag, matched) in self.flags.iter_mut().zip(matches) {
            if *matched {
                *flag = !*flag;
            }
        }
    }

    /// 覆盖：勾选状态替换为命中向量本身。
    pub fn apply_restrict_to(&mut self, matches: &[bool]) {
        for (flag, matched) in self.flags.iter_mut().zip(matches) {
            *flag = *matched;
        }
    }

    /// 外部编辑的整体替换，长度不符视为调用方错误。
    pub fn manual_edit(&mut self, new_flags: Vec<bool>) -> Result<(), ScraperError> {
        if new_flags.len() != self.flags.len() {
            return Err(ScraperError::InvalidInput(format!(
                "勾选向量长度不符: 期望{}，实际{}",
                self.flags.len(),
                new_flags.len()
            )));
        }
        self.flags = new_flags;
        Ok(())
    }

    pub fn toggle(&mut self, index: usize) -> Result<(), ScraperError> {
        match self.flags.get_mut(index) {
            Some(flag) => {
                *flag = !*flag;
                Ok(())
            }
            None => Err(ScraperError::InvalidInput(format!("序号超出范围: {index}"))),
        }
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(idx, flag)| flag.then_some(idx))
            .collect()
    }

    pub fn count_selected(&self) -> usize {
        self.flags.iter().filter(|flag| **flag).count()
    }
}
