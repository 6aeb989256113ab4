use serde::{Deserialize, Serialize};

use crate::timestamp::format_epoch;

/// 上游统一响应包装，code非0表示业务错误。
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub uid: u64,
    pub name: String,
    pub face: String,
    pub sign: String,
    pub level: i64,
    pub sex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRecord {
    pub bvid: String,
    pub aid: i64,
    pub title: String,
    pub description: String,
    pub pic: String,
    pub created: i64,
    pub created_str: String,
    pub length: String,
    pub play: i64,
    pub video_review: i64,
    pub favorites: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentRecord {
    pub rpid: i64,
    pub username: String,
    pub uid: i64,
    pub level: i64,
    pub sex: String,
    pub content: String,
    pub like_count: i64,
    pub reply_count: i64,
    pub ctime: i64,
    pub time_str: String,
    pub location: String,
    pub device: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfilePayload {
    pub mid: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub face: String,
    #[serde(default)]
    pub sign: String,
    #[serde(default)]
    pub level: i64,
    #[serde(default)]
    pub sex: String,
}

impl UserProfilePayload {
    pub fn into_profile(self, fallback_uid: u64) -> UserProfile {
        UserProfile {
            uid: self.mid.unwrap_or(fallback_uid),
            name: self.name,
            face: self.face,
            sign: self.sign,
            level: self.level,
            sex: self.sex,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoListPayload {
    #[serde(default)]
    pub list: VideoListBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoListBody {
    #[serde(default)]
    pub vlist: Vec<VideoItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoItem {
    #[serde(default)]
    pub bvid: String,
    #[serde(default)]
    pub aid: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pic: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub length: String,
    #[serde(default)]
    pub play: i64,
    #[serde(default)]
    pub video_review: i64,
    #[serde(default)]
    pub favorites: i64,
}

impl VideoItem {
    pub fn into_record(self) -> VideoRecord {
        let created_str = format_epoch(self.created);
        VideoRecord {
            bvid: self.bvid,
            aid: self.aid,
            title: self.title,
            description: self.description,
            pic: self.pic,
            created: self.created,
            created_str,
            length: self.length,
            play: self.play,
            video_review: self.video_review,
            favorites: self.favorites,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentListPayload {
    #[serde(default)]
    pub replies: Option<Vec<CommentItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentItem {
    #[serde(default)]
    pub rpid: i64,
    #[serde(default)]
    pub like: i64,
    #[serde(default)]
    pub rcount: i64,
    #[serde(default)]
    pub ctime: i64,
    #[serde(default)]
    pub member: CommentMember,
    #[serde(default)]
    pub content: CommentContent,
    #[serde(default)]
    pub reply_control: CommentControl,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentMember {
    #[serde(default)]
    pub mid: i64,
    #[serde(default)]
    pub uname: String,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub level_info: CommentLevel,
    #[serde(default)]
    pub official_verify: CommentOfficial,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentLevel {
    #[serde(default)]
    pub current_level: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentOfficial {
    #[serde(default)]
    pub desc: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentContent {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentControl {
    #[serde(default)]
    pub location: String,
}

impl CommentItem {
    pub fn into_record(self) -> CommentRecord {
        let time_str = format_epoch(self.ctime);
        CommentRecord {
            rpid: self.rpid,
            username: self.member.uname,
            uid: self.member.mid,
            level: self.member.level_info.current_level,
            sex: self.member.sex,
            content: self.content.message,
            like_count: self.like,
            reply_count: self.rcount,
            ctime: self.ctime,
            time_str,
            location: self.reply_control.location,
            device: self.member.official_verify.desc,
        }
    }
}
