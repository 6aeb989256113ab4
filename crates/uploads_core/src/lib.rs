pub mod client;
pub mod collector;
pub mod config;
pub mod errors;
pub mod export;
pub mod models;
pub mod selection;
pub mod session;
pub mod timestamp;

pub use client::{normalize_image_url, BiliClient, ClientOptions, DEFAULT_HEADERS};
pub use collector::{collect_since, collect_videos, Collection, MAX_PAGES, MAX_RECORDS, PAGE_SIZE};
pub use config::{decode_sessdata, ConfigManager, Credential, PLACEHOLDER_PREFIX};
pub use errors::ScraperError;
pub use export::{export_filename, export_json, write_export, ExportRecord, EMPTY_SENTINEL};
pub use models::{CommentRecord, UserProfile, VideoRecord};
pub use selection::{keyword_match, parse_keywords, MatchField, MatchMode, Selection};
pub use session::{
    validate_credential, validate_credential_blocking, CredentialCheck, ScrapeSession,
};
pub use timestamp::{cutoff_epoch, filename_timestamp, format_epoch, parse_uid};
