use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("凭据未配置: {0}")]
    Config(String),
    #[error("凭据验证失败: {0}")]
    Auth(String),
    #[error("网络请求失败: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API响应错误(code={code}, message={message})")]
    Api { code: i32, message: String },
    #[error("响应不是有效的JSON: {0}")]
    InvalidJson(String),
    #[error("读取文件失败: {0}")]
    Io(#[from] io::Error),
    #[error("输入无效: {0}")]
    InvalidInput(String),
    #[error("未知错误: {0}")]
    Other(String),
}
