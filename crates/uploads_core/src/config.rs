use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::errors::ScraperError;

pub const CREDENTIAL_SECTION: &str = "Credential";
pub const CREDENTIAL_KEYS: [&str; 4] = ["SESSDATA", "BILI_JCT", "BUVID3", "DEDEUSERID"];

/// 默认配置里的占位前缀，带此前缀的值视为“未配置”。
pub const PLACEHOLDER_PREFIX: &str = "你的";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    pub sessdata: String,
    pub bili_jct: String,
    pub buvid3: String,
    pub dedeuserid: String,
}

impl Credential {
    pub fn cookie_header(&self) -> String {
        format!(
            "SESSDATA={}; bili_jct={}; buvid3={}; DedeUserID={}",
            self.sessdata, self.bili_jct, self.buvid3, self.dedeuserid
        )
    }

    pub fn uid(&self) -> Result<u64, ScraperError> {
        self.dedeuserid
            .trim()
            .parse::<u64>()
            .map_err(|_| ScraperError::Auth(format!("DEDEUSERID不是有效的UID: {}", self.dedeuserid)))
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    path: PathBuf,
    ini: Ini,
}

impl ConfigManager {
    /// 加载配置文件，不存在时写出带占位值的默认配置。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScraperError> {
        let path = path.as_ref().to_path_buf();
        let ini = if path.exists() {
            read_ini(&path)?
        } else {
            let ini = default_ini();
            write_ini(&ini, &path)?;
            ini
        };
        Ok(Self { path, ini })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn raw_value(&self, key: &str) -> &str {
        self.ini
            .get_from(Some(CREDENTIAL_SECTION), key)
            .unwrap_or_default()
    }

    /// 四个键全部既非空白也非占位值才算配置齐全。
    pub fn has_valid_config(&self) -> bool {
        CREDENTIAL_KEYS.iter().all(|key| {
            let value = self.raw_value(key).trim();
            !value.is_empty() && !value.starts_with(PLACEHOLDER_PREFIX)
        })
    }

    pub fn credential(&self) -> Option<Credential> {
        if !self.has_valid_config() {
            return None;
        }
        let sessdata_raw = self.raw_value("SESSDATA").trim().to_string();
        Some(Credential {
            sessdata: decode_sessdata(&sessdata_raw),
            bili_jct: self.raw_value("BILI_JCT").trim().to_string(),
            buvid3: self.raw_value("BUVID3").trim().to_string(),
            dedeuserid: self.raw_value("DEDEUSERID").trim().to_string(),
        })
    }

    pub fn save_credential(&mut self, credential: &Credential) -> Result<(), ScraperError> {
        {
            let mut section = self.ini.with_section(Some(CREDENTIAL_SECTION));
            section
                .set("SESSDATA", credential.sessdata.clone())
                .set("BILI_JCT", credential.bili_jct.clone())
                .set("BUVID3", credential.buvid3.clone())
                .set("DEDEUSERID", credential.dedeuserid.clone());
        }
        write_ini(&self.ini, &self.path)
    }

    /// 导出配置文件原文，便于备份或迁移到其他设备。
    pub fn export_config(&self) -> Result<String, ScraperError> {
        fs::read_to_string(&self.path).map_err(ScraperError::Io)
    }

    pub fn import_config(&mut self, content: &str) -> Result<(), ScraperError> {
        let ini = Ini::load_from_str(content)
            .map_err(|err| ScraperError::Config(format!("配置内容解析失败: {err}")))?;
        fs::write(&self.path, content)?;
        self.ini = ini;
        Ok(())
    }
}

/// SESSDATA常带URL编码字符，含`%`时先解码再使用。
pub fn decode_sessdata(raw: &str) -> String {
    if raw.contains('%') {
        percent_decode_str(raw)
            .decode_utf8()
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| raw.to_string())
    } else {
        raw.to_string()
    }
}

fn default_ini() -> Ini {
    let mut ini = Ini::new();
    {
        let mut section = ini.with_section(Some(CREDENTIAL_SECTION));
        section
            .set("SESSDATA", format!("{PLACEHOLDER_PREFIX}SESSDATA值"))
            .set("BILI_JCT", format!("{PLACEHOLDER_PREFIX}BILI_JCT值"))
            .set("BUVID3", format!("{PLACEHOLDER_PREFIX}BUVID3值"))
            .set("DEDEUSERID", format!("{PLACEHOLDER_PREFIX}DEDEUSERID值"));
    }
    ini
}

fn read_ini(path: &Path) -> Result<Ini, ScraperError> {
    let content = fs::read_to_string(path)?;
    Ini::load_from_str(&content)
        .map_err(|err| ScraperError::Config(format!("配置文件解析失败: {err}")))
}

fn write_ini(ini: &Ini, path: &Path) -> Result<(), ScraperError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    ini.write_to_file(path).map_err(ScraperError::Io)
}
