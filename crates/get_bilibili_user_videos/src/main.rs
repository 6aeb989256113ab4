use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use console::style;
use uploads_core::{
    parse_uid, validate_credential_blocking, BiliClient, ClientOptions, ConfigManager,
    MatchField, MatchMode, ScrapeSession,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "导出B站用户近期投稿到JSON", long_about = None)]
struct Cli {
    /// 用户UID或个人主页URL
    uid: String,

    /// 时间范围（月，按30天/月折算）
    #[arg(short = 'm', long = "months", default_value_t = 1)]
    months: u32,

    /// 输出JSON路径，缺省时写入当前目录的带时间戳文件名
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// 凭据配置文件路径
    #[arg(long = "config-path", default_value = "config.ini")]
    config_path: PathBuf,

    /// 标题关键词（空格或逗号分隔），给出时只导出命中的视频
    #[arg(long = "title-keywords")]
    title_keywords: Option<String>,

    /// 简介关键词（空格或逗号分隔），给出时只导出命中的视频
    #[arg(long = "desc-keywords")]
    desc_keywords: Option<String>,

    /// 关键词匹配模式：any=命中任意，all=命中全部
    #[arg(long = "match-mode", default_value = "any")]
    match_mode: String,

    /// 请求超时时间（秒）
    #[arg(long = "timeout", default_value_t = 10)]
    timeout: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    if cli.months == 0 {
        bail!("months 必须大于 0");
    }
    let mode = parse_mode(&cli.match_mode)?;
    let uid = parse_uid(&cli.uid).with_context(|| "解析UID失败")?;

    let manager = ConfigManager::load(&cli.config_path)
        .with_context(|| format!("加载配置失败: {}", cli.config_path.display()))?;
    let Some(credential) = manager.credential() else {
        bail!(
            "凭据未配置，请先编辑 {} 填入SESSDATA等四项",
            manager.path().display()
        );
    };

    let client = BiliClient::new(ClientOptions {
        timeout: Duration::from_secs(cli.timeout.max(1)),
        credential: Some(credential.clone()),
        base_url: None,
    })?;

    println!("{}", style("验证登录凭据...").cyan());
    let check = validate_credential_blocking(&client, &credential)?;
    if !check.ok {
        bail!("凭据验证失败: {}", check.message);
    }
    println!("{} {}", style("凭据有效，用户:").green(), check.message);

    let mut session = ScrapeSession::new(client);
    println!("{}", style("正在抓取投稿列表...").cyan());
    session
        .fetch_videos_blocking(uid, cli.months)
        .with_context(|| "抓取投稿失败")?;

    let total = session.videos().len();
    if session.collection().fetch_degraded {
        println!(
            "{}",
            style("部分页请求失败，结果可能不完整。").yellow()
        );
    }
    if total == 0 {
        println!(
            "{}",
            style(format!("最近{}个月内未找到投稿。", cli.months)).yellow()
        );
    }

    let filtered = cli.title_keywords.is_some() || cli.desc_keywords.is_some();
    if filtered {
        session.clear_all();
        if let Some(input) = &cli.title_keywords {
            let matched = session.keyword_select(MatchField::Title, input, mode);
            println!("标题关键词命中 {matched} 条");
        }
        if let Some(input) = &cli.desc_keywords {
            let matched = session.keyword_select(MatchField::Description, input, mode);
            println!("简介关键词命中 {matched} 条");
        }
    } else {
        session.select_all();
    }

    let output_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let (path, count) = match &cli.output {
        Some(path) => {
            let records = session.selected_records();
            let written = uploads_core::write_export(path, &records)?;
            (written, records.len())
        }
        None => session.export_selected(&output_dir)?,
    };

    println!(
        "{} {count} / {total} 条记录，输出文件：{}",
        style("导出完成，共").green(),
        path.display()
    );
    Ok(())
}

fn parse_mode(input: &str) -> Result<MatchMode> {
    match input.trim().to_lowercase().as_str() {
        "any" => Ok(MatchMode::Any),
        "all" => Ok(MatchMode::All),
        other => bail!("无效的匹配模式: {other}（应为 any 或 all）"),
    }
}
