mod menu;
mod prompts;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use uploads_core::{
    decode_sessdata, parse_uid, validate_credential_blocking, BiliClient, ClientOptions,
    ConfigManager, Credential, MatchField, MatchMode, ScrapeSession,
};

use menu::{select_from_menu, MenuOutcome};
use prompts::{pause_with_message, prompt_input, prompt_multiline};

#[derive(Parser, Debug)]
#[command(author, version, about = "B站用户投稿抓取与导出助手", long_about = None)]
struct Cli {
    /// 凭据配置文件路径
    #[arg(long = "config-path", default_value = "config.ini")]
    config_path: PathBuf,

    /// 导出文件的输出目录
    #[arg(long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// 请求超时时间（秒）
    #[arg(long = "timeout", default_value_t = 10)]
    timeout: u64,
}

struct App {
    manager: ConfigManager,
    session: Option<ScrapeSession>,
    status: String,
    output_dir: PathBuf,
    timeout: Duration,
}

enum MainAction {
    Credentials,
    Fetch,
    Exit,
}

impl App {
    fn new(manager: ConfigManager, output_dir: PathBuf, timeout: Duration) -> Self {
        Self {
            manager,
            session: None,
            status: "等待初始化...".to_string(),
            output_dir,
            timeout,
        }
    }

    fn build_client(&self, credential: &Credential) -> Result<BiliClient> {
        BiliClient::new(ClientOptions {
            timeout: self.timeout,
            credential: Some(credential.clone()),
            base_url: None,
        })
        .context("初始化HTTP客户端失败")
    }

    /// 启动时尝试用已保存的凭据完成一次验证往返。
    fn auto_initialize(&mut self) {
        let Some(credential) = self.manager.credential() else {
            self.status = "需要配置登录凭据".to_string();
            return;
        };
        match self
            .build_client(&credential)
            .and_then(|client| {
                let check = validate_credential_blocking(&client, &credential)?;
                Ok((client, check))
            }) {
            Ok((client, check)) if check.ok => {
                self.session = Some(ScrapeSession::new(client));
                self.status = format!("凭据有效 - 用户: {}", check.message);
            }
            Ok((_, check)) => {
                self.status = format!("凭据验证失败: {}", check.message);
            }
            Err(err) => {
                self.status = format!("初始化失败: {err}");
            }
        }
    }

    fn run(&mut self) -> Result<()> {
        loop {
            match self.main_menu()? {
                MainAction::Credentials => self.handle_credentials()?,
                MainAction::Fetch => self.handle_fetch()?,
                MainAction::Exit => {
                    println!("已退出助手。");
                    break;
                }
            }
        }
        Ok(())
    }

    fn main_menu(&mut self) -> Result<MainAction> {
        let title = format!("B站投稿导出助手  [{}]", self.status);
        let options = vec![
            "凭据配置".to_string(),
            "抓取用户投稿".to_string(),
            "退出程序".to_string(),
        ];
        match select_from_menu(&title, &options)? {
            MenuOutcome::Selected(0) => Ok(MainAction::Credentials),
            MenuOutcome::Selected(1) => Ok(MainAction::Fetch),
            MenuOutcome::Selected(_) | MenuOutcome::Esc => Ok(MainAction::Exit),
        }
    }

    fn handle_credentials(&mut self) -> Result<()> {
        loop {
            let title = format!("凭据配置  [{}]", self.status);
            let options = vec![
                "输入并验证凭据".to_string(),
                "查看配置状态".to_string(),
                "导出配置".to_string(),
                "导入配置".to_string(),
                "返回".to_string(),
            ];
            match select_from_menu(&title, &options)? {
                MenuOutcome::Selected(0) => self.enter_credentials()?,
                MenuOutcome::Selected(1) => self.show_config_status()?,
                MenuOutcome::Selected(2) => self.export_config()?,
                MenuOutcome::Selected(3) => self.import_config()?,
                MenuOutcome::Selected(_) | MenuOutcome::Esc => break,
            }
        }
        Ok(())
    }

    fn enter_credentials(&mut self) -> Result<()> {
        println!("请按提示粘贴四项Cookie值（留空可取消）");
        let sessdata_raw = prompt_input("SESSDATA", None)?;
        if sessdata_raw.is_empty() {
            println!("已取消录入。");
            return pause_with_message("按回车返回...");
        }
        let bili_jct = prompt_input("BILI_JCT", None)?;
        let buvid3 = prompt_input("BUVID3", None)?;
        let dedeuserid = prompt_input("DEDEUSERID", None)?;

        let credential = Credential {
            sessdata: decode_sessdata(sessdata_raw.trim()),
            bili_jct: bili_jct.trim().to_string(),
            buvid3: buvid3.trim().to_string(),
            dedeuserid: dedeuserid.trim().to_string(),
        };

        println!("{}", style("正在验证凭据...").cyan());
        let client = self.build_client(&credential)?;
        let check = validate_credential_blocking(&client, &credential)?;
        if check.ok {
            println!(
                "{} {}",
                style("凭据验证成功 - 用户:").green(),
                check.message
            );
            self.manager
                .save_credential(&credential)
                .context("保存凭据失败")?;
            println!("配置已保存到 {}", self.manager.path().display());
            self.session = Some(ScrapeSession::new(client));
            self.status = format!("凭据有效 - 用户: {}", check.message);
        } else {
            println!("{} {}", style("凭据验证失败:").red(), check.message);
            println!("请检查凭据是否正确，或重新从浏览器Cookie中获取。");
        }
        pause_with_message("按回车返回...")
    }

    fn show_config_status(&self) -> Result<()> {
        println!("配置文件: {}", self.manager.path().display());
        if self.manager.has_valid_config() {
            println!("{}", style("四项凭据均已填写。").green());
        } else {
            println!(
                "{}",
                style("凭据缺失或仍为占位值，请先录入。").yellow()
            );
        }
        pause_with_message("按回车返回...")
    }

    fn export_config(&self) -> Result<()> {
        match self.manager.export_config() {
            Ok(content) => {
                println!("以下为配置文件内容，请复制保存：\n");
                println!("{content}");
            }
            Err(err) => println!("{} {err}", style("导出失败:").red()),
        }
        pause_with_message("按回车返回...")
    }

    fn import_config(&mut self) -> Result<()> {
        let content = prompt_multiline("粘贴之前导出的配置内容", "EOF")?;
        if content.trim().is_empty() {
            println!("未输入任何内容，已取消。");
            return pause_with_message("按回车返回...");
        }
        match self.manager.import_config(&content) {
            Ok(()) => {
                println!("{}", style("配置导入成功，正在重新初始化...").green());
                self.session = None;
                self.auto_initialize();
                println!("{}", self.status);
            }
            Err(err) => println!("{} {err}", style("配置导入失败:").red()),
        }
        pause_with_message("按回车返回...")
    }

    fn handle_fetch(&mut self) -> Result<()> {
        if self.session.is_none() {
            println!("{}", style("请先完成凭据配置。").yellow());
            return pause_with_message("按回车返回...");
        }

        let uid_input = prompt_input("用户UID或个人主页URL（留空取消）", None)?;
        if uid_input.is_empty() {
            return Ok(());
        }
        let uid = match parse_uid(&uid_input) {
            Ok(uid) => uid,
            Err(err) => {
                println!("{} {err}", style("输入无效:").red());
                return pause_with_message("按回车返回...");
            }
        };
        let months = self.prompt_months()?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message("正在获取用户信息和投稿列表...");

        let Some(session) = self.session.as_mut() else {
            spinner.finish_and_clear();
            return Ok(());
        };
        let fetch_result = session.fetch_videos_blocking(uid, months);
        spinner.finish_and_clear();

        if let Err(err) = fetch_result {
            println!("{} {err}", style("抓取失败:").red());
            return pause_with_message("按回车返回...");
        }

        if let Some(profile) = session.profile() {
            println!(
                "用户: {}  (UID {}  LV{})",
                style(&profile.name).green().bold(),
                profile.uid,
                profile.level
            );
            if !profile.sign.is_empty() {
                println!("签名: {}", profile.sign);
            }
        }
        let total = session.videos().len();
        if session.collection().fetch_degraded {
            println!(
                "{}",
                style("部分页请求失败，以下结果可能不完整。").yellow()
            );
        }
        if total == 0 {
            println!(
                "{}",
                style(format!("最近{months}个月内未找到投稿。")).yellow()
            );
            return pause_with_message("按回车返回...");
        }
        println!(
            "{}",
            style(format!("成功获取最近{months}个月内的 {total} 个视频")).green()
        );
        pause_with_message("按回车进入视频选择...")?;
        self.selection_loop()
    }

    fn prompt_months(&self) -> Result<u32> {
        let options = vec![
            "最近1个月".to_string(),
            "最近3个月".to_string(),
            "最近6个月".to_string(),
            "最近12个月".to_string(),
        ];
        let months = [1u32, 3, 6, 12];
        match select_from_menu("选择时间范围", &options)? {
            MenuOutcome::Selected(index) => Ok(months[index.min(months.len() - 1)]),
            MenuOutcome::Esc => Ok(1),
        }
    }

    fn selection_loop(&mut self) -> Result<()> {
        loop {
            let Some((selected, total)) = self
                .session
                .as_ref()
                .map(|session| (session.selection().count_selected(), session.videos().len()))
            else {
                break;
            };
            let title = format!("视频选择  已选择 {selected} / {total}");
            let options = vec![
                "全选".to_string(),
                "反选".to_string(),
                "清空选择".to_string(),
                "标题关键词操作".to_string(),
                "简介关键词操作".to_string(),
                "按序号切换单条".to_string(),
                "查看选中列表".to_string(),
                "导出JSON".to_string(),
                "返回主菜单".to_string(),
            ];
            let Some(session) = self.session.as_mut() else {
                break;
            };
            match select_from_menu(&title, &options)? {
                MenuOutcome::Selected(0) => session.select_all(),
                MenuOutcome::Selected(1) => session.invert_all(),
                MenuOutcome::Selected(2) => session.clear_all(),
                MenuOutcome::Selected(3) => keyword_operation(session, MatchField::Title)?,
                MenuOutcome::Selected(4) => keyword_operation(session, MatchField::Description)?,
                MenuOutcome::Selected(5) => toggle_by_index(session)?,
                MenuOutcome::Selected(6) => show_selected(session)?,
                MenuOutcome::Selected(7) => self.export_selected()?,
                MenuOutcome::Selected(_) | MenuOutcome::Esc => break,
            }
        }
        Ok(())
    }

    fn export_selected(&mut self) -> Result<()> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let count = session.selection().count_selected();
        if count == 0 {
            println!("{}", style("请先选择要导出的视频。").yellow());
            return pause_with_message("按回车返回...");
        }
        match session.export_selected(&self.output_dir) {
            Ok((path, written)) => println!(
                "{} {written} 个视频，输出文件：{}",
                style("导出完成，共").green(),
                path.display()
            ),
            Err(err) => println!("{} {err}", style("导出失败:").red()),
        }
        pause_with_message("按回车返回...")
    }
}

fn keyword_operation(session: &mut ScrapeSession, field: MatchField) -> Result<()> {
    let label = match field {
        MatchField::Title => "标题",
        MatchField::Description => "简介",
    };
    let input = prompt_input(
        &format!("输入{label}关键词（空格或逗号分隔，留空取消）"),
        None,
    )?;
    if input.trim().is_empty() {
        return Ok(());
    }

    let mode = match select_from_menu(
        "匹配模式",
        &["包含任意".to_string(), "包含全部".to_string()],
    )? {
        MenuOutcome::Selected(1) => MatchMode::All,
        _ => MatchMode::Any,
    };

    let actions = vec![
        format!("选择{label}命中的视频"),
        format!("反选{label}命中的视频"),
        format!("仅保留{label}命中的视频"),
    ];
    let matched = match select_from_menu("关键词操作", &actions)? {
        MenuOutcome::Selected(0) => session.keyword_select(field, &input, mode),
        MenuOutcome::Selected(1) => session.keyword_invert(field, &input, mode),
        MenuOutcome::Selected(2) => session.keyword_restrict(field, &input, mode),
        _ => return Ok(()),
    };
    println!("命中 {matched} 个视频");
    pause_with_message("按回车返回...")
}

fn toggle_by_index(session: &mut ScrapeSession) -> Result<()> {
    let total = session.videos().len();
    for (idx, video) in session.videos().iter().enumerate() {
        let mark = if session.selection().flags()[idx] { "[x]" } else { "[ ]" };
        println!("{mark} {:>3}. {}  {}", idx + 1, video.bvid, video.title);
    }
    let input = prompt_input("输入要切换的序号（空格或逗号分隔，留空取消）", None)?;
    for token in input.split(|ch: char| ch == ',' || ch.is_whitespace()) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.parse::<usize>() {
            Ok(number) if number >= 1 && number <= total => {
                session.toggle(number - 1).ok();
            }
            _ => println!("忽略无效序号: {token}"),
        }
    }
    Ok(())
}

fn show_selected(session: &ScrapeSession) -> Result<()> {
    let records = session.selected_records();
    if records.is_empty() {
        println!("{}", style("当前没有选中的视频。").yellow());
    } else {
        for record in &records {
            println!(
                "{}  {}  {}  时长 {}",
                style(&record.bvid).cyan(),
                record.created_str,
                record.title,
                record.duration
            );
        }
        println!("共 {} 个视频", records.len());
    }
    pause_with_message("按回车返回...")
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let manager = ConfigManager::load(&cli.config_path)
        .with_context(|| format!("加载配置失败: {}", cli.config_path.display()))?;
    let output_dir = cli
        .output_dir
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let mut app = App::new(
        manager,
        output_dir,
        Duration::from_secs(cli.timeout.max(1)),
    );
    app.auto_initialize();
    println!("{}", app.status);
    app.run()
}
