use std::io::{self, Write};

use anyhow::{Context, Result};

/// 读取一行输入，空输入返回默认值（无默认值时返回空串）。
pub fn prompt_input(message: &str, default: Option<&str>) -> Result<String> {
    let mut stdout = io::stdout();
    match default {
        Some(value) if !value.is_empty() => write!(stdout, "{message} [{value}]: ")?,
        _ => write!(stdout, "{message}: ")?,
    }
    stdout.flush().context("刷新提示失败")?;

    let mut buffer = String::new();
    io::stdin().read_line(&mut buffer).context("读取输入失败")?;
    let input = buffer.trim();
    if input.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(input.to_string())
    }
}

/// 读取多行输入直到出现单独一行的结束标记，用于粘贴整段配置。
pub fn prompt_multiline(message: &str, terminator: &str) -> Result<String> {
    println!("{message}（输入单独一行 {terminator} 结束）");
    let mut lines = Vec::new();
    loop {
        let mut buffer = String::new();
        let read = io::stdin().read_line(&mut buffer).context("读取输入失败")?;
        if read == 0 {
            break;
        }
        if buffer.trim() == terminator {
            break;
        }
        lines.push(buffer.trim_end_matches(['\r', '\n']).to_string());
    }
    Ok(lines.join("\n"))
}

pub fn pause_with_message(message: &str) -> Result<()> {
    println!("{message}");
    io::stdout().flush().ok();
    let mut buffer = String::new();
    io::stdin().read_line(&mut buffer).ok();
    Ok(())
}
