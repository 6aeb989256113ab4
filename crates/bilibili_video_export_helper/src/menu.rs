use std::io::{stdout, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, ClearType};
use crossterm::{execute, QueueableCommand};

pub enum MenuOutcome {
    Selected(usize),
    Esc,
}

/// 方向键/WS移动，回车确认，数字键直接选中，Esc返回。
pub fn select_from_menu(title: &str, options: &[String]) -> Result<MenuOutcome> {
    if options.is_empty() {
        return Ok(MenuOutcome::Esc);
    }
    terminal::enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, Hide)?;
    drain_pending_events()?;
    let mut index = 0usize;

    let outcome = loop {
        redraw(&mut stdout, title, options, index)?;
        if let Event::Key(key) = read()? {
            match normalize_key(key) {
                Some(MenuKey::Up) => {
                    index = if index == 0 { options.len() - 1 } else { index - 1 };
                }
                Some(MenuKey::Down) => {
                    index = (index + 1) % options.len();
                }
                Some(MenuKey::Jump(n)) if n < options.len() => {
                    break MenuOutcome::Selected(n);
                }
                Some(MenuKey::Confirm) => break MenuOutcome::Selected(index),
                Some(MenuKey::Esc) => break MenuOutcome::Esc,
                _ => {}
            }
        }
    };

    execute!(stdout, Show)?;
    terminal::disable_raw_mode()?;
    Ok(outcome)
}

fn redraw(
    stdout: &mut std::io::Stdout,
    title: &str,
    options: &[String],
    index: usize,
) -> Result<()> {
    stdout.queue(MoveTo(0, 0))?;
    stdout.queue(terminal::Clear(ClearType::All))?;
    writeln!(stdout, "{}\r", title)?;
    writeln!(stdout, "\r")?;
    for (i, option) in options.iter().enumerate() {
        let marker = if i == index { ">" } else { " " };
        writeln!(stdout, "{} {}. {}\r", marker, i + 1, option)?;
    }
    stdout.flush()?;
    Ok(())
}

enum MenuKey {
    Up,
    Down,
    Confirm,
    Esc,
    Jump(usize),
}

fn normalize_key(key: KeyEvent) -> Option<MenuKey> {
    if key.kind != KeyEventKind::Press || key.modifiers != KeyModifiers::NONE {
        return None;
    }
    match key.code {
        KeyCode::Up => Some(MenuKey::Up),
        KeyCode::Down => Some(MenuKey::Down),
        KeyCode::Enter | KeyCode::Char(' ') => Some(MenuKey::Confirm),
        KeyCode::Esc => Some(MenuKey::Esc),
        // 带Shift等修饰键的按键已在上方被过滤，这里只会收到小写字符
        KeyCode::Char(c) => match c {
            'w' | 'k' => Some(MenuKey::Up),
            's' | 'j' => Some(MenuKey::Down),
            '1'..='9' => Some(MenuKey::Jump(c as usize - '1' as usize)),
            _ => None,
        },
        _ => None,
    }
}

fn drain_pending_events() -> Result<()> {
    while poll(Duration::from_millis(0))? {
        let _ = read()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn normalize_key_maps_navigation_keys() {
        assert!(matches!(
            normalize_key(press(KeyCode::Char('w'), KeyModifiers::NONE)),
            Some(MenuKey::Up)
        ));
        assert!(matches!(
            normalize_key(press(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(MenuKey::Down)
        ));
        assert!(matches!(
            normalize_key(press(KeyCode::Enter, KeyModifiers::NONE)),
            Some(MenuKey::Confirm)
        ));
        assert!(matches!(
            normalize_key(press(KeyCode::Char('3'), KeyModifiers::NONE)),
            Some(MenuKey::Jump(2))
        ));
    }

    #[test]
    fn normalize_key_ignores_modified_keys() {
        assert!(normalize_key(press(KeyCode::Char('W'), KeyModifiers::SHIFT)).is_none());
        assert!(normalize_key(press(KeyCode::Char('w'), KeyModifiers::CONTROL)).is_none());
    }
}
