//! Terminal input and chrome for the REPL

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use adgen_core::Result;

const PROMPT: &str = "adgen>";

/// Display startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = 60usize.min(terminal_width.saturating_sub(4)).max(40);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "AdGen - Meta Campaign Generator";
    println!(
        "│  {}{}│",
        title.blue().bold(),
        " ".repeat(banner_width.saturating_sub(title.len() + 4))
    );
    println!("{}", empty_line.blue());

    let feature_lines = [
        "Research a client site, build the creative,",
        "and save a ready-to-deploy Meta campaign.",
        "",
        "1 Market Intelligence  2 Strategic Review",
        "3 Ad Creative",
    ];
    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            let padding = " ".repeat(banner_width.saturating_sub(line.chars().count() + 4));
            println!("{}", format!("│  {}{}│", line, padding).blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!("{}", "💡 Tip: type 'lab' to start a campaign, or 'help' for commands".dimmed());
    println!();
}

/// Display help message
pub fn print_help() {
    println!("{}", "Navigation:".bold());
    println!("  {} - Campaign overview", "dashboard".green());
    println!("  {} - Strategy Lab workspace", "lab".green());
    println!("  {} - Ad Factory workspace", "factory".green());
    println!();
    println!("{}", "Campaign intake:".bold());
    println!("  {} - Client website", "url <address>".green());
    println!("  {} - Client name", "client <name>".green());
    println!("  {} - Campaign objective", "objective <leads|clicks>".green());
    println!("  {} - Creative format", "format <image|video>".green());
    println!();
    println!("{}", "Workflow:".bold());
    println!("  {} - Research the site (step 1)", "scan".green());
    println!("  {} - Generate the creative (step 2)", "build".green());
    println!("  {} - Save the campaign (step 3)", "save".green());
    println!("  {} - Export a saved campaign as JSON, or its creative to a file", "export <n> [path]".green());
    println!("  {} - Show the current step", "status".green());
    println!();
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
}

/// What a key press did to the line being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Edited,
    Ignored,
    Submit,
    /// Esc: drop the line
    Cancel,
    /// Ctrl-C, or Ctrl-D on an empty line
    Interrupt,
}

/// Apply one key press to `buffer`. History keys are left to the caller.
pub fn apply_key(buffer: &mut String, key: &KeyEvent) -> KeyOutcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => KeyOutcome::Interrupt,
            KeyCode::Char('d') if buffer.is_empty() => KeyOutcome::Interrupt,
            _ => KeyOutcome::Ignored,
        };
    }
    match key.code {
        KeyCode::Enter => KeyOutcome::Submit,
        KeyCode::Esc => KeyOutcome::Cancel,
        KeyCode::Char(c) => {
            buffer.push(c);
            KeyOutcome::Edited
        }
        KeyCode::Backspace => {
            buffer.pop();
            KeyOutcome::Edited
        }
        _ => KeyOutcome::Ignored,
    }
}

fn next_key_press() -> Result<KeyEvent> {
    loop {
        if let Event::Key(key_event) = event::read()? {
            if key_event.kind == KeyEventKind::Press {
                return Ok(key_event);
            }
        }
    }
}

/// Read a line with ↑/↓ history, Esc to cancel and Ctrl-C / Ctrl-D to quit.
///
/// Falls back to plain line reads when stdin is not a terminal. Returns `None`
/// at end of input or on interrupt.
pub fn read_line_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    enable_raw_mode()?;
    let result = edit_line(history);
    disable_raw_mode()?;
    println!();
    result
}

fn redraw(input: &str) -> Result<()> {
    print!("\r{} {}\x1b[K", PROMPT.green().bold(), input);
    io::stdout().flush()?;
    Ok(())
}

fn edit_line(history: &mut Vec<String>) -> Result<Option<String>> {
    let mut input = String::new();
    let mut history_index: Option<usize> = None;
    redraw(&input)?;

    loop {
        let key_event = next_key_press()?;
        match key_event.code {
            KeyCode::Up if !history.is_empty() => {
                let index = match history_index {
                    None => history.len() - 1,
                    Some(idx) => idx.saturating_sub(1),
                };
                history_index = Some(index);
                input = history[index].clone();
            }
            KeyCode::Down => match history_index {
                Some(idx) if idx + 1 < history.len() => {
                    history_index = Some(idx + 1);
                    input = history[idx + 1].clone();
                }
                Some(_) => {
                    history_index = None;
                    input.clear();
                }
                None => {}
            },
            _ => match apply_key(&mut input, &key_event) {
                KeyOutcome::Submit => {
                    let line = input.trim().to_string();
                    if !line.is_empty() {
                        history.push(line.clone());
                    }
                    return Ok(Some(line));
                }
                KeyOutcome::Cancel => return Ok(Some(String::new())),
                KeyOutcome::Interrupt => return Ok(None),
                KeyOutcome::Ignored => continue,
                KeyOutcome::Edited => {}
            },
        }
        redraw(&input)?;
    }
}

/// Prompt for a single value on a plain line
pub fn prompt_line(label: &str) -> Result<String> {
    print!("{} ", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

/// Prompt for a value without echoing it. Esc or Ctrl-C give an empty string.
pub fn read_secret(label: &str) -> Result<String> {
    if !io::stdin().is_terminal() {
        return prompt_line(label);
    }

    print!("{} ", label);
    io::stdout().flush()?;
    enable_raw_mode()?;
    let result = edit_secret();
    disable_raw_mode()?;
    println!();
    result
}

fn edit_secret() -> Result<String> {
    let mut secret = String::new();
    loop {
        let key_event = next_key_press()?;
        match apply_key(&mut secret, &key_event) {
            KeyOutcome::Submit => return Ok(secret.trim().to_string()),
            KeyOutcome::Cancel | KeyOutcome::Interrupt => return Ok(String::new()),
            KeyOutcome::Edited | KeyOutcome::Ignored => {}
        }
    }
}

/// Await `task` while printing a ticker line
pub async fn with_progress<F, T>(label: &str, task: F) -> T
where
    F: Future<Output = T>,
{
    const FRAMES: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let started = tokio::time::Instant::now();
    let mut frame = 0usize;
    tokio::pin!(task);

    let output = loop {
        tokio::select! {
            output = &mut task => break output,
            _ = ticker.tick() => {
                print!(
                    "\r{} {} {}",
                    FRAMES[frame % FRAMES.len()].cyan(),
                    label,
                    format!("({}s)", started.elapsed().as_secs()).dimmed()
                );
                let _ = io::stdout().flush();
                frame += 1;
            }
        }
    };
    print!("\r\x1b[K");
    let _ = io::stdout().flush();
    output
}
