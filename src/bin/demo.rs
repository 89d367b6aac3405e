//! Sample host binary: wires the engine to a real terminal via crossterm,
//! with toy completion and hints producers and a history file under `$HOME`.
//!
//! This is demonstration plumbing, not part of the library's public API —
//! a real host picks its own key source, sink, and completion/hints
//! collaborators.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self};
use crossterm::tty::IsTty;

use lineforge::{
    ByteSink, CompletionProducer, CompletionSet, EditorError, Engine, Hint, HintsProducer,
    InstantTimer, KeySource, StepResult,
};

const COMMANDS: &[&str] = &["status", "start", "stop", "restart", "help", "quit"];

/// `true` while the demo holds the terminal in raw mode, mirroring the
/// teacher's `EDITOR_ACTIVE` sentinel so a Ctrl-C handler elsewhere in a
/// larger host could suppress a spurious extra newline.
static EDITOR_ACTIVE: AtomicBool = AtomicBool::new(false);

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        EDITOR_ACTIVE.store(true, Ordering::Relaxed);
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        EDITOR_ACTIVE.store(false, Ordering::Relaxed);
    }
}

/// Polls crossterm's event queue without blocking: `poll(Duration::ZERO)`
/// returns immediately either way.
struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn poll_byte(&mut self) -> Option<u8> {
        loop {
            if !event::poll(Duration::ZERO).unwrap_or(false) {
                return None;
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    return key_to_byte(key.code);
                }
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
    }
}

fn key_to_byte(code: KeyCode) -> Option<u8> {
    match code {
        KeyCode::Char(c) if c.is_ascii() => Some(c as u8),
        KeyCode::Enter => Some(0x0d),
        KeyCode::Backspace => Some(0x7f),
        KeyCode::Tab => Some(0x09),
        KeyCode::Esc => Some(0x1b),
        _ => None,
    }
}

struct Stdout;

impl ByteSink for Stdout {
    fn write(&mut self, bytes: &[u8]) -> Result<(), EditorError> {
        io::stdout().write_all(bytes)?;
        io::stdout().flush()?;
        Ok(())
    }
}

struct ToyCompletions;

impl CompletionProducer for ToyCompletions {
    fn complete(&mut self, buf: &str, out: &mut CompletionSet) {
        for cmd in COMMANDS {
            if cmd.starts_with(buf) {
                out.add(cmd);
            }
        }
    }
}

struct ToyHints;

impl HintsProducer for ToyHints {
    fn hint(&mut self, buf: &str) -> Option<Hint> {
        if buf == "restart" {
            Some(Hint::new("[service]", "restart a service"))
        } else if buf == "start" || buf == "stop" {
            Some(Hint::new("[service]", "control a service"))
        } else {
            None
        }
    }
}

fn history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".lineforge_history"))
}

fn main() -> io::Result<()> {
    if !io::stdin().is_tty() {
        return run_fallback();
    }

    let mut engine = Engine::with_host(
        256,
        CrosstermKeys,
        Stdout,
        ToyCompletions,
        ToyHints,
        InstantTimer::default(),
    );
    engine.set_multi_line(false);

    let hist_path = history_path();
    if let Some(ref path) = hist_path {
        let _ = engine.history_load(path);
    }

    let _guard = RawModeGuard::enter()?;

    loop {
        match engine.step("lineforge> ") {
            StepResult::Committed(_) => {
                let line = engine.line().to_string();
                if line == "quit" {
                    break;
                }
                print!("{line}\r\n");
                io::stdout().flush()?;
            }
            StepResult::Eof => break,
            StepResult::Interrupted => {
                print!("^C\r\n");
                io::stdout().flush()?;
            }
            StepResult::Error => break,
            StepResult::NeedMore => {
                std::thread::sleep(Duration::from_millis(5));
            }
        }
    }

    if let Some(ref path) = hist_path {
        let _ = engine.history_save(path);
    }
    Ok(())
}

/// Non-TTY path for piped input: no raw mode, no redraw, just read lines.
fn run_fallback() -> io::Result<()> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        print!("lineforge> ");
        io::stdout().flush()?;
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim_end();
        if trimmed == "quit" {
            break;
        }
        println!("{trimmed}");
    }
    Ok(())
}
