//! Operator controls: space toggles pause, q/Esc/Ctrl-C quits.
//!
//! Without a terminal on stdin only SIGINT quits and pause is unavailable.

use std::io::{self, IsTerminal, Write};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use futures_util::StreamExt;
use tracing::info;

use ad2kp_sim::PauseFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    TogglePause,
    Quit,
}

fn map_key(key: KeyEvent) -> Option<Control> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Control::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Control::Quit),
        KeyCode::Char(' ') => Some(Control::TogglePause),
        _ => None,
    }
}

/// Raw mode for the lifetime of the guard.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Resolves when the operator asks to quit.
pub async fn run(pause: PauseFlag) -> io::Result<()> {
    if !io::stdin().is_terminal() {
        tokio::signal::ctrl_c().await?;
        info!("interrupted");
        return Ok(());
    }

    let _guard = RawModeGuard::enter()?;
    announce("Press q, Esc or Ctrl-C to exit. Press space to pause and resume the stream.");

    let mut events = EventStream::new();
    while let Some(event) = events.next().await {
        let Event::Key(key) = event? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match map_key(key) {
            Some(Control::Quit) => {
                announce("Exit key pressed. Done.");
                break;
            }
            Some(Control::TogglePause) => {
                let paused = pause.toggle();
                info!(paused, "pause toggled");
                announce(if paused { "Paused.." } else { "Resumed.." });
            }
            None => {}
        }
    }
    Ok(())
}

/// Status line that stays readable in raw mode.
fn announce(message: &str) {
    let mut stderr = io::stderr().lock();
    let _ = write!(stderr, "{message}\r\n");
    let _ = stderr.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bindings() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(map_key(key(KeyCode::Char(' '))), Some(Control::TogglePause));
        assert_eq!(map_key(key(KeyCode::Char('q'))), Some(Control::Quit));
        assert_eq!(map_key(key(KeyCode::Esc)), Some(Control::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Control::Quit)
        );
        assert_eq!(map_key(key(KeyCode::Char('p'))), None);
    }
}
