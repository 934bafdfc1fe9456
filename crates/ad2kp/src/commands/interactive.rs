//! `ad2kp watch --interactive`: a keyboard-driven keypad.
//!
//! Keys: `1`/`2` press the panel's primary/secondary button for the
//! current mode, `p`/`f`/`a` tap the panic/fire/aux gestures (three taps
//! confirm), `r` re-syncs, `q`/Esc/Ctrl-C quit.

use std::io::{self, IsTerminal};

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use futures_util::StreamExt;
use tokio::sync::broadcast::error::RecvError;

use ad2kp_api::Connector;
use ad2kp_core::{AlarmAction, Confirmation, GestureConfirmer, Keypad, KeypadCommand};

use crate::error::CliError;
use crate::output::Printer;

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Primary,
    Secondary,
    Tap(AlarmAction),
    Resync,
    Quit,
}

fn map_key(key: KeyEvent) -> Option<KeyAction> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('1') => Some(KeyAction::Primary),
        KeyCode::Char('2') => Some(KeyAction::Secondary),
        KeyCode::Char('p') => Some(KeyAction::Tap(AlarmAction::Panic)),
        KeyCode::Char('f') => Some(KeyAction::Tap(AlarmAction::Fire)),
        KeyCode::Char('a') => Some(KeyAction::Tap(AlarmAction::Aux)),
        KeyCode::Char('r') => Some(KeyAction::Resync),
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

pub async fn run<C: Connector>(keypad: &Keypad<C>, printer: Printer) -> Result<(), CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "--interactive".into(),
            reason: "stdin is not a terminal".into(),
        });
    }

    let guard = RawModeGuard::enter()?;
    let printer = printer.raw();

    keypad.connect().await?;
    printer.emit("keys: 1/2 panel buttons, p/f/a alarm taps (x3), r re-sync, q quit");

    let result = event_loop(keypad, printer).await;
    keypad.shutdown().await;
    drop(guard);
    result
}

async fn event_loop<C: Connector>(keypad: &Keypad<C>, printer: Printer) -> Result<(), CliError> {
    let mut keys = EventStream::new();
    let mut events = keypad.subscribe();
    let mut gestures = GestureConfirmer::default();

    // The mode may already be known if the keypad was connected earlier.
    printer.emit(&printer.render_mode(keypad.mode(), None)?);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => printer.emit(&printer.render_event(&event)?),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => return Ok(()),
            },

            action = gestures.cancellation() => {
                printer.emit(&printer.render_gesture(action, Confirmation::Cancelled)?);
            }

            key = keys.next() => match key {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    let Some(action) = map_key(key) else { continue };
                    if action == KeyAction::Quit {
                        return Ok(());
                    }
                    handle_key(keypad, &mut gestures, action, printer).await?;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
        }
    }
}

async fn handle_key<C: Connector>(
    keypad: &Keypad<C>,
    gestures: &mut GestureConfirmer,
    action: KeyAction,
    printer: Printer,
) -> Result<(), CliError> {
    let panel = keypad.mode().panel();

    let outcome = match action {
        KeyAction::Primary | KeyAction::Secondary => {
            let button = if action == KeyAction::Primary {
                panel.primary
            } else {
                panel.secondary
            };
            match button {
                Some(button) => send(keypad, button.command, printer).await,
                None => {
                    printer.emit(&format!("no button in mode {}", keypad.mode()));
                    Ok(())
                }
            }
        }
        KeyAction::Tap(alarm) => {
            let result = gestures.register_tap(alarm);
            printer.emit(&printer.render_gesture(alarm, result)?);
            if result == Confirmation::Confirmed {
                send(keypad, alarm.command(), printer).await
            } else {
                Ok(())
            }
        }
        KeyAction::Resync => keypad.request_sync().await,
        KeyAction::Quit => Ok(()),
    };

    // Keypad stays up across failed sends; report and keep going.
    if let Err(e) = outcome {
        printer.emit(&format!("not sent: {e}"));
    }
    Ok(())
}

async fn send<C: Connector>(
    keypad: &Keypad<C>,
    command: KeypadCommand,
    printer: Printer,
) -> Result<(), ad2kp_core::CoreError> {
    keypad.send(command).await?;
    tracing::info!(%command, "command sent");
    printer.emit(&format!("sent {command}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn key_bindings() {
        assert_eq!(map_key(key(KeyCode::Char('1'))), Some(KeyAction::Primary));
        assert_eq!(map_key(key(KeyCode::Char('2'))), Some(KeyAction::Secondary));
        assert_eq!(
            map_key(key(KeyCode::Char('f'))),
            Some(KeyAction::Tap(AlarmAction::Fire))
        );
        assert_eq!(map_key(key(KeyCode::Esc)), Some(KeyAction::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
        assert_eq!(map_key(key(KeyCode::Char('c'))), None);
    }
}
