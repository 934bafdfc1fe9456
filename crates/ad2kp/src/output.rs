//! Output formatting: human-readable lines or one JSON object per line.

use std::io::{self, IsTerminal, Write};

use chrono::Local;
use owo_colors::OwoColorize;
use serde_json::json;

use ad2kp_core::{
    AlarmAction, Confirmation, ConnectionState, DisplayMode, KeypadEvent, StatusClass, TAPS_TO_CONFIRM,
};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Renders keypad output in the selected format.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    format: OutputFormat,
    color: bool,
    /// Terminal is in raw mode; lines need an explicit carriage return.
    raw: bool,
}

impl Printer {
    pub fn new(format: OutputFormat, color: ColorMode) -> Self {
        Self {
            format,
            color: should_color(color),
            raw: false,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Copy of this printer for use while the terminal is in raw mode.
    pub fn raw(self) -> Self {
        Self { raw: true, ..self }
    }

    // ── Renderers ────────────────────────────────────────────────────

    pub fn render_event(&self, event: &KeypadEvent) -> Result<String, CliError> {
        match (self.format, event) {
            (OutputFormat::Json, KeypadEvent::Connection(state)) => Ok(serde_json::to_string(&json!({
                "ts": Local::now().to_rfc3339(),
                "type": "connection",
                "state": state,
            }))?),
            (OutputFormat::Json, KeypadEvent::ModeChanged(t)) => Ok(serde_json::to_string(&json!({
                "ts": Local::now().to_rfc3339(),
                "type": "mode",
                "from": t.from,
                "to": t.to,
                "panel": t.to.panel(),
            }))?),
            (OutputFormat::Text, KeypadEvent::Connection(state)) => {
                let label = match state {
                    ConnectionState::Connected => self.paint(&state.to_string(), StatusClass::Ready),
                    ConnectionState::Closing | ConnectionState::Disconnected => {
                        self.paint(&state.to_string(), StatusClass::NotReady)
                    }
                    ConnectionState::Connecting => state.to_string(),
                };
                Ok(format!("{} connection {label}", self.timestamp()))
            }
            (OutputFormat::Text, KeypadEvent::ModeChanged(t)) => Ok(format!(
                "{} mode {} -> {}  {}",
                self.timestamp(),
                t.from,
                self.paint(&t.to.to_string(), t.to.panel().status),
                Self::panel_line(t.to),
            )),
        }
    }

    pub fn render_mode(&self, mode: DisplayMode, alpha: Option<&str>) -> Result<String, CliError> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string(&json!({
                "mode": mode,
                "panel": mode.panel(),
                "alpha": alpha,
            }))?),
            OutputFormat::Text => {
                let mut line = format!(
                    "{}  {}",
                    self.paint(&mode.to_string(), mode.panel().status),
                    Self::panel_line(mode)
                );
                if let Some(alpha) = alpha.filter(|a| !a.is_empty()) {
                    line.push_str(&format!("\n{}", alpha.trim_end()));
                }
                Ok(line)
            }
        }
    }

    pub fn render_gesture(&self, action: AlarmAction, result: Confirmation) -> Result<String, CliError> {
        if self.format == OutputFormat::Json {
            let (state, count) = match result {
                Confirmation::Pending { count } => ("pending", count),
                Confirmation::Confirmed => ("confirmed", TAPS_TO_CONFIRM),
                Confirmation::Cancelled => ("cancelled", 0),
            };
            return Ok(serde_json::to_string(&json!({
                "ts": Local::now().to_rfc3339(),
                "type": "gesture",
                "action": action,
                "state": state,
                "count": count,
            }))?);
        }

        let text = match result {
            Confirmation::Pending { count } => format!("{action} {count}/{TAPS_TO_CONFIRM}"),
            Confirmation::Confirmed => self.paint(
                &format!("{action} confirmed, sending {}", action.command()),
                StatusClass::Alarming,
            ),
            Confirmation::Cancelled => format!("{action} cancelled"),
        };
        Ok(format!("{} gesture {text}", self.timestamp()))
    }

    // ── Emission ─────────────────────────────────────────────────────

    /// Write one line to stdout.
    pub fn emit(&self, line: &str) {
        let mut stdout = io::stdout().lock();
        if self.raw {
            let _ = write!(stdout, "{}\r\n", line.replace('\n', "\r\n"));
            let _ = stdout.flush();
        } else {
            let _ = writeln!(stdout, "{line}");
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn timestamp(&self) -> String {
        let ts = Local::now().format("%H:%M:%S").to_string();
        if self.color { ts.dimmed().to_string() } else { ts }
    }

    fn panel_line(mode: DisplayMode) -> String {
        let panel = mode.panel();
        let buttons: Vec<&str> = [panel.primary, panel.secondary]
            .into_iter()
            .flatten()
            .map(|b| b.label())
            .collect();

        if buttons.is_empty() {
            panel.label.to_owned()
        } else {
            format!("{} [1:{}]", panel.label, buttons.join(" 2:"))
        }
    }

    fn paint(&self, text: &str, status: StatusClass) -> String {
        if !self.color {
            return text.to_owned();
        }
        match status {
            StatusClass::Ready => text.green().to_string(),
            StatusClass::NotReady => text.yellow().to_string(),
            StatusClass::Armed => text.blue().bold().to_string(),
            StatusClass::Alarming => text.red().bold().to_string(),
        }
    }
}
