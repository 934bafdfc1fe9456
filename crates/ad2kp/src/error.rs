//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use ad2kp_config::ConfigError;
use ad2kp_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {endpoint}")]
    #[diagnostic(
        code(ad2kp::connection_failed),
        help(
            "Check that the device is powered and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Timed out after {seconds}s waiting for {what}")]
    #[diagnostic(
        code(ad2kp::timeout),
        help("Increase the wait with --timeout or check the device at {endpoint}.")
    )]
    Timeout {
        seconds: u64,
        what: &'static str,
        endpoint: String,
    },

    // ── Commands ─────────────────────────────────────────────────────
    #[error("Invalid keypad command '{input}': {reason}")]
    #[diagnostic(
        code(ad2kp::invalid_command),
        help(
            "Known commands: disarm, stay, away, exit, chime, bypass:<zone>,\n\
             panic, fire, aux. Use --raw to forward any string verbatim."
        )
    )]
    InvalidCommand { input: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ad2kp::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ad2kp::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No keypad endpoint configured")]
    #[diagnostic(
        code(ad2kp::no_config),
        help(
            "Pass --host (and --transport tcp --port N for raw TCP),\n\
             or add a profile to: {path}"
        )
    )]
    NoEndpoint { path: String },

    #[error(transparent)]
    #[diagnostic(code(ad2kp::config))]
    Config(Box<ConfigError>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON output: {0}")]
    #[diagnostic(code(ad2kp::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::InvalidCommand { .. }
            | Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoEndpoint { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: String::new(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { endpoint, reason } => {
                CliError::ConnectionFailed { endpoint, reason }
            }
            CoreError::Transport { reason } => CliError::ConnectionFailed {
                endpoint: "the keypad".into(),
                reason,
            },
            CoreError::NotConnected | CoreError::ShutDown => CliError::ConnectionFailed {
                endpoint: "(disconnected)".into(),
                reason: err.to_string(),
            },
            CoreError::InvalidCommand { input, reason } => CliError::InvalidCommand { input, reason },
            CoreError::Config { message } => CliError::Validation {
                field: "endpoint".into(),
                reason: message,
            },
        }
    }
}
