// ── Core error types ──
//
// User-facing errors from ad2kp-core. Transport faults inside the session
// loop are recovered by reconnecting and never show up here; only
// transport setup errors (bad endpoint) are translated.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Not connected to the keypad endpoint")]
    NotConnected,

    #[error("Keypad has been shut down")]
    ShutDown,

    #[error("Cannot connect to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// Fault on an already-open transport.
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    // ── Command errors ───────────────────────────────────────────────
    #[error("Invalid keypad command '{input}': {reason}")]
    InvalidCommand { input: String, reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<ad2kp_api::Error> for CoreError {
    fn from(err: ad2kp_api::Error) -> Self {
        match err {
            ad2kp_api::Error::Connect { endpoint, reason } => {
                CoreError::ConnectionFailed { endpoint, reason }
            }
            ad2kp_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid endpoint URL: {e}"),
            },
            ad2kp_api::Error::Closed => CoreError::NotConnected,
            other => CoreError::Transport {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_error_keeps_endpoint() {
        let err = CoreError::from(ad2kp_api::Error::Connect {
            endpoint: "tcp://10.0.0.5:10000".into(),
            reason: "refused".into(),
        });
        assert_eq!(err.to_string(), "Cannot connect to tcp://10.0.0.5:10000: refused");
    }

    #[test]
    fn open_transport_fault_is_not_a_connect_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = CoreError::from(ad2kp_api::Error::from(io));
        assert!(matches!(err, CoreError::Transport { .. }));
        assert_eq!(err.to_string(), "Transport error: I/O error: reset");
    }
}
