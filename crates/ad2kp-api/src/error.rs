use thiserror::Error;

/// Transport-level error for the `ad2kp-api` crate.
///
/// Every variant is recoverable by reconnecting. `ad2kp-core` maps these
/// into its own error type and never lets them escape the session loop.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Opening the transport failed (refused, unreachable, bad handshake).
    #[error("Connection to {endpoint} failed: {reason}")]
    Connect { endpoint: String, reason: String },

    /// Byte-stream I/O failure on an open transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An inbound line exceeded the framing limit.
    #[error("Line exceeds {max} bytes")]
    LineTooLong { max: usize },

    /// Invalid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket protocol failure after the upgrade.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The local side of the transport was already dropped.
    #[error("Transport closed")]
    Closed,
}

impl Error {
    /// Returns `true` if the failure happened before the transport opened.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::InvalidUrl(_))
    }
}

impl From<tokio_util::codec::LinesCodecError> for Error {
    fn from(err: tokio_util::codec::LinesCodecError) -> Self {
        match err {
            tokio_util::codec::LinesCodecError::MaxLineLengthExceeded => Self::LineTooLong {
                max: crate::transport::MAX_LINE_LENGTH,
            },
            tokio_util::codec::LinesCodecError::Io(e) => Self::Io(e),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(err.to_string())
    }
}

/// Decode fault for a single inbound line.
///
/// Never fatal: the receiver logs it, drops the line and keeps the last
/// good snapshot.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A `{`-prefixed line that is not a valid state object.
    #[error("Malformed state snapshot: {message}")]
    MalformedSnapshot { message: String, line: String },

    /// A line that starts with neither `{` nor `!`.
    #[error("Unrecognized line: {0}")]
    Unrecognized(String),
}
