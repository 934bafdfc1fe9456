//! Line transports.
//!
//! A [`Connector`] opens one logical connection to the device and hands
//! back a [`LineTransport`]: a sink of outbound lines and a stream of
//! inbound lines, with framing already handled. The session layer in
//! `ad2kp-core` only ever sees whole lines.
//!
//! Two connectors ship here:
//!
//! - [`WebSocketConnector`] -- the device's `/ad2ws` endpoint, one line per
//!   text frame.
//! - [`TcpConnector`] -- a raw newline-delimited byte stream (ser2sock, or
//!   the replay simulator).

mod tcp;
mod websocket;

use std::future::Future;
use std::pin::Pin;

use futures_util::{Sink, SinkExt, Stream, StreamExt};

use crate::error::Error;

pub use tcp::{DeviceLineCodec, TcpConnector, framed_lines};
pub use websocket::WebSocketConnector;

/// Upper bound for a single inbound line on byte-stream transports.
pub const MAX_LINE_LENGTH: usize = 8 * 1024;

type LineSink = Pin<Box<dyn Sink<String, Error = Error> + Send>>;
type LineStream = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

// ── LineTransport ────────────────────────────────────────────────────

/// An open, line-framed connection.
///
/// Dropping it closes the underlying transport.
pub struct LineTransport {
    sink: LineSink,
    stream: LineStream,
}

impl LineTransport {
    /// Wrap any line sink/stream pair.
    pub fn new<W, R>(sink: W, stream: R) -> Self
    where
        W: Sink<String, Error = Error> + Send + 'static,
        R: Stream<Item = Result<String, Error>> + Send + 'static,
    {
        Self {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        }
    }

    /// Send one line. Framing (terminator or frame boundary) is added by
    /// the transport.
    pub async fn send_line(&mut self, line: String) -> Result<(), Error> {
        self.sink.send(line).await
    }

    /// Next inbound line, or `None` once the peer closed the transport.
    pub async fn next_line(&mut self) -> Option<Result<String, Error>> {
        self.stream.next().await
    }

    /// Flush and close the outbound half.
    pub async fn close(&mut self) -> Result<(), Error> {
        self.sink.close().await
    }
}

impl std::fmt::Debug for LineTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineTransport").finish_non_exhaustive()
    }
}

// ── Connector ────────────────────────────────────────────────────────

/// Opens connections to one logical endpoint.
///
/// Called once per connection attempt; a failed attempt returns an error
/// and leaves nothing behind.
pub trait Connector: Send + Sync + 'static {
    /// Human-readable endpoint for logs, e.g. `ws://10.0.0.5/ad2ws`.
    fn endpoint(&self) -> String;

    /// Open a new transport.
    fn connect(&self) -> impl Future<Output = Result<LineTransport, Error>> + Send;
}
