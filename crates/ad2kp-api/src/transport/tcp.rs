// ── Raw TCP line transport ──
//
// Newline-delimited text over a byte stream, the ser2sock convention.

use bytes::BytesMut;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::{Decoder, Encoder, Framed, LinesCodec, LinesCodecError};

use super::{Connector, LineTransport, MAX_LINE_LENGTH};
use crate::error::Error;

/// Connects to `host:port` and frames the stream into lines.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
}

impl TcpConnector {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            addr: format!("{host}:{port}"),
        }
    }
}

impl Connector for TcpConnector {
    fn endpoint(&self) -> String {
        format!("tcp://{}", self.addr)
    }

    async fn connect(&self) -> Result<LineTransport, Error> {
        tracing::debug!(addr = %self.addr, "opening TCP transport");

        let stream = TcpStream::connect(&self.addr)
            .await
            .map_err(|e| Error::Connect {
                endpoint: self.endpoint(),
                reason: e.to_string(),
            })?;
        stream.set_nodelay(true)?;

        Ok(framed_lines(stream))
    }
}

/// [`LinesCodec`] that drops undecodable lines instead of failing.
///
/// An oversized or non-UTF-8 line is logged and skipped; decoding resumes
/// at the next terminator. Only I/O errors from the stream itself end it.
#[derive(Debug)]
pub struct DeviceLineCodec {
    inner: LinesCodec,
}

impl DeviceLineCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_length),
        }
    }

    fn skip(err: LinesCodecError) -> Result<(), LinesCodecError> {
        match err {
            LinesCodecError::MaxLineLengthExceeded => {
                tracing::warn!(max = MAX_LINE_LENGTH, "dropping oversized inbound line");
                Ok(())
            }
            LinesCodecError::Io(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(error = %e, "dropping non-UTF-8 inbound line");
                Ok(())
            }
            other => Err(other),
        }
    }
}

impl Decoder for DeviceLineCodec {
    type Item = String;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        loop {
            match self.inner.decode(buf) {
                Err(e) => Self::skip(e)?,
                other => return other,
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, LinesCodecError> {
        loop {
            match self.inner.decode_eof(buf) {
                Err(e) => Self::skip(e)?,
                other => return other,
            }
        }
    }
}

impl Encoder<String> for DeviceLineCodec {
    type Error = LinesCodecError;

    fn encode(&mut self, line: String, buf: &mut BytesMut) -> Result<(), LinesCodecError> {
        self.inner.encode(line, buf)
    }
}

/// Frame any byte stream as newline-terminated lines.
///
/// Inbound `\r\n` and `\n` terminators are both accepted; outbound lines
/// get a single `\n`.
pub fn framed_lines<T>(io: T) -> LineTransport
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    let framed = Framed::new(io, DeviceLineCodec::new(MAX_LINE_LENGTH));
    let (sink, stream) = framed.split::<String>();

    LineTransport::new(
        sink.sink_map_err(Error::from),
        stream.map(|line| line.map_err(Error::from)),
    )
}
