// ── WebSocket line transport ──
//
// The device's web UI endpoint: one protocol line per text frame.
// Binary, ping and pong frames never reach the session layer
// (tungstenite answers pings itself).

use futures_util::{SinkExt, StreamExt, future};
use tokio_tungstenite::tungstenite::Message as Frame;
use url::Url;

use super::{Connector, LineTransport};
use crate::error::Error;

/// Path of the keypad socket on the device's web server.
pub const WEBSOCKET_PATH: &str = "/ad2ws";

/// Connects to a `ws://` or `wss://` endpoint.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    url: Url,
}

impl WebSocketConnector {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// `ws://<host>[:<port>]/ad2ws`
    pub fn for_host(host: &str, port: Option<u16>) -> Result<Self, Error> {
        let authority = match port {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        };
        let url = Url::parse(&format!("ws://{authority}{WEBSOCKET_PATH}"))?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl Connector for WebSocketConnector {
    fn endpoint(&self) -> String {
        self.url.to_string()
    }

    async fn connect(&self) -> Result<LineTransport, Error> {
        tracing::debug!(url = %self.url, "opening WebSocket transport");

        let (ws_stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| Error::Connect {
                endpoint: self.endpoint(),
                reason: e.to_string(),
            })?;

        let (sink, stream) = ws_stream.split();

        let sink = sink
            .sink_map_err(Error::from)
            .with(|line: String| future::ready(Ok::<_, Error>(Frame::text(line))));

        let stream = stream.filter_map(|frame| {
            future::ready(match frame {
                Ok(Frame::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Frame::Close(close)) => {
                    if let Some(ref cf) = close {
                        tracing::info!(code = %cf.code, reason = %cf.reason, "WebSocket close frame received");
                    } else {
                        tracing::info!("WebSocket close frame received (no payload)");
                    }
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(Error::from(e))),
            })
        });

        Ok(LineTransport::new(sink, stream))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn for_host_builds_keypad_url() {
        let connector = WebSocketConnector::for_host("192.168.1.50", None).unwrap();
        assert_eq!(connector.url().as_str(), "ws://192.168.1.50/ad2ws");
    }

    #[test]
    fn for_host_keeps_explicit_port() {
        let connector = WebSocketConnector::for_host("ad2iot.local", Some(8080)).unwrap();
        assert_eq!(connector.endpoint(), "ws://ad2iot.local:8080/ad2ws");
    }

    #[test]
    fn for_host_rejects_garbage() {
        assert!(WebSocketConnector::for_host("bad host name", None).is_err());
    }
}
