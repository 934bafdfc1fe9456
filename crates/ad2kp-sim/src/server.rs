// ── Replay server ──
//
// One accept loop, one task per peer. Each peer task owns its cursor and
// its tick interval, so a disconnect drops both with the task.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use ad2kp_api::{ControlLine, ControlVerb, Message, PING_MASK, parse_line};

use crate::error::SimError;
use crate::replay::{PauseFlag, ReplayCursor, ReplayLog};

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(800);

const MAX_INBOUND_LINE: usize = 8 * 1024;

/// Listener settings.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub bind: IpAddr,
    pub port: u16,
    /// Time between lines on each connection.
    pub interval: Duration,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Bound replay listener.
pub struct ReplayServer {
    listener: TcpListener,
    log: ReplayLog,
    pause: PauseFlag,
    interval: Duration,
    cancel: CancellationToken,
}

impl ReplayServer {
    pub async fn bind(config: &ReplayConfig, log: ReplayLog, pause: PauseFlag) -> Result<Self, SimError> {
        let addr = SocketAddr::new(config.bind, config.port);
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| SimError::Bind { addr, source })?;

        Ok(Self {
            listener,
            log,
            pause,
            interval: config.interval,
            cancel: CancellationToken::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SimError> {
        Ok(self.listener.local_addr()?)
    }

    /// Token that stops the accept loop and every session.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Accept and serve peers until cancelled.
    pub async fn run(self) -> Result<(), SimError> {
        info!(addr = %self.local_addr()?, lines = self.log.len(), "listening for connections");

        loop {
            let accepted = tokio::select! {
                () = self.cancel.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            let (stream, peer) = match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            };

            let session = Session {
                log: self.log.clone(),
                pause: self.pause.clone(),
                interval: self.interval,
                cancel: self.cancel.child_token(),
            };
            tokio::spawn(session.serve(stream).instrument(info_span!("peer", %peer)));
        }

        debug!("accept loop stopped");
        Ok(())
    }
}

struct Session {
    log: ReplayLog,
    pause: PauseFlag,
    interval: Duration,
    cancel: CancellationToken,
}

impl Session {
    async fn serve(self, stream: TcpStream) {
        info!("client connected");
        match self.replay(stream).await {
            Ok(()) => info!("client disconnected"),
            Err(e) => warn!(error = %e, "session ended with error"),
        }
    }

    async fn replay(self, stream: TcpStream) -> Result<(), SimError> {
        let (reader, mut writer) = stream.into_split();
        let mut inbound = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_INBOUND_LINE));

        let mut cursor = ReplayCursor::new();
        let mut tick = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => return Ok(()),

                _ = tick.tick() => {
                    if self.pause.is_paused() {
                        continue;
                    }
                    let position = cursor.position();
                    if let Some(line) = cursor.advance(&self.log) {
                        debug!(cursor = position, line, "replay");
                        writer.write_all(format!("{line}\r\n").as_bytes()).await?;
                    }
                }

                line = inbound.next() => match line {
                    Some(Ok(line)) => match parse_line(&line) {
                        Ok(None) => {}
                        Ok(Some(Message::Control(control))) if control.verb == ControlVerb::Ping => {
                            debug!(mask = %control.payload, "answering heartbeat");
                            let pong = ControlLine::pong(PING_MASK);
                            writer.write_all(format!("{pong}\r\n").as_bytes()).await?;
                        }
                        Ok(Some(Message::Control(control))) if control.verb == ControlVerb::Sync => {
                            match control.sync_target() {
                                Some((partition, code)) => info!(partition, code, "client requested sync"),
                                None => warn!(payload = %control.payload, "unparseable sync request"),
                            }
                        }
                        _ => info!(line = line.trim_end_matches('\r'), "received"),
                    },
                    Some(Err(e)) => {
                        warn!(error = %e, "dropping client after bad input");
                        return Ok(());
                    }
                    None => return Ok(()),
                },
            }
        }
    }
}
