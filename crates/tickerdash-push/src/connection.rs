//! Push channel connection manager.
//!
//! Connects to the backend websocket, decodes text frames into
//! [`PushEvent`]s and publishes them on a [`PushHub`]. Reconnects with
//! exponential backoff until shut down or out of attempts.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tickerdash_telemetry::Metrics;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{PushError, PushResult};
use crate::event::PushEvent;
use crate::hub::PushHub;

fn default_url() -> String {
    "ws://localhost:5000/ws".to_string()
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

/// Connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Websocket URL.
    #[serde(default = "default_url")]
    pub url: String,
    /// Maximum reconnection attempts (0 = infinite).
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            max_reconnect_attempts: 0,
            reconnect_base_delay_ms: default_base_delay_ms(),
            reconnect_max_delay_ms: default_max_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Push channel client.
pub struct PushClient {
    config: PushConfig,
    hub: PushHub,
    state: Arc<RwLock<ConnectionState>>,
    reconnect_count: Arc<RwLock<u32>>,
    shutdown_token: CancellationToken,
}

impl PushClient {
    pub fn new(config: PushConfig, hub: PushHub) -> Self {
        Self {
            config,
            hub,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            reconnect_count: Arc::new(RwLock::new(0)),
            shutdown_token: CancellationToken::new(),
        }
    }

    pub fn hub(&self) -> &PushHub {
        &self.hub
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Consecutive failed attempts since the last successful connect.
    pub fn reconnect_count(&self) -> u32 {
        *self.reconnect_count.read()
    }

    /// Signal graceful shutdown. The message loop sends a close frame and
    /// the reconnect loop exits.
    pub fn shutdown(&self) {
        info!("Push client shutdown requested");
        self.shutdown_token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Connect and run until shutdown or until reconnect attempts run out.
    pub async fn run(&self) -> PushResult<()> {
        let mut attempt = 0u32;

        loop {
            if self.is_shutdown() {
                info!("Shutdown requested, exiting connect loop");
                self.set_state(ConnectionState::Disconnected);
                return Ok(());
            }

            self.set_state(ConnectionState::Connecting);

            let reason = match self.try_connect(&mut attempt).await {
                Ok(()) => {
                    info!("Push channel closed");
                    "closed".to_string()
                }
                Err(e) => {
                    error!(error = %e, "Push channel error");
                    e.to_string()
                }
            };

            if self.is_shutdown() {
                info!("Shutdown requested after disconnect, not reconnecting");
                self.set_state(ConnectionState::Disconnected);
                return Ok(());
            }

            attempt += 1;
            *self.reconnect_count.write() = attempt;

            if self.config.max_reconnect_attempts > 0
                && attempt >= self.config.max_reconnect_attempts
            {
                error!(attempt, "Max reconnection attempts reached");
                self.set_state(ConnectionState::Disconnected);
                return Err(PushError::ConnectionFailed(format!(
                    "Max reconnection attempts reached: {reason}"
                )));
            }

            self.set_state(ConnectionState::Reconnecting);
            Metrics::push_reconnect();

            let delay = self.backoff_delay(attempt);
            warn!(attempt, delay_ms = delay.as_millis() as u64, "Reconnecting push channel");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested during backoff, exiting");
                    self.set_state(ConnectionState::Disconnected);
                    return Ok(());
                }
            }
        }
    }

    async fn try_connect(&self, attempt: &mut u32) -> PushResult<()> {
        info!(url = %self.config.url, "Connecting push channel");

        let (ws_stream, _response) = tokio::select! {
            connected = connect_async(self.config.url.as_str()) => connected?,
            () = self.shutdown_token.cancelled() => return Ok(()),
        };
        let (mut write, mut read) = ws_stream.split();

        self.set_state(ConnectionState::Connected);
        *attempt = 0;
        *self.reconnect_count.write() = 0;
        Metrics::push_connected();
        self.hub.publish(PushEvent::Connected);
        info!("Push channel connected");

        let result = loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received in message loop");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        warn!(error = %e, "Failed to send close frame during shutdown");
                    }
                    break Ok(());
                }

                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.handle_text(&text),
                    Some(Ok(Message::Ping(data))) => {
                        debug!("Received ping, sending pong");
                        if let Err(e) = write.send(Message::Pong(data)).await {
                            break Err(e.into());
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (f.code.into(), f.reason.to_string()))
                            .unwrap_or((1000, "Normal close".to_string()));
                        warn!(code, %reason, "Push channel closed by server");
                        break Err(PushError::ConnectionClosed { code, reason });
                    }
                    Some(Err(e)) => break Err(e.into()),
                    None => {
                        warn!("Push stream ended");
                        break Ok(());
                    }
                    Some(Ok(_)) => {}
                },
            }
        };

        Metrics::push_disconnected();
        let reason = match &result {
            Ok(()) if self.is_shutdown() => "shutdown".to_string(),
            Ok(()) => "stream ended".to_string(),
            Err(e) => e.to_string(),
        };
        self.hub.publish(PushEvent::Disconnected { reason });
        result
    }

    fn handle_text(&self, text: &str) {
        let Some(event) = PushEvent::parse(text) else {
            return;
        };
        Metrics::push_event(event.kind());
        if let PushEvent::Error { message } = &event {
            warn!(%message, "Backend reported error on push channel");
        }
        let receivers = self.hub.publish(event);
        debug!(receivers, "Push event published");
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    /// base * 2^(attempt-1), capped at max, plus 0-1000ms jitter.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(10);
        let delay = self
            .config
            .reconnect_base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.config.reconnect_max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0..=1000);
        Duration::from_millis(delay + jitter)
    }
}
