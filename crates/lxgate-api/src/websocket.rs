//! Live alert stream over WebSocket.
//!
//! Connects to the gateway's `/ws/alerts` endpoint and fans parsed
//! [`RawAlert`] frames out through a [`tokio::sync::broadcast`] channel,
//! preserving arrival order. Each text frame is one JSON-encoded alert
//! object; malformed frames are dropped and logged, never fatal.
//!
//! Reconnection is an explicit opt-in: pass `Some(ReconnectConfig)` to get
//! exponential backoff with jitter and a bounded retry count, or `None`
//! for a single connection that ends when the transport drops (the
//! conservative default).
//!
//! # Example
//!
//! ```rust,ignore
//! use lxgate_api::websocket::{AlertStreamHandle, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let ws_url = Url::parse("wss://api.lx-gateway.tech/ws/alerts")?;
//!
//! let handle = AlertStreamHandle::connect(ws_url, Some(ReconnectConfig::default()), cancel.clone());
//! let mut rx = handle.subscribe();
//!
//! while let Ok(alert) = rx.recv().await {
//!     println!("{:?}: {:?}", alert.attack_type, alert.message);
//! }
//!
//! handle.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::types::RawAlert;

// ── Broadcast channel capacity ───────────────────────────────────────

const ALERT_CHANNEL_CAPACITY: usize = 1024;

// ── StreamStatus ─────────────────────────────────────────────────────

/// Observable lifecycle state of the alert stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for WebSocket reconnection.
///
/// Retries are always bounded; an unbounded blind-retry loop against a
/// dead gateway is an operational hazard, so there is no "forever" mode.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up. Default: 10.
    pub max_retries: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: 10,
        }
    }
}

// ── AlertStreamHandle ────────────────────────────────────────────────

/// Handle to a running alert stream.
///
/// The background task owns the socket; consumers attach via
/// [`subscribe`](Self::subscribe) and observe lifecycle transitions via
/// [`status`](Self::status). Drop all receivers and call
/// [`shutdown`](Self::shutdown) to tear the task down.
pub struct AlertStreamHandle {
    alert_rx: broadcast::Receiver<Arc<RawAlert>>,
    status_rx: watch::Receiver<StreamStatus>,
    cancel: CancellationToken,
}

impl AlertStreamHandle {
    /// Spawn the stream task and return immediately.
    ///
    /// The first connection attempt happens asynchronously; watch
    /// [`status`](Self::status) or subscribe to start consuming alerts.
    /// `reconnect: None` means the stream ends on the first transport
    /// failure or clean close.
    pub fn connect(
        ws_url: Url,
        reconnect: Option<ReconnectConfig>,
        cancel: CancellationToken,
    ) -> Self {
        let (alert_tx, alert_rx) = broadcast::channel(ALERT_CHANNEL_CAPACITY);
        let (status_tx, status_rx) = watch::channel(StreamStatus::Connecting);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            ws_loop(ws_url, alert_tx, status_tx, reconnect, task_cancel).await;
        });

        Self {
            alert_rx,
            status_rx,
            cancel,
        }
    }

    /// Get a new broadcast receiver for the alert stream.
    ///
    /// Multiple consumers can subscribe concurrently. If a consumer falls
    /// behind, it receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<RawAlert>> {
        self.alert_rx.resubscribe()
    }

    /// Observe stream status transitions.
    pub fn status(&self) -> watch::Receiver<StreamStatus> {
        self.status_rx.clone()
    }

    /// Signal the background task to shut down. Idempotent; no further
    /// alerts are delivered once the task observes the cancellation.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background loop ──────────────────────────────────────────────────

/// Main loop: connect → read → on error, either stop or backoff → reconnect.
async fn ws_loop(
    ws_url: Url,
    alert_tx: broadcast::Sender<Arc<RawAlert>>,
    status_tx: watch::Sender<StreamStatus>,
    reconnect: Option<ReconnectConfig>,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = connect_and_read(&ws_url, &alert_tx, &status_tx, &cancel) => {
                let failed = match result {
                    Ok(()) => {
                        tracing::info!("alert stream disconnected cleanly");
                        let _ = status_tx.send(StreamStatus::Disconnected);
                        attempt = 0;
                        false
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "alert stream error");
                        let _ = status_tx.send(StreamStatus::Error);
                        true
                    }
                };

                let Some(ref policy) = reconnect else {
                    // Single-connection mode: stop on any termination.
                    break;
                };

                if failed {
                    if attempt >= policy.max_retries {
                        tracing::error!(
                            max_retries = policy.max_retries,
                            "alert stream reconnection limit reached, giving up"
                        );
                        break;
                    }

                    let delay = calculate_backoff(attempt, policy);
                    tracing::info!(
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        attempt,
                        "waiting before reconnect"
                    );

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(delay) => {}
                    }

                    attempt += 1;
                }
            }
        }
    }

    let _ = status_tx.send(StreamStatus::Disconnected);
    tracing::debug!("alert stream loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one WebSocket connection and read frames until it drops.
async fn connect_and_read(
    url: &Url,
    alert_tx: &broadcast::Sender<Arc<RawAlert>>,
    status_tx: &watch::Sender<StreamStatus>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to alert stream");
    let _ = status_tx.send(StreamStatus::Connecting);

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;
    let request = ClientRequestBuilder::new(uri);

    let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("alert stream connected");
    let _ = status_tx.send(StreamStatus::Connected);

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        parse_and_broadcast(&text, alert_tx);
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite handles pong replies automatically
                        tracing::trace!("alert stream ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "alert stream close frame received"
                            );
                        } else {
                            tracing::info!("alert stream close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        // Stream ended without a close frame
                        tracing::info!("alert stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Pong, Frame -- ignore
                    }
                }
            }
        }
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

/// Parse one text frame as a single JSON alert object and broadcast it.
///
/// A frame that fails to parse is logged and skipped; the stream keeps
/// delivering subsequent valid frames.
fn parse_and_broadcast(text: &str, alert_tx: &broadcast::Sender<Arc<RawAlert>>) {
    let alert: RawAlert = match serde_json::from_str(text) {
        Ok(a) => a,
        Err(e) => {
            tracing::debug!(error = %e, "dropping malformed alert frame");
            return;
        }
    };

    // Ignore send errors -- just means no active subscribers right now
    let _ = alert_tx.send(Arc::new(alert));
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`
///
/// Jitter is +-25% to spread out reconnection storms from multiple clients.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(i32::try_from(attempt).unwrap_or(i32::MAX));
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic "jitter" seeded from the attempt number.
    // Not cryptographically random, but good enough for backoff spread.
    let jitter_factor = 1.0 + 0.25 * ((f64::from(attempt) * 7.3).sin());
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────
