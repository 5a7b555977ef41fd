// ── Monitor abstraction ──
//
// Full lifecycle management for a gateway connection. Handles
// authentication, the live alert stream, periodic audit log polling,
// command routing, and reactive snapshots through the AuditLog store.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::{AuthToken, GatewayConfig, TlsVerification};
use crate::error::CoreError;
use crate::feed::LogStream;
use crate::model::{AlertEvent, AttackKind};
use crate::store::AuditLog;

use lxgate_api::transport::{TlsMode, TransportConfig};
use lxgate_api::websocket::{AlertStreamHandle, ReconnectConfig, StreamStatus};
use lxgate_api::GatewayClient;

const COMMAND_CHANNEL_SIZE: usize = 64;
const ALERT_CHANNEL_SIZE: usize = 256;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Monitor ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<MonitorInner>`. One Monitor owns the
/// alert stream and the audit log for a gateway; spin up additional
/// subscriptions via [`logs()`](Self::logs) and [`alerts()`](Self::alerts)
/// rather than additional Monitors.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: GatewayConfig,
    log: Arc<AuditLog>,
    connection_state: watch::Sender<ConnectionState>,
    alert_tx: broadcast::Sender<Arc<AlertEvent>>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    client: Mutex<Option<GatewayClient>>,
    stream_status: Mutex<Option<watch::Receiver<StreamStatus>>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Monitor {
    /// Create a new Monitor from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to authenticate and start
    /// background tasks.
    pub fn new(config: GatewayConfig) -> Self {
        let log = Arc::new(AuditLog::new(config.log_capacity));
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (alert_tx, _) = broadcast::channel(ALERT_CHANNEL_SIZE);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        Self {
            inner: Arc::new(MonitorInner {
                config,
                log,
                connection_state,
                alert_tx,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                client: Mutex::new(None),
                stream_status: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the monitor configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Access the underlying audit log store.
    pub fn log(&self) -> &Arc<AuditLog> {
        &self.inner.log
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to the gateway.
    ///
    /// Authenticates, performs an initial audit log poll, and spawns
    /// background tasks (alert stream ingest, periodic poll, command
    /// processor).
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        let config = &self.inner.config;
        let transport = build_transport(config);

        let (client, token) = match authenticate(config, &transport).await {
            Ok(pair) => pair,
            Err(e) => {
                let _ = self.inner.connection_state.send(ConnectionState::Failed);
                return Err(e);
            }
        };

        *self.inner.client.lock().await = Some(client);

        // Initial audit log load
        if let Err(e) = self.refresh().await {
            let _ = self.inner.connection_state.send(ConnectionState::Failed);
            return Err(e);
        }

        // Spawn background tasks
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let monitor = self.clone();
            handles.push(tokio::spawn(command_processor_task(monitor, rx)));
        }

        let interval_secs = config.poll_interval_secs;
        if interval_secs > 0 {
            let monitor = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(poll_task(monitor, interval_secs, cancel)));
        }

        if config.websocket_enabled {
            let ws_url = {
                let guard = self.inner.client.lock().await;
                let client = guard.as_ref().ok_or(CoreError::GatewayDisconnected)?;
                client.alerts_ws_url(token.as_ref())?
            };

            let reconnect = config
                .ws_auto_reconnect
                .then(ReconnectConfig::default);

            let handle =
                AlertStreamHandle::connect(ws_url, reconnect, self.inner.cancel.child_token());
            *self.inner.stream_status.lock().await = Some(handle.status());

            let monitor = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(ingest_task(monitor, handle, cancel)));
        }

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!("connected to gateway");
        Ok(())
    }

    /// Disconnect from the gateway.
    ///
    /// Cancels background tasks (alert stream included) and resets the
    /// connection state. The audit log keeps its contents.
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        // Join all background tasks
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        *self.inner.client.lock().await = None;
        *self.inner.stream_status.lock().await = None;
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Poll the gateway's audit log once and reconcile the store.
    ///
    /// Polled entries are authoritative; live-stream alerts the gateway
    /// has not persisted yet are retained.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let client_guard = self.inner.client.lock().await;
        let client = client_guard.as_ref().ok_or(CoreError::GatewayDisconnected)?;

        let raw = client.list_logs().await?;
        drop(client_guard);

        let events: Vec<AlertEvent> = raw.into_iter().map(AlertEvent::from).collect();
        let count = events.len();
        self.inner.log.replace_from_poll(events);

        debug!(entries = count, "audit log poll complete");
        Ok(())
    }

    /// A clone of the connected API client, for read endpoints that
    /// bypass the audit log (sensor catalogs, readings, explanations).
    pub async fn api(&self) -> Result<GatewayClient, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::GatewayDisconnected)
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the gateway.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::GatewayDisconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::GatewayDisconnected)?;

        rx.await.map_err(|_| CoreError::GatewayDisconnected)?
    }

    /// Convenience: validate and run an attack simulation, returning the
    /// resulting alert.
    pub async fn simulate(
        &self,
        kind: AttackKind,
        payload: serde_json::Value,
    ) -> Result<AlertEvent, CoreError> {
        validate_simulation_payload(&payload)?;

        match self.execute(Command::Simulate { kind, payload }).await? {
            CommandResult::Alert(event) => Ok(event),
            CommandResult::Ok => Err(CoreError::Internal(
                "simulation returned no alert".into(),
            )),
        }
    }

    /// Convenience: clear the audit log, optionally the gateway's
    /// persisted copy too.
    pub async fn reset_logs(&self, clear_remote: bool) -> Result<(), CoreError> {
        self.execute(Command::ResetLogs { clear_remote }).await?;
        Ok(())
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Optimized for CLI: disables the WebSocket stream and periodic
    /// polling since we only need a single request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: GatewayConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Monitor) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.websocket_enabled = false;
        cfg.poll_interval_secs = 0;

        let monitor = Monitor::new(cfg);
        monitor.connect().await?;
        let result = f(monitor.clone()).await;
        monitor.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Subscribe to the alert broadcast stream (live alerts only, after
    /// dedup against the stored log).
    pub fn alerts(&self) -> broadcast::Receiver<Arc<AlertEvent>> {
        self.inner.alert_tx.subscribe()
    }

    /// Observe the WebSocket stream lifecycle, when enabled.
    pub async fn stream_status(&self) -> Option<watch::Receiver<StreamStatus>> {
        self.inner.stream_status.lock().await.clone()
    }

    // ── Snapshot accessors (delegate to AuditLog) ────────────────

    pub fn snapshot(&self) -> Arc<Vec<Arc<AlertEvent>>> {
        self.inner.log.snapshot()
    }

    pub fn logs(&self) -> LogStream {
        self.inner.log.subscribe()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically reconcile the audit log against the gateway.
async fn poll_task(monitor: Monitor, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = monitor.refresh().await {
                    warn!(error = %e, "periodic audit log poll failed");
                }
            }
        }
    }
}

/// Consume the live alert stream: convert, dedup into the log, and
/// re-broadcast accepted alerts to subscribers.
async fn ingest_task(monitor: Monitor, handle: AlertStreamHandle, cancel: CancellationToken) {
    let mut rx = handle.subscribe();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = rx.recv() => {
                match received {
                    Ok(raw) => {
                        let event = AlertEvent::from((*raw).clone());
                        if monitor.inner.log.prepend(event.clone()) {
                            let _ = monitor.inner.alert_tx.send(Arc::new(event));
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // The next poll re-fetches anything we skipped
                        warn!(missed, "alert ingest lagged behind the stream");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    handle.shutdown();
}

/// Process commands from the mpsc channel, routing each to the
/// appropriate gateway endpoint.
async fn command_processor_task(monitor: Monitor, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = monitor.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&monitor, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(monitor: &Monitor, cmd: Command) -> Result<CommandResult, CoreError> {
    let client_guard = monitor.inner.client.lock().await;
    let client = client_guard.as_ref().ok_or(CoreError::GatewayDisconnected)?;

    match cmd {
        Command::Simulate { kind, payload } => {
            validate_simulation_payload(&payload)?;

            let raw = client.simulate(kind.target(), &payload).await?;
            drop(client_guard);

            let event = AlertEvent::from(raw);
            if monitor.inner.log.prepend(event.clone()) {
                let _ = monitor.inner.alert_tx.send(Arc::new(event.clone()));
            }
            Ok(CommandResult::Alert(event))
        }

        Command::ResetLogs { clear_remote } => {
            // Remote first: the local store is only reset once the
            // gateway acknowledged the clear.
            if clear_remote {
                client.clear_logs().await?;
            }
            drop(client_guard);

            monitor.inner.log.reset();
            Ok(CommandResult::Ok)
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Pre-network validation of a simulation payload. The gateway would
/// reject these too, but failing early gives a clearer message.
fn validate_simulation_payload(payload: &serde_json::Value) -> Result<(), CoreError> {
    let Some(object) = payload.as_object() else {
        return Err(CoreError::ValidationFailed {
            message: "simulation payload must be a JSON object".into(),
        });
    };

    match object.get("sensor_id").and_then(|v| v.as_str()) {
        Some(id) if !id.is_empty() => Ok(()),
        _ => Err(CoreError::ValidationFailed {
            message: "simulation payload requires a non-empty sensor_id".into(),
        }),
    }
}

/// Build a [`TransportConfig`] from the monitor configuration.
fn build_transport(config: &GatewayConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

/// Authenticate per the configured method. Returns the ready client and
/// the session token for the WebSocket URL, if one applies.
async fn authenticate(
    config: &GatewayConfig,
    transport: &TransportConfig,
) -> Result<(GatewayClient, Option<SecretString>), CoreError> {
    match &config.auth {
        AuthToken::None => Ok((GatewayClient::new(config.url.as_str(), transport)?, None)),
        AuthToken::Bearer(token) => Ok((
            GatewayClient::from_token(config.url.as_str(), token, transport)?,
            Some(token.clone()),
        )),
        AuthToken::Credentials { username, password } => {
            use secrecy::ExposeSecret;

            let bootstrap = GatewayClient::new(config.url.as_str(), transport)?;
            let login = bootstrap.login(username, password.expose_secret()).await?;
            debug!("session authentication successful");

            let token = SecretString::from(login.access_token);
            let client = GatewayClient::from_token(config.url.as_str(), &token, transport)?;
            Ok((client, Some(token)))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn payload_must_be_an_object() {
        let result = validate_simulation_payload(&json!([1, 2, 3]));
        assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
    }

    #[test]
    fn payload_requires_sensor_id() {
        let result = validate_simulation_payload(&json!({ "threshold": 10 }));
        assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));

        let result = validate_simulation_payload(&json!({ "sensor_id": "" }));
        assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));

        assert!(validate_simulation_payload(&json!({ "sensor_id": "soil-0001" })).is_ok());
    }

    #[test]
    fn sample_payloads_pass_validation() {
        use strum::IntoEnumIterator;

        for kind in AttackKind::iter() {
            let payload = kind.sample_payload("soil-0001");
            assert!(
                validate_simulation_payload(&payload).is_ok(),
                "sample payload for {kind} must validate"
            );
        }
    }

    #[tokio::test]
    async fn execute_requires_connection() {
        let monitor = Monitor::new(GatewayConfig::default());
        let result = monitor
            .execute(Command::ResetLogs {
                clear_remote: false,
            })
            .await;

        assert!(matches!(result, Err(CoreError::GatewayDisconnected)));
    }
}
