// ── Runtime connection configuration ──
//
// These types describe *how* to connect to a sensor gateway.
// They carry credential data and connection tuning, but never touch disk.
// The CLI constructs a `GatewayConfig` and hands it in.

use secrecy::SecretString;
use url::Url;

use crate::store::DEFAULT_CAPACITY;

/// How to authenticate with a gateway.
#[derive(Debug, Clone, Default)]
pub enum AuthToken {
    /// Anonymous access (open gateways, local development).
    #[default]
    None,
    /// Pre-issued bearer token.
    Bearer(SecretString),
    /// Login with credentials, exchange for a session token.
    Credentials {
        username: String,
        password: SecretString,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default)]
pub enum TlsVerification {
    /// System CA store (strict). The default.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs on lab gateways).
    DangerAcceptInvalid,
}

impl PartialEq for TlsVerification {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SystemDefaults, Self::SystemDefaults)
            | (Self::DangerAcceptInvalid, Self::DangerAcceptInvalid) => true,
            (Self::CustomCa(a), Self::CustomCa(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TlsVerification {}

/// Configuration for connecting to a single gateway.
///
/// Built by the CLI, passed to `Monitor` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway base URL (e.g., `https://gateway.example.com`).
    pub url: Url,
    /// Authentication method and credentials.
    pub auth: AuthToken,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: std::time::Duration,
    /// How often to poll the audit log endpoint (seconds). 0 = never.
    pub poll_interval_secs: u64,
    /// Enable the live WebSocket alert stream.
    pub websocket_enabled: bool,
    /// Reconnect the alert stream automatically after transport errors.
    pub ws_auto_reconnect: bool,
    /// In-memory audit log retention limit.
    pub log_capacity: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            // FastAPI development default
            url: Url::parse("http://127.0.0.1:8000").expect("static default URL"),
            auth: AuthToken::None,
            tls: TlsVerification::default(),
            timeout: std::time::Duration::from_secs(30),
            poll_interval_secs: 10,
            websocket_enabled: true,
            ws_auto_reconnect: true,
            log_capacity: DEFAULT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_gateway_conventions() {
        let config = GatewayConfig::default();
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.log_capacity, DEFAULT_CAPACITY);
        assert!(config.websocket_enabled);
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }
}
