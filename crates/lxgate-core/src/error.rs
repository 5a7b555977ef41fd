// ── Core error types ──
//
// User-facing errors from lxgate-core. These are NOT API-specific --
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<lxgate_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to gateway at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Gateway disconnected")]
    GatewayDisconnected,

    #[error("Gateway connection timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Operation rejected by gateway: {message}")]
    Rejected { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Export errors ────────────────────────────────────────────────
    #[error("Export failed: {message}")]
    Export { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<lxgate_api::Error> for CoreError {
    fn from(err: lxgate_api::Error) -> Self {
        match err {
            lxgate_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            lxgate_api::Error::InvalidToken => CoreError::AuthenticationFailed {
                message: "Invalid or expired access token".into(),
            },
            lxgate_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            lxgate_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            lxgate_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            lxgate_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            lxgate_api::Error::Gateway {
                message,
                code,
                status,
            } => {
                if status == 404 {
                    CoreError::NotFound {
                        entity_type: "resource".into(),
                        identifier: message,
                    }
                } else if status == 422 {
                    CoreError::Rejected { message }
                } else {
                    CoreError::Api {
                        message,
                        code,
                        status: Some(status),
                    }
                }
            }
            lxgate_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket connection failed: {reason}"),
            },
            lxgate_api::Error::WebSocketClosed { code, reason } => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("WebSocket closed (code {code}): {reason}"),
            },
            lxgate_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_404_maps_to_not_found() {
        let err: CoreError = lxgate_api::Error::Gateway {
            message: "no such sensor".into(),
            code: None,
            status: 404,
        }
        .into();

        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn gateway_422_maps_to_rejected() {
        let err: CoreError = lxgate_api::Error::Gateway {
            message: "ecc_signature is required".into(),
            code: None,
            status: 422,
        }
        .into();

        assert!(matches!(err, CoreError::Rejected { .. }));
    }

    #[test]
    fn invalid_token_maps_to_authentication() {
        let err: CoreError = lxgate_api::Error::InvalidToken.into();
        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    }
}
