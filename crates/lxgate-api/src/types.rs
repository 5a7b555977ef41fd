//! Wire types for the gateway REST API and the alert WebSocket.
//!
//! The gateway is inconsistent about field naming across its alert sources
//! (`blocked` vs `status` vs keyword-in-message, ISO strings vs epoch
//! timestamps), so [`RawAlert`] keeps everything optional and captures
//! unknown fields in `extra`. Normalization into a canonical domain type
//! happens in `lxgate-core`, not here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Alerts / logs ────────────────────────────────────────────────────

/// One alert-shaped object as the gateway sends it, untouched.
///
/// Delivered both by `GET /api/logs` (batched) and by each WebSocket
/// frame on `/ws/alerts` (single object). Also the shape of attack
/// simulation responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAlert {
    /// ISO-8601 string or epoch number; the gateway emits both.
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,

    #[serde(default)]
    pub sensor_id: Option<String>,

    #[serde(default)]
    pub attack_type: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    /// `"Low" | "Medium" | "High"`, any casing.
    #[serde(default)]
    pub severity: Option<String>,

    /// Explicit blocked flag. Only some gateway code paths set it.
    #[serde(default)]
    pub blocked: Option<bool>,

    /// Alternate blocked signal (`"blocked"` / `"allowed"`).
    #[serde(default)]
    pub status: Option<String>,

    /// Everything else the gateway sends.
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Response envelope of `GET /api/logs`.
#[derive(Debug, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<RawAlert>,
}

// ── Catalog endpoints ────────────────────────────────────────────────

/// Response of `GET /api/sensor-types`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorCatalog {
    #[serde(default)]
    pub sensor_types: Vec<String>,
    #[serde(default)]
    pub sensor_ids: Vec<String>,
}

/// One entry of `GET /api/attack-types`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackTypeInfo {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttackTypesResponse {
    #[serde(default)]
    pub attack_types: Vec<AttackTypeInfo>,
}

// ── Sensor readings ──────────────────────────────────────────────────

/// One reading from a sensor-family endpoint (`/api/soil`, `/api/water`, …).
///
/// Each family carries a different set of metric fields, so everything
/// beyond the identifying pair lands in `values`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(default)]
    pub sensor_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

// ── Attack simulation ────────────────────────────────────────────────

/// Which gateway endpoint a simulated attack is posted to.
///
/// The request body is attack-specific opaque JSON owned by the caller;
/// the response is alert-shaped and can be fed back into the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationTarget {
    Spoofing,
    Replay,
    FirmwareInjection,
    DriftDetect,
    Ddos,
}

impl SimulationTarget {
    /// Gateway path for this attack kind.
    pub fn path(self) -> &'static str {
        match self {
            Self::Spoofing => "api/validate",
            Self::Replay => "api/replay-protect",
            Self::FirmwareInjection => "api/detect/firmware_injection",
            Self::DriftDetect => "api/drift-detect",
            Self::Ddos => "sensor/threat/ddos",
        }
    }
}

// ── SHAP explanations ────────────────────────────────────────────────

/// One feature's contribution in a SHAP explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub contribution: f64,
}

/// Response of `POST /api/explain`.
///
/// Opaque model-interpretability output; rendered, never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapExplanation {
    #[serde(default)]
    pub base_value: f64,
    #[serde(default)]
    pub prediction: Option<f64>,
    #[serde(default)]
    pub feature_contributions: Vec<FeatureContribution>,
}

// ── Auth & admin ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// A gateway user account (admin panel).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<UserAccount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_alert_tolerates_sparse_payloads() {
        let alert: RawAlert = serde_json::from_str("{}").expect("empty object should parse");
        assert!(alert.timestamp.is_none());
        assert!(alert.sensor_id.is_none());
        assert!(alert.blocked.is_none());
    }

    #[test]
    fn raw_alert_captures_extra_fields() {
        let json = r#"{
            "timestamp": "2026-03-01T10:00:00Z",
            "sensor_id": "soil-0001",
            "attack_type": "spoofing",
            "severity": "HIGH",
            "ecc_signature": "wronghash"
        }"#;
        let alert: RawAlert = serde_json::from_str(json).expect("should parse");
        assert_eq!(alert.sensor_id.as_deref(), Some("soil-0001"));
        assert_eq!(alert.severity.as_deref(), Some("HIGH"));
        assert_eq!(alert.extra["ecc_signature"], "wronghash");
    }

    #[test]
    fn raw_alert_accepts_epoch_timestamp() {
        let alert: RawAlert =
            serde_json::from_str(r#"{"timestamp": 1767225600}"#).expect("should parse");
        assert!(alert.timestamp.as_ref().is_some_and(serde_json::Value::is_number));
    }

    #[test]
    fn logs_response_defaults_to_empty() {
        let resp: LogsResponse = serde_json::from_str("{}").expect("should parse");
        assert!(resp.logs.is_empty());
    }

    #[test]
    fn simulation_target_paths() {
        assert_eq!(SimulationTarget::Spoofing.path(), "api/validate");
        assert_eq!(SimulationTarget::Ddos.path(), "sensor/threat/ddos");
        assert_eq!(
            SimulationTarget::FirmwareInjection.path(),
            "api/detect/firmware_injection"
        );
    }
}
