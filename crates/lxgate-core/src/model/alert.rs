// ── Alert domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity, ordered so that `High` compares greatest.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

/// Unified alert from the live WebSocket stream or the audit log endpoint.
///
/// Normal (non-attack) traffic also arrives as events; `attack_type` is the
/// literal `"Normal"` in that case and `blocked` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub timestamp: DateTime<Utc>,
    pub sensor_id: Option<String>,
    pub attack_type: String,
    pub message: String,
    pub severity: Severity,
    pub blocked: bool,

    /// Fields the gateway sent that the canonical model does not name.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

impl AlertEvent {
    /// Identity used for cross-source deduplication between the live stream
    /// and audit log polls.
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            timestamp_ms: self.timestamp.timestamp_millis(),
            sensor_id: self.sensor_id.clone(),
            attack_type: self.attack_type.clone(),
        }
    }

    /// Human-readable enforcement outcome.
    pub fn status_label(&self) -> &'static str {
        if self.blocked { "Blocked" } else { "Allowed" }
    }

    /// Whether this event represents detected attack traffic.
    pub fn is_attack(&self) -> bool {
        !self.attack_type.eq_ignore_ascii_case("normal")
    }
}

/// Deduplication identity for an [`AlertEvent`].
///
/// Millisecond timestamp resolution matches what the gateway emits; two
/// distinct events never legitimately share all three fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub timestamp_ms: i64,
    pub sensor_id: Option<String>,
    pub attack_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(attack_type: &str, blocked: bool) -> AlertEvent {
        AlertEvent {
            timestamp: DateTime::from_timestamp(1_767_675_600, 0).unwrap(),
            sensor_id: Some("soil-0001".into()),
            attack_type: attack_type.into(),
            message: "test".into(),
            severity: Severity::Low,
            blocked,
            extra: serde_json::Value::Null,
        }
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("MEDIUM".parse::<Severity>().unwrap(), Severity::Medium);
        assert_eq!("Low".parse::<Severity>().unwrap(), Severity::Low);
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn status_label_reflects_blocked() {
        assert_eq!(event("spoofing", true).status_label(), "Blocked");
        assert_eq!(event("spoofing", false).status_label(), "Allowed");
    }

    #[test]
    fn normal_traffic_is_not_an_attack() {
        assert!(!event("Normal", false).is_attack());
        assert!(!event("normal", false).is_attack());
        assert!(event("replay", false).is_attack());
    }

    #[test]
    fn dedup_key_equality() {
        let a = event("spoofing", true);
        let mut b = a.clone();
        b.message = "different message".into();
        b.severity = Severity::High;

        // Message and severity differences do not affect identity
        assert_eq!(a.dedup_key(), b.dedup_key());

        let mut c = a.clone();
        c.attack_type = "replay".into();
        assert_ne!(a.dedup_key(), c.dedup_key());
    }
}
