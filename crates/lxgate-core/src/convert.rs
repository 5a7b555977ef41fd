// ── API-to-domain type conversions ──
//
// Bridges raw `lxgate_api` response types into canonical `lxgate_core::model`
// domain types. The gateway's alert JSON is loosely shaped; conversion
// normalizes timestamps, parses severity into a strong type, and resolves
// the enforcement outcome from whichever field the gateway populated.

use chrono::{DateTime, Utc};

use lxgate_api::types::RawAlert;

use crate::model::{AlertEvent, Severity};

// ── Helpers ────────────────────────────────────────────────────────

/// Epoch values above this are taken as milliseconds rather than seconds.
/// (10^12 seconds is the year 33658; 10^12 milliseconds is 2001.)
const EPOCH_MILLIS_CUTOFF: i64 = 1_000_000_000_000;

/// Parse the gateway's timestamp field, which may be an ISO-8601 string or
/// a numeric epoch in seconds or milliseconds.
fn parse_timestamp(raw: Option<&serde_json::Value>) -> Option<DateTime<Utc>> {
    match raw? {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        serde_json::Value::Number(n) => {
            if let Some(epoch) = n.as_i64() {
                if epoch >= EPOCH_MILLIS_CUTOFF {
                    DateTime::from_timestamp_millis(epoch)
                } else {
                    DateTime::from_timestamp(epoch, 0)
                }
            } else {
                // Fractional epoch seconds
                n.as_f64().and_then(|secs| {
                    DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
                })
            }
        }
        _ => None,
    }
}

fn parse_severity(raw: Option<&str>) -> Severity {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

/// Resolve the enforcement outcome.
///
/// Precedence: the explicit `blocked` flag, then a `status` string, then
/// severity (the gateway blocks everything it rates High), then a
/// last-resort scan of the message text for older gateway builds that
/// only reported the outcome in prose.
fn resolve_blocked(raw: &RawAlert, severity: Severity) -> bool {
    if let Some(flag) = raw.blocked {
        return flag;
    }
    if let Some(status) = raw.status.as_deref() {
        return status.eq_ignore_ascii_case("blocked");
    }
    if severity == Severity::High {
        return true;
    }
    raw.message
        .as_deref()
        .is_some_and(|m| m.to_ascii_lowercase().contains("blocked"))
}

// ── RawAlert → AlertEvent ──────────────────────────────────────────

impl From<RawAlert> for AlertEvent {
    fn from(raw: RawAlert) -> Self {
        let timestamp = parse_timestamp(raw.timestamp.as_ref()).unwrap_or_else(Utc::now);
        let severity = parse_severity(raw.severity.as_deref());
        let blocked = resolve_blocked(&raw, severity);

        AlertEvent {
            timestamp,
            sensor_id: raw.sensor_id,
            attack_type: raw.attack_type.unwrap_or_else(|| "Normal".into()),
            message: raw.message.unwrap_or_default(),
            severity,
            blocked,
            extra: raw.extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw_from(value: serde_json::Value) -> RawAlert {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn iso_timestamp_parses() {
        let event: AlertEvent = raw_from(json!({
            "timestamp": "2026-03-01T10:00:05Z",
            "attack_type": "replay",
        }))
        .into();

        assert_eq!(event.timestamp.timestamp(), 1_772_359_205);
    }

    #[test]
    fn epoch_seconds_and_millis_both_parse() {
        let secs: AlertEvent = raw_from(json!({ "timestamp": 1_772_359_205_i64 })).into();
        let millis: AlertEvent = raw_from(json!({ "timestamp": 1_772_359_205_000_i64 })).into();

        assert_eq!(secs.timestamp, millis.timestamp);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let event: AlertEvent = raw_from(json!({})).into();

        assert_eq!(event.attack_type, "Normal");
        assert_eq!(event.severity, Severity::Low);
        assert!(event.message.is_empty());
        assert!(!event.blocked);
        assert!(event.sensor_id.is_none());
    }

    #[test]
    fn severity_parses_case_insensitively() {
        let event: AlertEvent = raw_from(json!({ "severity": "HIGH" })).into();
        assert_eq!(event.severity, Severity::High);

        let event: AlertEvent = raw_from(json!({ "severity": "garbage" })).into();
        assert_eq!(event.severity, Severity::Low);
    }

    #[test]
    fn explicit_blocked_flag_wins() {
        // Flag overrides a High severity that would otherwise imply blocked
        let event: AlertEvent = raw_from(json!({
            "severity": "High",
            "blocked": false,
        }))
        .into();
        assert!(!event.blocked);
    }

    #[test]
    fn status_string_resolves_blocked() {
        let event: AlertEvent = raw_from(json!({
            "severity": "Medium",
            "status": "Blocked",
        }))
        .into();
        assert!(event.blocked);

        let event: AlertEvent = raw_from(json!({
            "severity": "High",
            "status": "allowed",
        }))
        .into();
        assert!(!event.blocked);
    }

    #[test]
    fn high_severity_implies_blocked() {
        let event: AlertEvent = raw_from(json!({
            "timestamp": "2026-03-01T10:00:05Z",
            "sensor_id": "soil-0001",
            "attack_type": "spoofing",
            "severity": "High",
            "message": "ECC signature mismatch",
        }))
        .into();

        assert!(event.blocked);
        assert_eq!(event.status_label(), "Blocked");
    }

    #[test]
    fn message_scan_is_last_resort() {
        let event: AlertEvent = raw_from(json!({
            "severity": "Low",
            "message": "Request was BLOCKED by the replay guard",
        }))
        .into();
        assert!(event.blocked);
    }

    #[test]
    fn unknown_fields_survive_in_extra() {
        let event: AlertEvent = raw_from(json!({
            "attack_type": "ddos",
            "packet_rate": 412,
        }))
        .into();

        assert_eq!(event.extra.get("packet_rate").and_then(|v| v.as_i64()), Some(412));
    }
}
