// ── Filter predicates for audit log snapshots ──
//
// Pure predicates used by consumers to narrow snapshots without
// re-querying the gateway. Filtering never mutates the stored log.

use std::sync::Arc;

use chrono::{Local, NaiveDate};

use crate::model::{AlertEvent, Severity};

/// Severity criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeverityFilter {
    #[default]
    All,
    Exact(Severity),
    AtLeast(Severity),
}

impl SeverityFilter {
    fn matches(self, severity: Severity) -> bool {
        match self {
            Self::All => true,
            Self::Exact(s) => severity == s,
            Self::AtLeast(s) => severity >= s,
        }
    }
}

/// Composite filter over audit log entries. All set criteria must match.
///
/// The default filter matches everything; applying it is the identity.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub severity: SeverityFilter,
    /// Exact attack type, compared case-insensitively.
    pub attack_type: Option<String>,
    /// Case-insensitive substring match on the sensor id.
    pub sensor_query: Option<String>,
    /// Calendar day in the local timezone.
    pub date: Option<NaiveDate>,
    /// Only entries the gateway blocked.
    pub only_blocked: bool,
}

impl LogFilter {
    pub fn severity(mut self, filter: SeverityFilter) -> Self {
        self.severity = filter;
        self
    }

    pub fn attack_type(mut self, attack_type: impl Into<String>) -> Self {
        self.attack_type = Some(attack_type.into());
        self
    }

    pub fn sensor_query(mut self, query: impl Into<String>) -> Self {
        self.sensor_query = Some(query.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn only_blocked(mut self) -> Self {
        self.only_blocked = true;
        self
    }

    /// Whether a single entry satisfies every set criterion.
    pub fn matches(&self, event: &AlertEvent) -> bool {
        if !self.severity.matches(event.severity) {
            return false;
        }

        if let Some(ref wanted) = self.attack_type {
            if !event.attack_type.eq_ignore_ascii_case(wanted) {
                return false;
            }
        }

        if let Some(ref query) = self.sensor_query {
            let Some(ref sensor_id) = event.sensor_id else {
                return false;
            };
            if !sensor_id
                .to_ascii_lowercase()
                .contains(&query.to_ascii_lowercase())
            {
                return false;
            }
        }

        if let Some(date) = self.date {
            if event.timestamp.with_timezone(&Local).date_naive() != date {
                return false;
            }
        }

        if self.only_blocked && !event.blocked {
            return false;
        }

        true
    }

    /// Apply the filter to a snapshot, preserving order.
    pub fn apply(&self, snapshot: &[Arc<AlertEvent>]) -> Vec<Arc<AlertEvent>> {
        snapshot
            .iter()
            .filter(|e| self.matches(e))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn event(attack_type: &str, severity: Severity, blocked: bool) -> Arc<AlertEvent> {
        Arc::new(AlertEvent {
            timestamp: DateTime::from_timestamp(1_772_359_200, 0).unwrap(),
            sensor_id: Some("soil-0001".into()),
            attack_type: attack_type.into(),
            message: String::new(),
            severity,
            blocked,
            extra: serde_json::Value::Null,
        })
    }

    fn sample_snapshot() -> Vec<Arc<AlertEvent>> {
        vec![
            event("spoofing", Severity::High, true),
            event("replay", Severity::Medium, false),
            event("Normal", Severity::Low, false),
            event("ddos", Severity::High, true),
        ]
    }

    #[test]
    fn default_filter_is_identity() {
        let snapshot = sample_snapshot();
        let filtered = LogFilter::default().apply(&snapshot);
        assert_eq!(filtered.len(), snapshot.len());
    }

    #[test]
    fn filtering_is_idempotent() {
        let snapshot = sample_snapshot();
        let filter = LogFilter::default().severity(SeverityFilter::Exact(Severity::High));

        let once = filter.apply(&snapshot);
        let twice = filter.apply(&once);
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn criteria_combine_with_and() {
        let snapshot = sample_snapshot();
        let filter = LogFilter::default()
            .severity(SeverityFilter::Exact(Severity::High))
            .attack_type("ddos");

        let filtered = filter.apply(&snapshot);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].attack_type, "ddos");
    }

    #[test]
    fn only_blocked_keeps_blocked_entries() {
        let snapshot = sample_snapshot();
        let filtered = LogFilter::default().only_blocked().apply(&snapshot);

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|e| e.blocked));
    }

    #[test]
    fn attack_type_is_case_insensitive() {
        let snapshot = sample_snapshot();
        let filtered = LogFilter::default().attack_type("SPOOFING").apply(&snapshot);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn sensor_query_matches_substring() {
        let snapshot = sample_snapshot();

        let filtered = LogFilter::default().sensor_query("SOIL").apply(&snapshot);
        assert_eq!(filtered.len(), snapshot.len());

        let filtered = LogFilter::default().sensor_query("water").apply(&snapshot);
        assert!(filtered.is_empty());
    }

    #[test]
    fn sensor_query_excludes_entries_without_sensor() {
        let mut anonymous = (*event("ddos", Severity::High, true)).clone();
        anonymous.sensor_id = None;
        let snapshot = vec![Arc::new(anonymous)];

        let filtered = LogFilter::default().sensor_query("soil").apply(&snapshot);
        assert!(filtered.is_empty());
    }

    #[test]
    fn date_matches_local_calendar_day() {
        let snapshot = sample_snapshot();
        let day = snapshot[0].timestamp.with_timezone(&Local).date_naive();

        let filtered = LogFilter::default().date(day).apply(&snapshot);
        assert_eq!(filtered.len(), snapshot.len());

        let other_day = day.pred_opt().unwrap();
        let filtered = LogFilter::default().date(other_day).apply(&snapshot);
        assert!(filtered.is_empty());
    }

    #[test]
    fn at_least_severity() {
        let snapshot = sample_snapshot();
        let filtered = LogFilter::default()
            .severity(SeverityFilter::AtLeast(Severity::Medium))
            .apply(&snapshot);

        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn order_is_preserved() {
        let snapshot = sample_snapshot();
        let filtered = LogFilter::default()
            .severity(SeverityFilter::Exact(Severity::High))
            .apply(&snapshot);

        assert_eq!(filtered[0].attack_type, "spoofing");
        assert_eq!(filtered[1].attack_type, "ddos");
    }
}
