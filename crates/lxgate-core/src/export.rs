// ── Audit log export ──
//
// Serializes log snapshots for operator hand-off. CSV quoting follows
// RFC 4180: fields containing a comma, quote or line break are quoted,
// embedded quotes are doubled.

use std::sync::Arc;

use chrono::Local;

use crate::model::AlertEvent;

/// One exported column: a header and an extractor over an entry.
pub struct Column {
    pub header: &'static str,
    extract: Box<dyn Fn(&AlertEvent) -> String + Send + Sync>,
}

impl Column {
    pub fn new(
        header: &'static str,
        extract: impl Fn(&AlertEvent) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            header,
            extract: Box::new(extract),
        }
    }
}

/// The standard audit log column set.
///
/// Missing sensor ids render as `-`; the timestamp is formatted in the
/// local timezone for the operator reading the file.
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new("Time", |e| {
            e.timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        }),
        Column::new("Sensor ID", |e| {
            e.sensor_id.clone().unwrap_or_else(|| "-".into())
        }),
        Column::new("Type", |e| e.attack_type.clone()),
        Column::new("Message", |e| e.message.clone()),
        Column::new("Severity", |e| e.severity.to_string()),
        Column::new("Status", |e| e.status_label().to_string()),
    ]
}

/// Render a snapshot as CSV, one row per entry in snapshot order, with a
/// header row. Always ends with a trailing newline, even when empty.
pub fn to_csv(entries: &[Arc<AlertEvent>], columns: &[Column]) -> String {
    let mut out = String::new();

    let header: Vec<String> = columns.iter().map(|c| quote_field(c.header)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for entry in entries {
        let row: Vec<String> = columns
            .iter()
            .map(|c| quote_field(&(c.extract)(entry)))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Render a snapshot as pretty-printed JSON.
pub fn to_json(entries: &[Arc<AlertEvent>]) -> Result<String, serde_json::Error> {
    let events: Vec<&AlertEvent> = entries.iter().map(AsRef::as_ref).collect();
    serde_json::to_string_pretty(&events)
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
