//! Shared helpers for command handlers.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;

use lxgate_core::{LogFilter, Severity, SeverityFilter};

use crate::cli::FilterArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Parse a severity name (low, medium, high), case-insensitive.
pub fn parse_severity(value: &str) -> Result<Severity, CliError> {
    Severity::from_str(value).map_err(|_| CliError::Validation {
        field: "severity".into(),
        reason: format!("expected low, medium, or high, got '{value}'"),
    })
}

/// Build a `LogFilter` from the shared filter flags.
pub fn build_filter(args: &FilterArgs) -> Result<LogFilter, CliError> {
    let mut filter = LogFilter::default();

    if let Some(ref value) = args.severity {
        filter = filter.severity(SeverityFilter::Exact(parse_severity(value)?));
    }
    if let Some(ref value) = args.min_severity {
        filter = filter.severity(SeverityFilter::AtLeast(parse_severity(value)?));
    }
    if let Some(ref attack_type) = args.attack_type {
        filter = filter.attack_type(attack_type.clone());
    }
    if let Some(ref sensor) = args.sensor {
        filter = filter.sensor_query(sensor.clone());
    }
    if let Some(ref date_str) = args.date {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|_| {
            CliError::Validation {
                field: "date".into(),
                reason: format!("expected YYYY-MM-DD, got '{date_str}'"),
            }
        })?;
        filter = filter.date(date);
    }
    if args.blocked {
        filter = filter.only_blocked();
    }

    Ok(filter)
}
