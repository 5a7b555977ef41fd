//! Audit log command handlers: list, export, watch, reset.

use std::sync::Arc;

use owo_colors::OwoColorize;
use tabled::Tabled;

use lxgate_core::{AlertEvent, Monitor, Severity, export};

use crate::cli::{ExportFormat, FilterArgs, GlobalOpts, LogsArgs, LogsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Sensor ID")]
    sensor_id: String,
    #[tabled(rename = "Type")]
    attack_type: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&AlertEvent> for AlertRow {
    fn from(event: &AlertEvent) -> Self {
        Self {
            time: event
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            sensor_id: event.sensor_id.clone().unwrap_or_else(|| "-".into()),
            attack_type: event.attack_type.clone(),
            severity: event.severity.to_string(),
            status: event.status_label().into(),
            message: event.message.clone(),
        }
    }
}

/// Pre-formatted single-alert detail view for table output.
pub fn detail(event: &AlertEvent) -> String {
    let row = AlertRow::from(event);
    format!(
        "Time:      {}\n\
         Sensor ID: {}\n\
         Type:      {}\n\
         Severity:  {}\n\
         Status:    {}\n\
         Message:   {}",
        row.time, row.sensor_id, row.attack_type, row.severity, row.status, row.message
    )
}

fn alert_id(event: &AlertEvent) -> String {
    format!(
        "{} {} {}",
        event.timestamp.to_rfc3339(),
        event.sensor_id.as_deref().unwrap_or("-"),
        event.attack_type
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(monitor: &Monitor, args: LogsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        LogsCommand::List { filter, limit } => {
            let filter = util::build_filter(&filter)?;
            let config = monitor.config().clone();

            let snapshot =
                Monitor::oneshot(config, |m| async move { Ok(m.snapshot()) }).await?;

            let mut entries = filter.apply(&snapshot);
            entries.truncate(limit);

            let out = output::render_list(
                &global.output,
                &entries,
                |e| AlertRow::from(e.as_ref()),
                |e| alert_id(e),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LogsCommand::Export {
            filter,
            format,
            output: out_path,
        } => {
            let filter = util::build_filter(&filter)?;
            let config = monitor.config().clone();

            let snapshot =
                Monitor::oneshot(config, |m| async move { Ok(m.snapshot()) }).await?;
            let entries = filter.apply(&snapshot);

            let rendered = match format {
                ExportFormat::Csv => export::to_csv(&entries, &export::default_columns()),
                ExportFormat::Json => {
                    export::to_json(&entries).map_err(|e| CliError::Validation {
                        field: "export".into(),
                        reason: e.to_string(),
                    })?
                }
            };

            match out_path {
                Some(path) => {
                    std::fs::write(&path, &rendered)?;
                    if !global.quiet {
                        eprintln!("Exported {} entries to {}", entries.len(), path.display());
                    }
                }
                None => output::print_output(rendered.trim_end(), global.quiet),
            }
            Ok(())
        }

        LogsCommand::Watch { filter } => watch(monitor, &filter, global).await,

        LogsCommand::Reset { remote } => {
            let prompt = if remote {
                "Clear the audit log on this machine AND the gateway?"
            } else {
                "Clear the local audit log?"
            };
            if !util::confirm(prompt, global.yes)? {
                return Ok(());
            }

            let config = monitor.config().clone();
            Monitor::oneshot(config, move |m| async move {
                m.reset_logs(remote).await
            })
            .await?;

            if !global.quiet {
                eprintln!("Audit log cleared");
            }
            Ok(())
        }
    }
}

// ── Live stream ─────────────────────────────────────────────────────

/// Stream alerts to stdout until Ctrl-C.
async fn watch(monitor: &Monitor, filter: &FilterArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let filter = util::build_filter(filter)?;
    let color = output::should_color(&global.color);

    monitor.connect().await?;
    let mut alerts = monitor.alerts();

    if !global.quiet {
        eprintln!("Watching live alerts (Ctrl-C to stop)...");
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = alerts.recv() => match received {
                Ok(event) => {
                    if filter.matches(&event) {
                        print_alert_line(&event, color);
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "alert stream lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    monitor.disconnect().await;
    Ok(())
}

fn print_alert_line(event: &Arc<AlertEvent>, color: bool) {
    let row = AlertRow::from(event.as_ref());

    if color {
        let severity = match event.severity {
            Severity::High => row.severity.red().bold().to_string(),
            Severity::Medium => row.severity.yellow().to_string(),
            Severity::Low => row.severity.green().to_string(),
        };
        println!(
            "{}  {:<12}  {:<20}  {:<8}  {:<7}  {}",
            row.time, row.sensor_id, row.attack_type, severity, row.status, row.message
        );
    } else {
        println!(
            "{}  {:<12}  {:<20}  {:<8}  {:<7}  {}",
            row.time, row.sensor_id, row.attack_type, row.severity, row.status, row.message
        );
    }
}
