//! Gateway status command handler.

use serde::Serialize;

use lxgate_core::Monitor;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatusReport {
    gateway: String,
    connection: String,
    alert_stream: String,
    audit_log_entries: usize,
    attack_types: usize,
}

fn detail(report: &StatusReport) -> String {
    format!(
        "Gateway:       {}\n\
         Connection:    {}\n\
         Alert stream:  {}\n\
         Audit log:     {} entries\n\
         Attack types:  {}",
        report.gateway,
        report.connection,
        report.alert_stream,
        report.audit_log_entries,
        report.attack_types
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(monitor: &Monitor, global: &GlobalOpts) -> Result<(), CliError> {
    monitor.connect().await?;

    let connection = format!("{:?}", *monitor.connection_state().borrow());
    let alert_stream = match monitor.stream_status().await {
        Some(rx) => format!("{:?}", *rx.borrow()),
        None => "disabled".into(),
    };
    let audit_log_entries = monitor.snapshot().len();

    let attack_types = match monitor.api().await {
        Ok(client) => client.attack_types().await.map(|t| t.len()).unwrap_or(0),
        Err(_) => 0,
    };

    let report = StatusReport {
        gateway: monitor.config().url.to_string(),
        connection,
        alert_stream,
        audit_log_entries,
        attack_types,
    };

    monitor.disconnect().await;

    let out = output::render_single(&global.output, &report, detail, |r| r.connection.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
