//! Attack simulation command handlers.

use std::str::FromStr;

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use lxgate_core::{AttackKind, Monitor};

use crate::cli::{GlobalOpts, SimulateArgs, SimulateCommand};
use crate::error::CliError;
use crate::output;

use super::logs;
use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Clone, Serialize, Tabled)]
struct AttackKindRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
}

impl From<AttackKind> for AttackKindRow {
    fn from(kind: AttackKind) -> Self {
        Self {
            kind: kind.to_string(),
            label: kind.label().into(),
            endpoint: kind.target().path().into(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    monitor: &Monitor,
    args: SimulateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SimulateCommand::Types => {
            let rows: Vec<AttackKindRow> = AttackKind::iter().map(AttackKindRow::from).collect();
            let out = output::render_list(
                &global.output,
                &rows,
                Clone::clone,
                |r| r.kind.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SimulateCommand::Run {
            kind,
            sensor,
            from_file,
        } => {
            let kind = AttackKind::from_str(&kind).map_err(|_| CliError::Validation {
                field: "kind".into(),
                reason: format!(
                    "unknown attack kind '{kind}'. Run: lxgate simulate types"
                ),
            })?;

            let payload = match from_file {
                Some(ref path) => util::read_json_file(path)?,
                None => kind.sample_payload(&sensor),
            };

            let config = monitor.config().clone();
            let event = Monitor::oneshot(config, move |m| async move {
                m.simulate(kind, payload).await
            })
            .await?;

            let out = output::render_single(
                &global.output,
                &event,
                |e| logs::detail(e),
                |e| e.attack_type.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
