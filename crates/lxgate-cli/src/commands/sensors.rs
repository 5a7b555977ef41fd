//! Sensor telemetry command handlers.

use std::str::FromStr;

use serde::Serialize;
use tabled::Tabled;

use lxgate_core::{Monitor, SensorFamily, SensorReading};

use crate::cli::{GlobalOpts, SensorsArgs, SensorsCommand};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Sensor ID")]
    sensor_id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Values")]
    values: String,
}

impl From<&SensorReading> for ReadingRow {
    fn from(reading: &SensorReading) -> Self {
        let values = reading
            .values
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            sensor_id: reading.sensor_id.clone().unwrap_or_else(|| "-".into()),
            time: reading
                .timestamp
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".into()),
            values,
        }
    }
}

#[derive(Clone, Serialize, Tabled)]
struct AverageRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Average")]
    average: f64,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    monitor: &Monitor,
    args: SensorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let config = monitor.config().clone();

    match args.command {
        SensorsCommand::List => {
            let catalog = Monitor::oneshot(config, |m| async move {
                let client = m.api().await?;
                Ok(client.sensor_catalog().await?)
            })
            .await?;

            let out = output::render_single(
                &global.output,
                &catalog,
                |c| {
                    format!(
                        "Sensor types: {}\nSensor IDs:   {}",
                        c.sensor_types.join(", "),
                        c.sensor_ids.join(", ")
                    )
                },
                |c| c.sensor_ids.join("\n"),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SensorsCommand::Readings { family } => {
            let family = SensorFamily::from_str(&family).map_err(|_| CliError::Validation {
                field: "family".into(),
                reason: format!(
                    "expected soil, atmosphere, water, plant, or threat, got '{family}'"
                ),
            })?;

            let readings = Monitor::oneshot(config, move |m| async move {
                let client = m.api().await?;
                Ok(client.readings(&family.to_string()).await?)
            })
            .await?;

            let out = output::render_list(
                &global.output,
                &readings,
                |r| ReadingRow::from(r),
                |r| r.sensor_id.clone().unwrap_or_else(|| "-".into()),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SensorsCommand::Averages => {
            let averages = Monitor::oneshot(config, |m| async move {
                let client = m.api().await?;
                Ok(client.averages().await?)
            })
            .await?;

            let rows: Vec<AverageRow> = averages
                .into_iter()
                .map(|(metric, average)| AverageRow { metric, average })
                .collect();

            let out = output::render_list(
                &global.output,
                &rows,
                Clone::clone,
                |r| format!("{} {}", r.metric, r.average),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
