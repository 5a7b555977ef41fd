//! SHAP explanation command handler.

use lxgate_core::{Monitor, ShapExplanation};

use crate::cli::{ExplainArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(explanation: &ShapExplanation) -> String {
    let mut lines = vec![format!("Base value: {:.4}", explanation.base_value)];
    if let Some(prediction) = explanation.prediction {
        lines.push(format!("Prediction: {prediction:.4}"));
    }
    for fc in &explanation.feature_contributions {
        lines.push(format!("  {:<24} {:+.4}", fc.feature, fc.contribution));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    monitor: &Monitor,
    args: ExplainArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let features = util::read_json_file(&args.from_file)?;

    let config = monitor.config().clone();
    let explanation = Monitor::oneshot(config, move |m| async move {
        let client = m.api().await?;
        Ok(client.explain(&features).await?)
    })
    .await?;

    let out = output::render_single(&global.output, &explanation, detail, |e| {
        format!("{:.4}", e.prediction.unwrap_or(e.base_value))
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
