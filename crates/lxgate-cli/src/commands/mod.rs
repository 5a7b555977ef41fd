//! Command dispatch: bridges CLI args -> monitor operations -> output.

pub mod config_cmd;
pub mod explain;
pub mod logs;
pub mod sensors;
pub mod simulate;
pub mod status;
pub mod users;
pub mod util;

use lxgate_core::Monitor;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, monitor: &Monitor, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Logs(args) => logs::handle(monitor, args, global).await,
        Command::Simulate(args) => simulate::handle(monitor, args, global).await,
        Command::Sensors(args) => sensors::handle(monitor, args, global).await,
        Command::Explain(args) => explain::handle(monitor, args, global).await,
        Command::Users(args) => users::handle(monitor, args, global).await,
        Command::Status => status::handle(monitor, global).await,
        // Handled before dispatch; reaching here is a wiring bug in run().
        Command::Config(_) | Command::Completions(_) => Err(CliError::ApiError {
            code: "internal".into(),
            message: "command does not require a gateway connection".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use lxgate_core::{GatewayConfig, Monitor};

    use super::dispatch;
    use crate::cli::Cli;
    use crate::error::CliError;

    #[tokio::test]
    async fn local_commands_reject_dispatch_without_panicking() {
        let cli = Cli::parse_from(["lxgate", "completions", "bash"]);
        let monitor = Monitor::new(GatewayConfig::default());
        let result = dispatch(cli.command, &monitor, &cli.global).await;
        assert!(matches!(result, Err(CliError::ApiError { .. })));
    }
}
