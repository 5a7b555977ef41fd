// ── Command API ──
//
// All write operations against the gateway flow through a unified
// `Command` enum. The monitor routes each variant to the appropriate
// gateway endpoint and applies the result to the audit log.

use crate::error::CoreError;
use crate::model::{AlertEvent, AttackKind};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against a gateway.
#[derive(Debug, Clone)]
pub enum Command {
    /// Exercise one of the gateway's attack detectors with a crafted
    /// payload. The resulting alert lands in the audit log.
    Simulate {
        kind: AttackKind,
        payload: serde_json::Value,
    },

    /// Clear the audit log. With `clear_remote`, the gateway's persisted
    /// log is cleared first; the local store is only reset once the
    /// remote call succeeds.
    ResetLogs { clear_remote: bool },
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    Ok,
    Alert(AlertEvent),
}
