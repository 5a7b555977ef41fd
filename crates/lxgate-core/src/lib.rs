// lxgate-core: Reactive alert pipeline between lxgate-api and consumers (CLI).

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod feed;
pub mod filter;
pub mod model;
pub mod monitor;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{AuthToken, GatewayConfig, TlsVerification};
pub use error::CoreError;
pub use feed::LogStream;
pub use filter::{LogFilter, SeverityFilter};
pub use monitor::{ConnectionState, Monitor};
pub use store::AuditLog;

// Re-export model types at the crate root for ergonomics.
pub use model::{AlertEvent, AttackKind, DedupKey, SensorFamily, Severity};

// Gateway-facing types surfaced for consumers.
pub use lxgate_api::{
    AttackTypeInfo, FeatureContribution, SensorCatalog, SensorReading, ShapExplanation,
    StreamStatus, UserAccount,
};
