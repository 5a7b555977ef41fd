// ── Canonical domain model ──

pub mod alert;
pub mod sensor;

pub use alert::{AlertEvent, DedupKey, Severity};
pub use sensor::{AttackKind, SensorFamily};
