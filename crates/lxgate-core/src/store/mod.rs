// ── Reactive audit log storage ──
//
// Bounded, deduplicated alert storage with push-based change notification.

mod audit_log;

pub use audit_log::{AuditLog, DEFAULT_CAPACITY};
