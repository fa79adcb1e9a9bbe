//! Audit trail for screening decisions.
//!
//! Every evaluated document gets one immutable [`AuditRecord`]. A run's
//! records are aggregated into an [`AuditReport`] that can be exported as
//! JSON or CSV for compliance review.
//!
//! ```text
//! out/
//! ├── agent_output.txt            # Final pipeline payload
//! └── agent_output.audit.json     # Audit report for the same run
//! ```

mod persistence;
mod record;
mod report;

pub use persistence::audit_path;
pub use record::AuditRecord;
pub use report::{AuditRecorder, AuditReport};
