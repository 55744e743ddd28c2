//! # Audit-Updated Notification Seam
//!
//! Status changes notify external collaborators (messaging, exports).
//! Those collaborators are outside this core, so the seam is a trait:
//! production wires in whatever transport it has, and the default
//! implementation just emits a structured tracing event.

use audita_store::Audit;

/// Receives a notification after every committed audit update.
///
/// Implementations must not fail — a notification is fire-and-forget and
/// never rolls back the committed write.
pub trait AuditNotifier: Send + Sync {
    /// Called with the post-update record.
    fn audit_updated(&self, audit: &Audit);
}

/// Default notifier: a structured tracing event and nothing else.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl AuditNotifier for TracingNotifier {
    fn audit_updated(&self, audit: &Audit) {
        tracing::info!(
            audit = %audit.id,
            status = %audit.status,
            is_recovery = audit.is_recovery,
            "audit updated"
        );
    }
}
