pub mod worker;

use serde::{Deserialize, Serialize};

pub use worker::ChannelNotifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ReviewerAssignment,
    ReviewerInvitation,
    ReconciliationAssignment,
    SubmissionConfirmation,
    DecisionOutcome,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ReviewerAssignment => "reviewer_assignment",
            NotificationKind::ReviewerInvitation => "reviewer_invitation",
            NotificationKind::ReconciliationAssignment => "reconciliation_assignment",
            NotificationKind::SubmissionConfirmation => "submission_confirmation",
            NotificationKind::DecisionOutcome => "decision_outcome",
        }
    }
}

/// One outbound dispatch request. The payload carries whatever the delivery
/// collaborator needs to render the message (proposal title, scores, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub recipients: Vec<String>,
    pub payload: serde_json::Value,
}

/// Fire-and-forget dispatch. Implementations must never block the caller on
/// delivery and must never surface delivery failures: a lost notification
/// is logged, not propagated, and never rolls back the workflow transition
/// that requested it.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Logs every dispatch. The default collaborator when no delivery backend
/// is wired in.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        log::info!(
            "notify {} -> {}: {}",
            notification.kind.as_str(),
            notification.recipients.join(", "),
            notification.payload
        );
    }
}

/// Drops every dispatch. For tests that don't observe notifications.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}
