use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewKind {
    Automated,
    Human,
    Reconciliation,
}

impl ReviewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewKind::Automated => "automated",
            ReviewKind::Human => "human",
            ReviewKind::Reconciliation => "reconciliation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "automated" => Some(ReviewKind::Automated),
            "human" => Some(ReviewKind::Human),
            "reconciliation" => Some(ReviewKind::Reconciliation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Pending,
    Completed,
}

impl ReviewState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewState::Pending => "pending",
            ReviewState::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReviewState::Pending),
            "completed" => Some(ReviewState::Completed),
            _ => None,
        }
    }
}

/// A review record. `reviewer_id` is None only for an auto-created
/// reconciliation review that has not been claimed yet. Completed reviews
/// are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub proposal_id: i64,
    pub reviewer_id: Option<i64>,
    pub kind: ReviewKind,
    pub status: ReviewState,
    pub total_score: Option<f64>,
    pub assigned_at: String,
    pub completed_at: Option<String>,
}

/// Completed scores for one proposal, one slot per review kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletedScores {
    pub automated: Option<f64>,
    pub human: Option<f64>,
    pub reconciliation: Option<f64>,
    /// True when a reconciliation review row exists at all, completed or not.
    pub reconciliation_exists: bool,
}
