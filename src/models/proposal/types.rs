use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    Staff,
    MasterStudent,
}

impl ProposalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalType::Staff => "staff",
            ProposalType::MasterStudent => "master_student",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "staff" => Some(ProposalType::Staff),
            "master_student" => Some(ProposalType::MasterStudent),
            _ => None,
        }
    }
}

/// Submission lifecycle. Independent of the review progress below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Draft,
    Submitted,
    UnderReview,
    Reviewed,
    Decided,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Submitted => "submitted",
            ProposalStatus::UnderReview => "under_review",
            ProposalStatus::Reviewed => "reviewed",
            ProposalStatus::Decided => "decided",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(ProposalStatus::Draft),
            "submitted" => Some(ProposalStatus::Submitted),
            "under_review" => Some(ProposalStatus::UnderReview),
            "reviewed" => Some(ProposalStatus::Reviewed),
            "decided" => Some(ProposalStatus::Decided),
            _ => None,
        }
    }
}

/// Review progress: pending until the first assignment, reviewed once the
/// required review set is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewProgress {
    Pending,
    Assigned,
    Reviewed,
}

impl ReviewProgress {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewProgress::Pending => "pending",
            ReviewProgress::Assigned => "assigned",
            ReviewProgress::Reviewed => "reviewed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReviewProgress::Pending),
            "assigned" => Some(ReviewProgress::Assigned),
            "reviewed" => Some(ReviewProgress::Reviewed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: i64,
    pub submitter_id: i64,
    pub proposal_type: ProposalType,
    pub title: String,
    pub abstract_text: String,
    pub requested_budget: f64,
    pub status: ProposalStatus,
    pub review_status: ReviewProgress,
    pub is_archived: bool,
    pub submitted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewProposal {
    pub submitter_id: i64,
    pub proposal_type: ProposalType,
    pub title: String,
    pub abstract_text: String,
    pub requested_budget: f64,
}
