use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullProposalStatus {
    Submitted,
    Approved,
    Rejected,
}

impl FullProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FullProposalStatus::Submitted => "submitted",
            FullProposalStatus::Approved => "approved",
            FullProposalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(FullProposalStatus::Submitted),
            "approved" => Some(FullProposalStatus::Approved),
            "rejected" => Some(FullProposalStatus::Rejected),
            _ => None,
        }
    }
}

/// The detailed follow-up submission required after an award is approved.
/// A rejected full proposal may be superseded by a resubmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullProposal {
    pub id: i64,
    pub proposal_id: i64,
    pub document_ref: String,
    pub status: FullProposalStatus,
    pub feedback: Option<String>,
    pub deadline: String,
    pub submitted_at: String,
}
