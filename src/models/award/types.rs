use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardStatus {
    Pending,
    Approved,
    Declined,
}

impl AwardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AwardStatus::Pending => "pending",
            AwardStatus::Approved => "approved",
            AwardStatus::Declined => "declined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AwardStatus::Pending),
            "approved" => Some(AwardStatus::Approved),
            "declined" => Some(AwardStatus::Declined),
            _ => None,
        }
    }

    /// Approved and declined are terminal; a terminal award is never
    /// re-decided.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AwardStatus::Pending)
    }
}

/// The funding decision record, one per proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Award {
    pub id: i64,
    pub proposal_id: i64,
    pub status: AwardStatus,
    pub final_score: Option<f64>,
    pub funding_amount: Option<f64>,
    pub feedback: Option<String>,
    pub approved_by: Option<i64>,
    pub approved_at: Option<String>,
    pub created_at: String,
}
