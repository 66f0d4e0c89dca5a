//! Funding decision state machine and full-proposal gating.

use std::sync::Arc;

use crate::clock::Clock;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::award::{Award, AwardStatus};
use crate::models::full_proposal::FullProposalStatus;
use crate::models::{award, full_proposal, org, proposal};
use crate::notify::{Notification, NotificationKind, Notifier};

/// Why a full proposal may or may not be submitted right now. The blocked
/// variants carry the specific reason for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullProposalEligibility {
    Eligible,
    NoAward,
    AwardNotApproved,
    AlreadySubmitted,
}

impl FullProposalEligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, FullProposalEligibility::Eligible)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            FullProposalEligibility::Eligible => None,
            FullProposalEligibility::NoAward => Some("no award exists for this proposal"),
            FullProposalEligibility::AwardNotApproved => Some("the award is not approved"),
            FullProposalEligibility::AlreadySubmitted => {
                Some("a full proposal has already been submitted")
            }
        }
    }
}

pub struct AwardBoard {
    pool: DbPool,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl AwardBoard {
    pub fn new(pool: DbPool, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            notifier,
            clock,
        }
    }

    /// Record the funding decision for a proposal. The pending -> terminal
    /// transition is a single compare-and-set keyed on proposal id, so two
    /// concurrent administrators cannot both decide; the loser gets
    /// `InvalidState`. An approval must carry its funding amount.
    pub fn decide(
        &self,
        proposal_id: i64,
        outcome: AwardStatus,
        funding_amount: Option<f64>,
        feedback: Option<String>,
        decided_by: i64,
    ) -> Result<Award, AppError> {
        if !outcome.is_terminal() {
            return Err(AppError::Validation(
                "decision outcome must be approved or declined".into(),
            ));
        }
        if outcome == AwardStatus::Approved {
            match funding_amount {
                Some(amount) if amount > 0.0 => {}
                Some(amount) => {
                    return Err(AppError::Validation(format!(
                        "funding amount must be positive, got {amount}"
                    )));
                }
                None => {
                    return Err(AppError::Validation(
                        "an approval must carry a funding amount".into(),
                    ));
                }
            }
        }

        let conn = self.pool.get()?;
        let prop =
            proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound("proposal"))?;
        let now = self.clock.timestamp();

        let decided = award::decide(
            &conn,
            proposal_id,
            outcome,
            funding_amount,
            feedback.as_deref(),
            decided_by,
            &now,
        )?;
        if !decided {
            return match award::find_by_proposal(&conn, proposal_id)? {
                None => Err(AppError::NotFound("award")),
                Some(existing) => Err(AppError::InvalidState(format!(
                    "award for proposal {proposal_id} is already {}",
                    existing.status.as_str()
                ))),
            };
        }

        proposal::mark_decided(&conn, proposal_id, &now)?;

        if let Some(submitter) = org::find_user_by_id(&conn, prop.submitter_id)? {
            self.notifier.notify(Notification {
                kind: NotificationKind::DecisionOutcome,
                recipients: vec![submitter.email],
                payload: serde_json::json!({
                    "proposal_title": prop.title,
                    "outcome": outcome.as_str(),
                    "funding_amount": funding_amount,
                }),
            });
        }

        award::find_by_proposal(&conn, proposal_id)?.ok_or(AppError::NotFound("award"))
    }

    /// Flip the archive overlay on a proposal. Returns the new flag.
    /// Archived proposals drop out of the decision views but stay
    /// reachable by direct id lookup.
    pub fn toggle_archive(&self, proposal_id: i64) -> Result<bool, AppError> {
        let conn = self.pool.get()?;
        let now = self.clock.timestamp();
        proposal::toggle_archive(&conn, proposal_id, &now)
    }

    /// Whether a full proposal may be submitted for this proposal, and if
    /// not, why. A rejected full proposal does not block resubmission.
    pub fn can_submit_full_proposal(
        &self,
        proposal_id: i64,
    ) -> Result<FullProposalEligibility, AppError> {
        let conn = self.pool.get()?;
        proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound("proposal"))?;

        let Some(existing_award) = award::find_by_proposal(&conn, proposal_id)? else {
            return Ok(FullProposalEligibility::NoAward);
        };
        if existing_award.status != AwardStatus::Approved {
            return Ok(FullProposalEligibility::AwardNotApproved);
        }
        if full_proposal::find_live_for_proposal(&conn, proposal_id)?.is_some() {
            return Ok(FullProposalEligibility::AlreadySubmitted);
        }
        Ok(FullProposalEligibility::Eligible)
    }

    /// Record the decision on a submitted full proposal. Terminal once;
    /// a rejected full proposal may be superseded by a resubmission.
    pub fn decide_full_proposal(
        &self,
        full_proposal_id: i64,
        outcome: FullProposalStatus,
        feedback: Option<String>,
    ) -> Result<(), AppError> {
        if outcome == FullProposalStatus::Submitted {
            return Err(AppError::Validation(
                "full proposal outcome must be approved or rejected".into(),
            ));
        }

        let conn = self.pool.get()?;
        let existing = full_proposal::find_by_id(&conn, full_proposal_id)?
            .ok_or(AppError::NotFound("full proposal"))?;

        if !full_proposal::decide(&conn, full_proposal_id, outcome, feedback.as_deref())? {
            return Err(AppError::InvalidState(format!(
                "full proposal {full_proposal_id} is already {}",
                existing.status.as_str()
            )));
        }
        Ok(())
    }
}
