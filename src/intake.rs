//! Submission entry points: proposal drafts, proposal submission, and the
//! post-award full proposal. Admission rate limiting is a pre-condition
//! supplied by the request layer (see `rate_limit`).

use std::sync::Arc;

use crate::award::AwardBoard;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::proposal::NewProposal;
use crate::models::{full_proposal, org, proposal};
use crate::notify::{Notification, NotificationKind, Notifier};

pub struct Intake {
    pool: DbPool,
    cfg: EngineConfig,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl Intake {
    pub fn new(
        pool: DbPool,
        cfg: EngineConfig,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool,
            cfg,
            notifier,
            clock,
        }
    }

    /// Create a draft proposal owned by its submitter.
    pub fn create_draft(&self, draft: &NewProposal) -> Result<i64, AppError> {
        if draft.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".into()));
        }
        if draft.requested_budget <= 0.0 {
            return Err(AppError::Validation(format!(
                "requested budget must be positive, got {}",
                draft.requested_budget
            )));
        }

        let conn = self.pool.get()?;
        org::find_user_by_id(&conn, draft.submitter_id)?.ok_or(AppError::NotFound("user"))?;
        proposal::create(&conn, draft)
    }

    /// Submit a draft for review. Compare-and-set, so a double submission
    /// fails with `InvalidState` instead of silently restarting the
    /// lifecycle.
    pub fn submit(&self, proposal_id: i64) -> Result<(), AppError> {
        let conn = self.pool.get()?;
        let prop =
            proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound("proposal"))?;
        let now = self.clock.timestamp();

        if !proposal::mark_submitted(&conn, proposal_id, &now)? {
            return Err(AppError::InvalidState(format!(
                "proposal {proposal_id} is {}, only drafts can be submitted",
                prop.status.as_str()
            )));
        }

        if let Some(submitter) = org::find_user_by_id(&conn, prop.submitter_id)? {
            self.notifier.notify(Notification {
                kind: NotificationKind::SubmissionConfirmation,
                recipients: vec![submitter.email],
                payload: serde_json::json!({ "proposal_title": prop.title }),
            });
        }
        Ok(())
    }

    /// Submit the detailed full proposal after award approval. Gated by
    /// the award board; the blocked reason is surfaced in the error.
    pub fn submit_full_proposal(
        &self,
        board: &AwardBoard,
        proposal_id: i64,
        document_ref: &str,
    ) -> Result<i64, AppError> {
        if document_ref.trim().is_empty() {
            return Err(AppError::Validation("document reference must not be empty".into()));
        }

        let eligibility = board.can_submit_full_proposal(proposal_id)?;
        if let Some(reason) = eligibility.reason() {
            return Err(AppError::InvalidState(format!(
                "full proposal for proposal {proposal_id} cannot be submitted: {reason}"
            )));
        }

        let conn = self.pool.get()?;
        let prop =
            proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound("proposal"))?;
        let now = self.clock.timestamp();
        let deadline = (self.clock.now()
            + chrono::Duration::days(self.cfg.full_proposal_deadline_days))
        .format("%Y-%m-%d")
        .to_string();

        let id = full_proposal::create(&conn, proposal_id, document_ref, &deadline, &now)?;

        if let Some(submitter) = org::find_user_by_id(&conn, prop.submitter_id)? {
            self.notifier.notify(Notification {
                kind: NotificationKind::SubmissionConfirmation,
                recipients: vec![submitter.email],
                payload: serde_json::json!({
                    "proposal_title": prop.title,
                    "deadline": deadline,
                }),
            });
        }
        Ok(id)
    }
}
