//! Reviewer assignment and review completion tracking.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::{award, org, proposal, review};
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::review::scoring;

pub struct AssignmentManager {
    pool: DbPool,
    cfg: EngineConfig,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl AssignmentManager {
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

    /// Assign a reviewer to a proposal for one review kind.
    ///
    /// Automated and human assignments insert a pending review; the unique
    /// (proposal, reviewer, kind) index turns a duplicate into `Conflict`.
    /// A reconciliation assignment instead claims the review that score
    /// divergence auto-created, and fails with `Conflict` while no
    /// divergence exists or when another administrator claimed it first.
    pub fn assign(
        &self,
        proposal_id: i64,
        reviewer_id: i64,
        kind: review::ReviewKind,
    ) -> Result<review::Review, AppError> {
        let conn = self.pool.get()?;
        let prop =
            proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound("proposal"))?;
        let reviewer =
            org::find_user_by_id(&conn, reviewer_id)?.ok_or(AppError::NotFound("user"))?;
        let now = self.clock.timestamp();

        let review_id = match kind {
            review::ReviewKind::Reconciliation => {
                match review::claim_reconciliation(&conn, proposal_id, reviewer_id, &now)? {
                    Some(id) => {
                        self.notifier.notify(Notification {
                            kind: NotificationKind::ReconciliationAssignment,
                            recipients: vec![reviewer.email.clone()],
                            payload: serde_json::json!({
                                "proposal_title": prop.title,
                                "reviewer": reviewer.display_name,
                            }),
                        });
                        id
                    }
                    None => {
                        let scores = review::completed_scores(&conn, proposal_id)?;
                        let msg = if scores.reconciliation_exists {
                            format!(
                                "reconciliation review for proposal {proposal_id} is already assigned"
                            )
                        } else {
                            format!(
                                "proposal {proposal_id} has no score divergence; reconciliation is not required"
                            )
                        };
                        return Err(AppError::Conflict(msg));
                    }
                }
            }
            review::ReviewKind::Automated | review::ReviewKind::Human => {
                let id = review::insert_assignment(&conn, proposal_id, reviewer_id, kind, &now)?;
                // Only the call that moved the proposal out of pending
                // dispatches the assignment notification.
                if proposal::begin_review(&conn, proposal_id, &now)? {
                    self.notifier.notify(Notification {
                        kind: NotificationKind::ReviewerAssignment,
                        recipients: vec![reviewer.email.clone()],
                        payload: serde_json::json!({
                            "proposal_title": prop.title,
                            "reviewer": reviewer.display_name,
                        }),
                    });
                }
                id
            }
        };

        review::find_by_id(&conn, review_id)?.ok_or(AppError::NotFound("review"))
    }

    /// Invite a prospective reviewer by email. Dispatch only; no review
    /// record is written until the invitee is assigned.
    pub fn invite_reviewer(&self, proposal_id: i64, email: &str) -> Result<(), AppError> {
        let conn = self.pool.get()?;
        let prop =
            proposal::find_by_id(&conn, proposal_id)?.ok_or(AppError::NotFound("proposal"))?;
        self.notifier.notify(Notification {
            kind: NotificationKind::ReviewerInvitation,
            recipients: vec![email.to_string()],
            payload: serde_json::json!({ "proposal_title": prop.title }),
        });
        Ok(())
    }

    /// Mark a review completed with its score, then re-evaluate the
    /// proposal's review set.
    pub fn complete(&self, review_id: i64, total_score: f64) -> Result<(), AppError> {
        if total_score < self.cfg.score_min || total_score > self.cfg.score_max {
            return Err(AppError::Validation(format!(
                "score {total_score} outside valid range {}..={}",
                self.cfg.score_min, self.cfg.score_max
            )));
        }

        let conn = self.pool.get()?;
        let rec = review::find_by_id(&conn, review_id)?.ok_or(AppError::NotFound("review"))?;
        let now = self.clock.timestamp();

        if !review::mark_completed(&conn, review_id, total_score, &now)? {
            return Err(AppError::Conflict(format!(
                "review {review_id} is already completed"
            )));
        }

        self.evaluate_proposal(rec.proposal_id)
    }

    /// Re-evaluate a proposal's review set: create the reconciliation
    /// review when the automated/human scores diverge, or move the
    /// proposal to reviewed (creating its pending award) once every
    /// required review is in. Safe to call repeatedly.
    pub fn evaluate_proposal(&self, proposal_id: i64) -> Result<(), AppError> {
        let conn = self.pool.get()?;
        let scores = review::completed_scores(&conn, proposal_id)?;
        let now = self.clock.timestamp();

        // A completed reconciliation settles the set outright.
        if scores.reconciliation.is_some() {
            return self.finalize(&conn, proposal_id, &now);
        }

        if let (Some(a), Some(h)) = (scores.automated, scores.human) {
            if scoring::diverges(&self.cfg, a, h) {
                if !scores.reconciliation_exists
                    && review::create_reconciliation_if_absent(&conn, proposal_id, &now)?
                {
                    log::info!(
                        "Proposal {proposal_id}: scores diverge ({a} vs {h}), reconciliation review created"
                    );
                }
                return Ok(());
            }
            return self.finalize(&conn, proposal_id, &now);
        }

        // Single-kind review set: complete once nothing is left pending and
        // at least one score is in.
        let reviews = review::find_for_proposal(&conn, proposal_id)?;
        let any_pending = reviews.iter().any(|r| r.status == review::ReviewState::Pending);
        let any_completed = reviews.iter().any(|r| r.status == review::ReviewState::Completed);
        if any_completed && !any_pending {
            return self.finalize(&conn, proposal_id, &now);
        }

        Ok(())
    }

    fn finalize(
        &self,
        conn: &rusqlite::Connection,
        proposal_id: i64,
        now: &str,
    ) -> Result<(), AppError> {
        if let Some(final_score) = scoring::compute_final_score(conn, &self.cfg, proposal_id)? {
            proposal::mark_reviewed(conn, proposal_id, now)?;
            award::ensure_for_proposal(conn, proposal_id, final_score, now)?;
        }
        Ok(())
    }
}
