use rusqlite::{Connection, params};

use super::types::*;
use crate::errors::AppError;

fn row_to_award(row: &rusqlite::Row) -> rusqlite::Result<Award> {
    let status_str: String = row.get("status")?;
    Ok(Award {
        id: row.get("id")?,
        proposal_id: row.get("proposal_id")?,
        status: AwardStatus::parse(&status_str).unwrap_or(AwardStatus::Pending),
        final_score: row.get("final_score")?,
        funding_amount: row.get("funding_amount")?,
        feedback: row.get("feedback")?,
        approved_by: row.get("approved_by")?,
        approved_at: row.get("approved_at")?,
        created_at: row.get("created_at")?,
    })
}

const AWARD_COLUMNS: &str = "id, proposal_id, status, final_score, funding_amount, \
     feedback, approved_by, approved_at, created_at";

/// Create the pending award for a proposal entering the reviewed state.
/// Idempotent through the unique proposal_id constraint, so concurrent
/// completion evaluations cannot double-create.
pub fn ensure_for_proposal(
    conn: &Connection,
    proposal_id: i64,
    final_score: f64,
    now: &str,
) -> Result<(), AppError> {
    conn.execute(
        "INSERT INTO awards (proposal_id, final_score, created_at) VALUES (?1, ?2, ?3) \
         ON CONFLICT(proposal_id) DO NOTHING",
        params![proposal_id, final_score, now],
    )?;
    Ok(())
}

/// Find the award attached to a proposal.
pub fn find_by_proposal(conn: &Connection, proposal_id: i64) -> Result<Option<Award>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {AWARD_COLUMNS} FROM awards WHERE proposal_id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![proposal_id], row_to_award)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Atomic pending -> terminal transition, keyed on proposal id. Returns
/// false when the award was not pending; the decision stands and is never
/// overwritten.
pub fn decide(
    conn: &Connection,
    proposal_id: i64,
    outcome: AwardStatus,
    funding_amount: Option<f64>,
    feedback: Option<&str>,
    decided_by: i64,
    now: &str,
) -> Result<bool, AppError> {
    let rows = conn.execute(
        "UPDATE awards SET status = ?2, funding_amount = ?3, feedback = ?4, \
                approved_by = ?5, approved_at = ?6 \
         WHERE proposal_id = ?1 AND status = 'pending'",
        params![
            proposal_id,
            outcome.as_str(),
            funding_amount,
            feedback,
            decided_by,
            now
        ],
    )?;
    Ok(rows == 1)
}
