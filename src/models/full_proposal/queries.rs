use rusqlite::{Connection, params};

use super::types::*;
use crate::errors::AppError;

fn row_to_full_proposal(row: &rusqlite::Row) -> rusqlite::Result<FullProposal> {
    let status_str: String = row.get("status")?;
    Ok(FullProposal {
        id: row.get("id")?,
        proposal_id: row.get("proposal_id")?,
        document_ref: row.get("document_ref")?,
        status: FullProposalStatus::parse(&status_str).unwrap_or(FullProposalStatus::Submitted),
        feedback: row.get("feedback")?,
        deadline: row.get("deadline")?,
        submitted_at: row.get("submitted_at")?,
    })
}

const FULL_PROPOSAL_COLUMNS: &str =
    "id, proposal_id, document_ref, status, feedback, deadline, submitted_at";

/// Create a full proposal, returning its id. Eligibility is the caller's
/// responsibility (`AwardBoard::can_submit_full_proposal`).
pub fn create(
    conn: &Connection,
    proposal_id: i64,
    document_ref: &str,
    deadline: &str,
    now: &str,
) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO full_proposals (proposal_id, document_ref, deadline, submitted_at) \
         VALUES (?1, ?2, ?3, ?4)",
        params![proposal_id, document_ref, deadline, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Find a single full proposal by id.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<FullProposal>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FULL_PROPOSAL_COLUMNS} FROM full_proposals WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id], row_to_full_proposal)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// The live (not rejected) full proposal for a parent proposal, if any.
/// A rejected record does not block resubmission, so it never counts as
/// live.
pub fn find_live_for_proposal(
    conn: &Connection,
    proposal_id: i64,
) -> Result<Option<FullProposal>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FULL_PROPOSAL_COLUMNS} FROM full_proposals \
         WHERE proposal_id = ?1 AND status != 'rejected' \
         ORDER BY id DESC LIMIT 1"
    ))?;
    let mut rows = stmt.query_map(params![proposal_id], row_to_full_proposal)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Atomic submitted -> terminal transition. Returns false when the record
/// was already decided.
pub fn decide(
    conn: &Connection,
    full_proposal_id: i64,
    outcome: FullProposalStatus,
    feedback: Option<&str>,
) -> Result<bool, AppError> {
    let rows = conn.execute(
        "UPDATE full_proposals SET status = ?2, feedback = ?3 \
         WHERE id = ?1 AND status = 'submitted'",
        params![full_proposal_id, outcome.as_str(), feedback],
    )?;
    Ok(rows == 1)
}
