use rusqlite::{Connection, params};

use super::types::*;
use crate::errors::AppError;

fn row_to_proposal(row: &rusqlite::Row) -> rusqlite::Result<Proposal> {
    let type_str: String = row.get("proposal_type")?;
    let status_str: String = row.get("status")?;
    let review_str: String = row.get("review_status")?;
    Ok(Proposal {
        id: row.get("id")?,
        submitter_id: row.get("submitter_id")?,
        proposal_type: ProposalType::parse(&type_str).unwrap_or(ProposalType::Staff),
        title: row.get("title")?,
        abstract_text: row.get("abstract")?,
        requested_budget: row.get("requested_budget")?,
        status: ProposalStatus::parse(&status_str).unwrap_or(ProposalStatus::Draft),
        review_status: ReviewProgress::parse(&review_str).unwrap_or(ReviewProgress::Pending),
        is_archived: row.get::<_, i64>("is_archived")? != 0,
        submitted_at: row.get("submitted_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

const PROPOSAL_COLUMNS: &str = "id, submitter_id, proposal_type, title, abstract, \
     requested_budget, status, review_status, is_archived, submitted_at, \
     created_at, updated_at";

/// Create a draft proposal, returning its id.
pub fn create(conn: &Connection, proposal: &NewProposal) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO proposals (submitter_id, proposal_type, title, abstract, requested_budget) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            proposal.submitter_id,
            proposal.proposal_type.as_str(),
            proposal.title,
            proposal.abstract_text,
            proposal.requested_budget
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Find a single proposal by id. Archived proposals stay reachable here
/// even though the decision views exclude them.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Proposal>, AppError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {PROPOSAL_COLUMNS} FROM proposals WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id], row_to_proposal)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Compare-and-set draft -> submitted. Returns false when the proposal was
/// not in draft (already submitted, or further along).
pub fn mark_submitted(conn: &Connection, id: i64, now: &str) -> Result<bool, AppError> {
    let rows = conn.execute(
        "UPDATE proposals SET status = 'submitted', submitted_at = ?2, updated_at = ?2 \
         WHERE id = ?1 AND status = 'draft'",
        params![id, now],
    )?;
    Ok(rows == 1)
}

/// First-assignment transition: review_status pending -> assigned, and the
/// lifecycle moves under review if it was sitting at submitted. Returns
/// true only for the call that performed the transition, so the caller can
/// dispatch the one assignment notification.
pub fn begin_review(conn: &Connection, id: i64, now: &str) -> Result<bool, AppError> {
    let rows = conn.execute(
        "UPDATE proposals SET review_status = 'assigned', \
                status = CASE WHEN status = 'submitted' THEN 'under_review' ELSE status END, \
                updated_at = ?2 \
         WHERE id = ?1 AND review_status = 'pending'",
        params![id, now],
    )?;
    Ok(rows == 1)
}

/// Review set complete: review_status -> reviewed, lifecycle -> reviewed.
/// Idempotent; re-evaluating an already reviewed proposal is a no-op.
pub fn mark_reviewed(conn: &Connection, id: i64, now: &str) -> Result<bool, AppError> {
    let rows = conn.execute(
        "UPDATE proposals SET review_status = 'reviewed', status = 'reviewed', updated_at = ?2 \
         WHERE id = ?1 AND review_status != 'reviewed'",
        params![id, now],
    )?;
    Ok(rows == 1)
}

/// Funding decision recorded: lifecycle -> decided.
pub fn mark_decided(conn: &Connection, id: i64, now: &str) -> Result<(), AppError> {
    conn.execute(
        "UPDATE proposals SET status = 'decided', updated_at = ?2 WHERE id = ?1",
        params![id, now],
    )?;
    Ok(())
}

/// Flip the archive overlay. The update is compare-and-set on the value
/// observed first, so two concurrent toggles cannot both win.
pub fn toggle_archive(conn: &Connection, id: i64, now: &str) -> Result<bool, AppError> {
    let current: Option<i64> = {
        let mut stmt = conn.prepare("SELECT is_archived FROM proposals WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], |row| row.get(0))?;
        match rows.next() {
            Some(row) => Some(row?),
            None => None,
        }
    };
    let current = current.ok_or(AppError::NotFound("proposal"))?;
    let target = if current == 0 { 1 } else { 0 };

    let rows = conn.execute(
        "UPDATE proposals SET is_archived = ?2, updated_at = ?3 \
         WHERE id = ?1 AND is_archived = ?4",
        params![id, target, now, current],
    )?;
    if rows == 0 {
        return Err(AppError::InvalidState(format!(
            "archive flag for proposal {id} changed concurrently"
        )));
    }
    Ok(target == 1)
}

/// Distinct submitter ids across all proposals. First stage of the
/// faculties-with-activity reduction.
pub fn distinct_submitter_ids(conn: &Connection) -> Result<Vec<i64>, AppError> {
    let mut stmt = conn.prepare("SELECT DISTINCT submitter_id FROM proposals")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
