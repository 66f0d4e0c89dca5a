use rusqlite::{Connection, params};

use super::types::*;
use crate::errors::{AppError, is_unique_violation};

fn row_to_review(row: &rusqlite::Row) -> rusqlite::Result<Review> {
    let kind_str: String = row.get("kind")?;
    let status_str: String = row.get("status")?;
    Ok(Review {
        id: row.get("id")?,
        proposal_id: row.get("proposal_id")?,
        reviewer_id: row.get("reviewer_id")?,
        kind: ReviewKind::parse(&kind_str).unwrap_or(ReviewKind::Human),
        status: ReviewState::parse(&status_str).unwrap_or(ReviewState::Pending),
        total_score: row.get("total_score")?,
        assigned_at: row.get("assigned_at")?,
        completed_at: row.get("completed_at")?,
    })
}

const REVIEW_COLUMNS: &str =
    "id, proposal_id, reviewer_id, kind, status, total_score, assigned_at, completed_at";

/// Insert a pending review assignment. The unique index on
/// (proposal_id, reviewer_id, kind) closes the duplicate-assignment race at
/// the storage layer; a constraint hit surfaces as `Conflict`.
pub fn insert_assignment(
    conn: &Connection,
    proposal_id: i64,
    reviewer_id: i64,
    kind: ReviewKind,
    now: &str,
) -> Result<i64, AppError> {
    conn.execute(
        "INSERT INTO reviews (proposal_id, reviewer_id, kind, assigned_at) \
         VALUES (?1, ?2, ?3, ?4)",
        params![proposal_id, reviewer_id, kind.as_str(), now],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!(
                "reviewer {reviewer_id} already holds an active {} review for proposal {proposal_id}",
                kind.as_str()
            ))
        } else {
            AppError::Db(e)
        }
    })?;
    Ok(conn.last_insert_rowid())
}

/// Auto-create the unassigned pending reconciliation review for a proposal.
/// Rides the partial unique index, so concurrent evaluations create it
/// exactly once. Returns true for the call that inserted the row.
pub fn create_reconciliation_if_absent(
    conn: &Connection,
    proposal_id: i64,
    now: &str,
) -> Result<bool, AppError> {
    let rows = conn.execute(
        "INSERT OR IGNORE INTO reviews (proposal_id, reviewer_id, kind, assigned_at) \
         VALUES (?1, NULL, 'reconciliation', ?2)",
        params![proposal_id, now],
    )?;
    Ok(rows == 1)
}

/// Claim the unassigned reconciliation review for a reviewer. Returns the
/// review id, or None when there is nothing to claim (no divergence yet, or
/// another administrator claimed it first).
pub fn claim_reconciliation(
    conn: &Connection,
    proposal_id: i64,
    reviewer_id: i64,
    now: &str,
) -> Result<Option<i64>, AppError> {
    let rows = conn.execute(
        "UPDATE reviews SET reviewer_id = ?2, assigned_at = ?3 \
         WHERE proposal_id = ?1 AND kind = 'reconciliation' AND reviewer_id IS NULL",
        params![proposal_id, reviewer_id, now],
    )?;
    if rows == 0 {
        return Ok(None);
    }
    let mut stmt = conn.prepare(
        "SELECT id FROM reviews WHERE proposal_id = ?1 AND kind = 'reconciliation'",
    )?;
    let mut ids = stmt.query_map(params![proposal_id], |row| row.get::<_, i64>(0))?;
    match ids.next() {
        Some(id) => Ok(Some(id?)),
        None => Ok(None),
    }
}

/// Find a single review by id.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Review>, AppError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id], row_to_review)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// All reviews for a proposal, assignment order.
pub fn find_for_proposal(conn: &Connection, proposal_id: i64) -> Result<Vec<Review>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REVIEW_COLUMNS} FROM reviews WHERE proposal_id = ?1 ORDER BY id"
    ))?;
    let rows = stmt
        .query_map(params![proposal_id], row_to_review)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Compare-and-set pending -> completed. Completed reviews are immutable:
/// zero rows means the review was already completed and the caller gets
/// its idempotency `Conflict`. The partial unique index on completed
/// (proposal, kind) pairs closes the race where two pending reviews of the
/// same kind complete concurrently.
pub fn mark_completed(
    conn: &Connection,
    review_id: i64,
    total_score: f64,
    now: &str,
) -> Result<bool, AppError> {
    let rows = conn
        .execute(
            "UPDATE reviews SET status = 'completed', total_score = ?2, completed_at = ?3 \
             WHERE id = ?1 AND status = 'pending'",
            params![review_id, total_score, now],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "another completed review of the same kind already exists for review {review_id}"
                ))
            } else {
                AppError::Db(e)
            }
        })?;
    Ok(rows == 1)
}

/// Completed scores per kind for one proposal, plus whether a
/// reconciliation row exists at all.
pub fn completed_scores(conn: &Connection, proposal_id: i64) -> Result<CompletedScores, AppError> {
    let mut stmt = conn.prepare(
        "SELECT kind, status, total_score FROM reviews WHERE proposal_id = ?1",
    )?;
    let rows = stmt.query_map(params![proposal_id], |row| {
        Ok((
            row.get::<_, String>("kind")?,
            row.get::<_, String>("status")?,
            row.get::<_, Option<f64>>("total_score")?,
        ))
    })?;

    let mut scores = CompletedScores::default();
    for row in rows {
        let (kind, status, total_score) = row?;
        let completed = status == "completed";
        match kind.as_str() {
            "automated" if completed => scores.automated = total_score,
            "human" if completed => scores.human = total_score,
            "reconciliation" => {
                scores.reconciliation_exists = true;
                if completed {
                    scores.reconciliation = total_score;
                }
            }
            _ => {}
        }
    }
    Ok(scores)
}
