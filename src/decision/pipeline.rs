//! Admin-facing decision views: paginated, filtered, sorted listings plus
//! aggregate statistics computed over the same filtered population.

use std::sync::Arc;

use rusqlite::types::Value;
use serde::Serialize;

use super::filter;
use super::query::*;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::award::AwardStatus;
use crate::models::full_proposal::FullProposalStatus;
use crate::models::org::Faculty;
use crate::models::proposal::ProposalType;
use crate::models::{org, proposal};

/// One decision-ready proposal with its joined submitter, org labels and
/// award. Absent award fields stay None, never zero.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRow {
    pub id: i64,
    pub proposal_type: ProposalType,
    pub title: String,
    pub requested_budget: f64,
    pub created_at: String,
    pub submitted_at: Option<String>,
    pub submitter_id: i64,
    pub submitter_name: String,
    pub submitter_email: String,
    pub faculty_name: Option<String>,
    pub department_name: Option<String>,
    pub award_status: Option<AwardStatus>,
    pub final_score: Option<f64>,
    pub funding_amount: Option<f64>,
}

/// Aggregates over the filtered population, before pagination.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionStats {
    pub total_proposals: i64,
    pub pending_awards: i64,
    pub approved_awards: i64,
    pub declined_awards: i64,
    pub average_final_score: Option<f64>,
    /// Cutoff the two "above threshold" figures were computed against.
    pub threshold: f64,
    pub above_threshold_count: i64,
    pub above_threshold_budget: f64,
    pub approved_funding_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecisionList {
    pub proposals: Paginated<DecisionRow>,
    pub stats: DecisionStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullProposalRow {
    pub id: i64,
    pub proposal_id: i64,
    pub title: String,
    pub document_ref: String,
    pub status: FullProposalStatus,
    pub deadline: String,
    pub submitted_at: String,
    pub submitter_name: String,
    pub submitter_email: String,
    pub faculty_name: Option<String>,
    pub department_name: Option<String>,
    pub final_score: Option<f64>,
    pub funding_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullProposalStats {
    pub total: i64,
    pub submitted_this_month: i64,
    /// Deadline within seven days of now and still awaiting a decision.
    pub nearing_deadline: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FullProposalList {
    pub full_proposals: Paginated<FullProposalRow>,
    pub stats: FullProposalStats,
}

const PROPOSAL_JOINS: &str = "FROM proposals p \
     JOIN users u ON u.id = p.submitter_id \
     LEFT JOIN faculties f ON f.id = u.faculty_id \
     LEFT JOIN departments d ON d.id = u.department_id \
     LEFT JOIN awards a ON a.proposal_id = p.id";

const FULL_PROPOSAL_JOINS: &str = "FROM full_proposals fp \
     JOIN proposals p ON p.id = fp.proposal_id \
     JOIN awards a ON a.proposal_id = p.id \
     JOIN users u ON u.id = p.submitter_id \
     LEFT JOIN faculties f ON f.id = u.faculty_id \
     LEFT JOIN departments d ON d.id = u.department_id";

pub struct DecisionPipeline {
    pool: DbPool,
    cfg: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl DecisionPipeline {
    pub fn new(pool: DbPool, cfg: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self { pool, cfg, clock }
    }

    /// The decision-ready proposal list: reviewed, not archived, optionally
    /// narrowed to one faculty or one award status. The page and the
    /// statistics are computed from the same WHERE fragment on the same
    /// connection, so they always describe the same population.
    pub fn list_for_decision(&self, query: &ProposalListQuery) -> Result<DecisionList, AppError> {
        let window = resolve_page(query.page, query.limit, &self.cfg)?;
        let sort = query.sort.unwrap_or(ProposalSortKey::FinalScore);
        let order = query.order.unwrap_or(SortOrder::Desc);
        let threshold = query.threshold.unwrap_or(self.cfg.decision_threshold);
        let fragment = filter::proposal_filter(query);

        let conn = self.pool.get()?;

        let list_sql = format!(
            "SELECT p.id, p.proposal_type, p.title, p.requested_budget, \
                    p.created_at, p.submitted_at, p.submitter_id, \
                    u.display_name AS submitter_name, u.email AS submitter_email, \
                    f.name AS faculty_name, d.name AS department_name, \
                    a.status AS award_status, a.final_score, a.funding_amount \
             {PROPOSAL_JOINS} \
             WHERE {} \
             ORDER BY {} {}, p.id ASC \
             LIMIT ? OFFSET ?",
            fragment.sql,
            sort.sql_col(),
            order.as_sql(),
        );
        let mut list_params = fragment.params.clone();
        list_params.push(Value::Integer(window.limit));
        list_params.push(Value::Integer(window.offset));

        let mut stmt = conn.prepare(&list_sql)?;
        let items = stmt
            .query_map(rusqlite::params_from_iter(list_params), |row| {
                let type_str: String = row.get("proposal_type")?;
                let award_status: Option<String> = row.get("award_status")?;
                Ok(DecisionRow {
                    id: row.get("id")?,
                    proposal_type: ProposalType::parse(&type_str).unwrap_or(ProposalType::Staff),
                    title: row.get("title")?,
                    requested_budget: row.get("requested_budget")?,
                    created_at: row.get("created_at")?,
                    submitted_at: row.get("submitted_at")?,
                    submitter_id: row.get("submitter_id")?,
                    submitter_name: row.get("submitter_name")?,
                    submitter_email: row.get("submitter_email")?,
                    faculty_name: row.get("faculty_name")?,
                    department_name: row.get("department_name")?,
                    award_status: award_status.as_deref().and_then(AwardStatus::parse),
                    final_score: row.get("final_score")?,
                    funding_amount: row.get("funding_amount")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        // Threshold placeholders appear in the SELECT list, so they bind
        // before the WHERE params.
        let stats_sql = format!(
            "SELECT COUNT(*) AS total, \
                    COALESCE(SUM(CASE WHEN a.status = 'pending' THEN 1 ELSE 0 END), 0) AS pending_awards, \
                    COALESCE(SUM(CASE WHEN a.status = 'approved' THEN 1 ELSE 0 END), 0) AS approved_awards, \
                    COALESCE(SUM(CASE WHEN a.status = 'declined' THEN 1 ELSE 0 END), 0) AS declined_awards, \
                    AVG(a.final_score) AS average_final_score, \
                    COALESCE(SUM(CASE WHEN a.final_score >= ? THEN 1 ELSE 0 END), 0) AS above_threshold_count, \
                    COALESCE(SUM(CASE WHEN a.final_score >= ? THEN p.requested_budget ELSE 0 END), 0) AS above_threshold_budget, \
                    COALESCE(SUM(CASE WHEN a.status = 'approved' THEN a.funding_amount ELSE 0 END), 0) AS approved_funding_total \
             {PROPOSAL_JOINS} \
             WHERE {}",
            fragment.sql,
        );
        let mut stats_params = vec![Value::Real(threshold), Value::Real(threshold)];
        stats_params.extend(fragment.params);

        let mut stmt = conn.prepare(&stats_sql)?;
        let stats = stmt.query_row(rusqlite::params_from_iter(stats_params), |row| {
            Ok(DecisionStats {
                total_proposals: row.get("total")?,
                pending_awards: row.get("pending_awards")?,
                approved_awards: row.get("approved_awards")?,
                declined_awards: row.get("declined_awards")?,
                average_final_score: row.get("average_final_score")?,
                threshold,
                above_threshold_count: row.get("above_threshold_count")?,
                above_threshold_budget: row.get("above_threshold_budget")?,
                approved_funding_total: row.get("approved_funding_total")?,
            })
        })?;

        Ok(DecisionList {
            proposals: Paginated {
                items,
                page: window.page,
                limit: window.limit,
                total: stats.total_proposals,
                total_pages: total_pages(stats.total_proposals, window.limit),
            },
            stats,
        })
    }

    /// Full proposals whose parent award is approved, same contract as the
    /// proposal list. Deadline and calendar-month statistics read the
    /// injected clock at call time.
    pub fn list_full_proposals_for_decision(
        &self,
        query: &FullProposalListQuery,
    ) -> Result<FullProposalList, AppError> {
        let window = resolve_page(query.page, query.limit, &self.cfg)?;
        let sort = query.sort.unwrap_or(FullProposalSortKey::Deadline);
        let order = query.order.unwrap_or(SortOrder::Desc);
        let fragment = filter::full_proposal_filter(query);

        let now = self.clock.now();
        let month = now.format("%Y-%m").to_string();
        let today = now.format("%Y-%m-%d").to_string();
        let week_out = (now + chrono::Duration::days(7)).format("%Y-%m-%d").to_string();

        let conn = self.pool.get()?;

        let list_sql = format!(
            "SELECT fp.id, fp.proposal_id, fp.document_ref, fp.status, fp.deadline, \
                    fp.submitted_at, p.title, \
                    u.display_name AS submitter_name, u.email AS submitter_email, \
                    f.name AS faculty_name, d.name AS department_name, \
                    a.final_score, a.funding_amount \
             {FULL_PROPOSAL_JOINS} \
             WHERE {} \
             ORDER BY {} {}, fp.id ASC \
             LIMIT ? OFFSET ?",
            fragment.sql,
            sort.sql_col(),
            order.as_sql(),
        );
        let mut list_params = fragment.params.clone();
        list_params.push(Value::Integer(window.limit));
        list_params.push(Value::Integer(window.offset));

        let mut stmt = conn.prepare(&list_sql)?;
        let items = stmt
            .query_map(rusqlite::params_from_iter(list_params), |row| {
                let status_str: String = row.get("status")?;
                Ok(FullProposalRow {
                    id: row.get("id")?,
                    proposal_id: row.get("proposal_id")?,
                    title: row.get("title")?,
                    document_ref: row.get("document_ref")?,
                    status: FullProposalStatus::parse(&status_str)
                        .unwrap_or(FullProposalStatus::Submitted),
                    deadline: row.get("deadline")?,
                    submitted_at: row.get("submitted_at")?,
                    submitter_name: row.get("submitter_name")?,
                    submitter_email: row.get("submitter_email")?,
                    faculty_name: row.get("faculty_name")?,
                    department_name: row.get("department_name")?,
                    final_score: row.get("final_score")?,
                    funding_amount: row.get("funding_amount")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let stats_sql = format!(
            "SELECT COUNT(*) AS total, \
                    COALESCE(SUM(CASE WHEN substr(fp.submitted_at, 1, 7) = ? THEN 1 ELSE 0 END), 0) AS submitted_this_month, \
                    COALESCE(SUM(CASE WHEN fp.status = 'submitted' \
                                       AND fp.deadline >= ? AND fp.deadline <= ? \
                                      THEN 1 ELSE 0 END), 0) AS nearing_deadline \
             {FULL_PROPOSAL_JOINS} \
             WHERE {}",
            fragment.sql,
        );
        let mut stats_params = vec![
            Value::Text(month),
            Value::Text(today),
            Value::Text(week_out),
        ];
        stats_params.extend(fragment.params);

        let mut stmt = conn.prepare(&stats_sql)?;
        let stats = stmt.query_row(rusqlite::params_from_iter(stats_params), |row| {
            Ok(FullProposalStats {
                total: row.get("total")?,
                submitted_this_month: row.get("submitted_this_month")?,
                nearing_deadline: row.get("nearing_deadline")?,
            })
        })?;

        Ok(FullProposalList {
            full_proposals: Paginated {
                items,
                page: window.page,
                limit: window.limit,
                total: stats.total,
                total_pages: total_pages(stats.total, window.limit),
            },
            stats,
        })
    }

    /// Faculties with at least one proposal. Faculty is not stored on the
    /// proposal, so this is a three-stage set reduction: distinct
    /// submitters, their distinct faculties, then the faculty records.
    pub fn get_faculties_with_activity(&self) -> Result<Vec<Faculty>, AppError> {
        let conn = self.pool.get()?;
        let submitter_ids = proposal::distinct_submitter_ids(&conn)?;
        let faculty_ids = org::faculty_ids_for_users(&conn, &submitter_ids)?;
        org::faculties_by_ids(&conn, &faculty_ids)
    }
}
