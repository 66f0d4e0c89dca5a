//! Listing query parameters, exhaustively enumerated. Anything outside the
//! enumeration is rejected with `Validation` instead of being passed
//! through to the query engine.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::errors::AppError;
use crate::models::award::AwardStatus;
use crate::models::full_proposal::FullProposalStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn from_param(s: &str) -> Result<Self, AppError> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppError::Validation(format!("unknown sort order '{other}'"))),
        }
    }
}

/// Sort keys for the proposal decision list. Column expressions are
/// hardcoded here, never user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalSortKey {
    FinalScore,
    Title,
    RequestedBudget,
    CreatedAt,
    ProposalType,
}

impl ProposalSortKey {
    pub fn sql_col(&self) -> &'static str {
        match self {
            ProposalSortKey::FinalScore => "a.final_score",
            ProposalSortKey::Title => "p.title",
            ProposalSortKey::RequestedBudget => "p.requested_budget",
            ProposalSortKey::CreatedAt => "p.created_at",
            ProposalSortKey::ProposalType => "p.proposal_type",
        }
    }

    pub fn from_param(s: &str) -> Result<Self, AppError> {
        match s {
            "final_score" => Ok(ProposalSortKey::FinalScore),
            "title" => Ok(ProposalSortKey::Title),
            "requested_budget" => Ok(ProposalSortKey::RequestedBudget),
            "created_at" => Ok(ProposalSortKey::CreatedAt),
            "proposal_type" => Ok(ProposalSortKey::ProposalType),
            other => Err(AppError::Validation(format!("unknown sort key '{other}'"))),
        }
    }
}

/// Sort keys for the full-proposal decision list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullProposalSortKey {
    Deadline,
    SubmittedAt,
    Title,
    FinalScore,
}

impl FullProposalSortKey {
    pub fn sql_col(&self) -> &'static str {
        match self {
            FullProposalSortKey::Deadline => "fp.deadline",
            FullProposalSortKey::SubmittedAt => "fp.submitted_at",
            FullProposalSortKey::Title => "p.title",
            FullProposalSortKey::FinalScore => "a.final_score",
        }
    }

    pub fn from_param(s: &str) -> Result<Self, AppError> {
        match s {
            "deadline" => Ok(FullProposalSortKey::Deadline),
            "submitted_at" => Ok(FullProposalSortKey::SubmittedAt),
            "title" => Ok(FullProposalSortKey::Title),
            "final_score" => Ok(FullProposalSortKey::FinalScore),
            other => Err(AppError::Validation(format!("unknown sort key '{other}'"))),
        }
    }
}

/// Parameters for the proposal decision list. Unset fields take the
/// documented defaults; `threshold` only feeds the statistics, never the
/// returned page.
#[derive(Debug, Clone, Default)]
pub struct ProposalListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<ProposalSortKey>,
    pub order: Option<SortOrder>,
    pub faculty: Option<i64>,
    pub status: Option<AwardStatus>,
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct FullProposalListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<FullProposalSortKey>,
    pub order: Option<SortOrder>,
    pub faculty: Option<i64>,
    pub status: Option<FullProposalStatus>,
}

/// Validated pagination window: 1-indexed page, bounded limit.
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

pub fn resolve_page(
    page: Option<i64>,
    limit: Option<i64>,
    cfg: &EngineConfig,
) -> Result<PageWindow, AppError> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::Validation(format!("page must be >= 1, got {page}")));
    }
    let limit = limit.unwrap_or(cfg.page_size_default);
    if limit < 1 {
        return Err(AppError::Validation(format!("limit must be >= 1, got {limit}")));
    }
    if limit > cfg.page_size_max {
        return Err(AppError::Validation(format!(
            "limit {limit} exceeds maximum {}",
            cfg.page_size_max
        )));
    }
    Ok(PageWindow {
        page,
        limit,
        offset: (page - 1) * limit,
    })
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total == 0 { 0 } else { (total + limit - 1) / limit }
}

/// One page of results plus the population size behind it.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_apply() {
        let cfg = EngineConfig::default();
        let window = resolve_page(None, None, &cfg).unwrap();
        assert_eq!(window.page, 1);
        assert_eq!(window.limit, cfg.page_size_default);
        assert_eq!(window.offset, 0);
    }

    #[test]
    fn offset_is_one_indexed() {
        let cfg = EngineConfig::default();
        let window = resolve_page(Some(3), Some(10), &cfg).unwrap();
        assert_eq!(window.offset, 20);
    }

    #[test]
    fn rejects_non_positive_page_and_limit() {
        let cfg = EngineConfig::default();
        assert!(matches!(
            resolve_page(Some(0), None, &cfg),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            resolve_page(None, Some(0), &cfg),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            resolve_page(None, Some(cfg.page_size_max + 1), &cfg),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn rejects_unknown_sort_key() {
        assert!(matches!(
            ProposalSortKey::from_param("password"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            SortOrder::from_param("sideways"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(23, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(0, 10), 0);
    }
}
