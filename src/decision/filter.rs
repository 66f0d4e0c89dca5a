//! WHERE fragments shared by a decision listing and its statistics, so the
//! page and the aggregate numbers always describe the same population.

use rusqlite::types::Value;

use super::query::{FullProposalListQuery, ProposalListQuery};

/// A parameterized WHERE fragment. Positional `?` placeholders; callers
/// append their own trailing params (threshold, limit, offset) after these.
#[derive(Debug)]
pub struct FilterFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Base predicate plus the optional enumerated filters for the proposal
/// decision list. Archived proposals never match, whatever the filters.
pub fn proposal_filter(query: &ProposalListQuery) -> FilterFragment {
    let mut sql = String::from("p.review_status = 'reviewed' AND p.is_archived = 0");
    let mut params: Vec<Value> = vec![];

    if let Some(faculty_id) = query.faculty {
        sql.push_str(" AND u.faculty_id = ?");
        params.push(Value::Integer(faculty_id));
    }
    if let Some(status) = query.status {
        sql.push_str(" AND a.status = ?");
        params.push(Value::Text(status.as_str().to_string()));
    }

    FilterFragment { sql, params }
}

/// Base predicate for the full-proposal decision list: only records whose
/// parent award is approved, parent proposal not archived.
pub fn full_proposal_filter(query: &FullProposalListQuery) -> FilterFragment {
    let mut sql = String::from("a.status = 'approved' AND p.is_archived = 0");
    let mut params: Vec<Value> = vec![];

    if let Some(faculty_id) = query.faculty {
        sql.push_str(" AND u.faculty_id = ?");
        params.push(Value::Integer(faculty_id));
    }
    if let Some(status) = query.status {
        sql.push_str(" AND fp.status = ?");
        params.push(Value::Text(status.as_str().to_string()));
    }

    FilterFragment { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::award::AwardStatus;

    #[test]
    fn base_predicate_excludes_archived() {
        let fragment = proposal_filter(&ProposalListQuery::default());
        assert_eq!(
            fragment.sql,
            "p.review_status = 'reviewed' AND p.is_archived = 0"
        );
        assert!(fragment.params.is_empty());
    }

    #[test]
    fn optional_filters_append_in_order() {
        let query = ProposalListQuery {
            faculty: Some(7),
            status: Some(AwardStatus::Approved),
            ..Default::default()
        };
        let fragment = proposal_filter(&query);
        assert_eq!(
            fragment.sql,
            "p.review_status = 'reviewed' AND p.is_archived = 0 \
             AND u.faculty_id = ? AND a.status = ?"
        );
        assert_eq!(fragment.params.len(), 2);
        assert!(matches!(fragment.params[0], Value::Integer(7)));
    }

    #[test]
    fn full_proposal_base_requires_approved_award() {
        let fragment = full_proposal_filter(&FullProposalListQuery::default());
        assert_eq!(fragment.sql, "a.status = 'approved' AND p.is_archived = 0");
    }
}
