//! Integration tests for the decision listings and their statistics.

mod common;

use std::sync::Arc;

use grantflow::decision::{
    FullProposalListQuery, FullProposalSortKey, ProposalListQuery, ProposalSortKey, SortOrder,
};
use grantflow::errors::AppError;
use grantflow::models::award::AwardStatus;
use grantflow::models::review::ReviewKind;
use grantflow::models::{full_proposal, proposal};
use grantflow::notify::NullNotifier;
use grantflow::{AssignmentManager, AwardBoard, DecisionPipeline};

use common::*;

struct Fixture {
    manager: AssignmentManager,
    board: AwardBoard,
    pipeline: DecisionPipeline,
}

fn services(pool: &grantflow::db::DbPool) -> Fixture {
    let clock = frozen_clock();
    Fixture {
        manager: AssignmentManager::new(
            pool.clone(),
            test_config(),
            Arc::new(NullNotifier),
            clock.clone(),
        ),
        board: AwardBoard::new(pool.clone(), Arc::new(NullNotifier), clock.clone()),
        pipeline: DecisionPipeline::new(pool.clone(), test_config(), clock),
    }
}

/// Full review cycle for any submitter, landing at review_status reviewed
/// with a pending award carrying the mean score.
fn reviewed_for(
    pool: &grantflow::db::DbPool,
    fx: &Fixture,
    org: &TestOrg,
    submitter: i64,
    title: &str,
    budget: f64,
    score: f64,
) -> i64 {
    let prop_id = submitted_proposal(pool, submitter, title, budget);
    let auto = fx
        .manager
        .assign(prop_id, org.robot, ReviewKind::Automated)
        .unwrap();
    let human = fx
        .manager
        .assign(prop_id, org.reviewer, ReviewKind::Human)
        .unwrap();
    fx.manager.complete(auto.id, score).unwrap();
    fx.manager.complete(human.id, score).unwrap();
    prop_id
}

#[test]
fn test_base_predicate_excludes_unreviewed_and_archived() {
    let (_dir, pool) = setup_test_pool();
    let org = seed_org(&pool);
    let fx = services(&pool);

    let ready = reviewed_for(&pool, &fx, &org, org.submitter, "Ready", 10_000.0, 80.0);
    submitted_proposal(&pool, org.submitter, "Still unreviewed", 20_000.0);
    let archived = reviewed_for(&pool, &fx, &org, org.submitter, "Archived", 30_000.0, 85.0);
    fx.board.toggle_archive(archived).unwrap();

    let list = fx
        .pipeline
        .list_for_decision(&ProposalListQuery::default())
        .unwrap();
    assert_eq!(list.stats.total_proposals, 1);
    assert_eq!(list.proposals.items.len(), 1);
    assert_eq!(list.proposals.items[0].id, ready);

    // Archived stays reachable by direct id lookup.
    let conn = pool.get().unwrap();
    let prop = proposal::find_by_id(&conn, archived).unwrap().unwrap();
    assert!(prop.is_archived);
}

#[test]
fn test_pagination_covers_population_exactly_once() {
    let (_dir, pool) = setup_test_pool();
    let org = seed_org(&pool);
    let fx = services(&pool);

    for i in 0..23 {
        reviewed_for(
            &pool,
            &fx,
            &org,
            org.submitter,
            &format!("Proposal {i:02}"),
            1_000.0 * (i + 1) as f64,
            70.0,
        );
    }

    let mut seen = Vec::new();
    let mut page = 1;
    loop {
        let list = fx
            .pipeline
            .list_for_decision(&ProposalListQuery {
                page: Some(page),
                limit: Some(10),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(list.stats.total_proposals, 23);
        assert_eq!(list.proposals.total_pages, 3);
        match page {
            1 | 2 => assert_eq!(list.proposals.items.len(), 10),
            3 => assert_eq!(list.proposals.items.len(), 3),
            _ => panic!("unexpected page {page}"),
        }
        seen.extend(list.proposals.items.iter().map(|row| row.id));
        if page == list.proposals.total_pages {
            break;
        }
        page += 1;
    }

    // Every matching proposal appears exactly once across the pages.
    let mut deduped = seen.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(seen.len(), 23);
    assert_eq!(deduped.len(), 23);
}

#[test]
fn test_default_sort_is_score_desc_with_id_tiebreak() {
    let (_dir, pool) = setup_test_pool();
    let org = seed_org(&pool);
    let fx = services(&pool);

    let mid = reviewed_for(&pool, &fx, &org, org.submitter, "Mid", 10_000.0, 80.0);
    let top_first = reviewed_for(&pool, &fx, &org, org.submitter, "Top A", 10_000.0, 90.0);
    let top_second = reviewed_for(&pool, &fx, &org, org.submitter, "Top B", 10_000.0, 90.0);

    let list = fx
        .pipeline
        .list_for_decision(&ProposalListQuery::default())
        .unwrap();
    let ids: Vec<i64> = list.proposals.items.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![top_first, top_second, mid]);

    // Same tie-break holds on ascending order.
    let list = fx
        .pipeline
        .list_for_decision(&ProposalListQuery {
            order: Some(SortOrder::Asc),
            ..Default::default()
        })
        .unwrap();
    let ids: Vec<i64> = list.proposals.items.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![mid, top_first, top_second]);

    let list = fx
        .pipeline
        .list_for_decision(&ProposalListQuery {
            sort: Some(ProposalSortKey::Title),
            order: Some(SortOrder::Asc),
            ..Default::default()
        })
        .unwrap();
    let titles: Vec<&str> = list
        .proposals
        .items
        .iter()
        .map(|row| row.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Mid", "Top A", "Top B"]);
}

#[test]
fn test_statistics_reflect_threshold_and_decisions() {
    let (_dir, pool) = setup_test_pool();
    let org = seed_org(&pool);
    let fx = services(&pool);

    let high = reviewed_for(&pool, &fx, &org, org.submitter, "High", 100_000.0, 90.0);
    let low = reviewed_for(&pool, &fx, &org, org.submitter, "Low", 50_000.0, 60.0);
    reviewed_for(&pool, &fx, &org, org.submitter, "Upper mid", 70_000.0, 81.0);

    fx.board
        .decide(high, AwardStatus::Approved, Some(40_000.0), None, org.admin)
        .unwrap();
    fx.board
        .decide(low, AwardStatus::Declined, None, None, org.admin)
        .unwrap();

    let list = fx
        .pipeline
        .list_for_decision(&ProposalListQuery {
            threshold: Some(75.0),
            ..Default::default()
        })
        .unwrap();
    let stats = &list.stats;
    assert_eq!(stats.total_proposals, 3);
    assert_eq!(stats.pending_awards, 1);
    assert_eq!(stats.approved_awards, 1);
    assert_eq!(stats.declined_awards, 1);
    assert_eq!(stats.average_final_score, Some(77.0));
    assert_eq!(stats.threshold, 75.0);
    assert_eq!(stats.above_threshold_count, 2);
    assert_eq!(stats.above_threshold_budget, 170_000.0);
    assert_eq!(stats.approved_funding_total, 40_000.0);
}

#[test]
fn test_faculty_filter_applies_to_page_and_statistics() {
    let (_dir, pool) = setup_test_pool();
    let org = seed_org(&pool);
    let fx = services(&pool);

    reviewed_for(&pool, &fx, &org, org.submitter, "Science A", 10_000.0, 80.0);
    reviewed_for(&pool, &fx, &org, org.submitter, "Science B", 20_000.0, 85.0);
    reviewed_for(&pool, &fx, &org, org.submitter_hum, "Humanities A", 30_000.0, 75.0);

    let list = fx
        .pipeline
        .list_for_decision(&ProposalListQuery {
            faculty: Some(org.faculty_science),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(list.stats.total_proposals, 2);
    assert_eq!(list.proposals.items.len(), 2);
    assert!(
        list.proposals
            .items
            .iter()
            .all(|row| row.faculty_name.as_deref() == Some("Faculty of Science"))
    );
}

#[test]
fn test_award_status_filter() {
    let (_dir, pool) = setup_test_pool();
    let org = seed_org(&pool);
    let fx = services(&pool);

    let approved = reviewed_for(&pool, &fx, &org, org.submitter, "Approved", 10_000.0, 88.0);
    reviewed_for(&pool, &fx, &org, org.submitter, "Pending", 20_000.0, 70.0);
    fx.board
        .decide(approved, AwardStatus::Approved, Some(9_000.0), None, org.admin)
        .unwrap();

    let list = fx
        .pipeline
        .list_for_decision(&ProposalListQuery {
            status: Some(AwardStatus::Approved),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(list.stats.total_proposals, 1);
    assert_eq!(list.proposals.items[0].id, approved);
    assert_eq!(list.proposals.items[0].award_status, Some(AwardStatus::Approved));
}

#[test]
fn test_rejects_out_of_bounds_paging() {
    let (_dir, pool) = setup_test_pool();
    seed_org(&pool);
    let fx = services(&pool);

    for bad in [
        ProposalListQuery { page: Some(0), ..Default::default() },
        ProposalListQuery { limit: Some(0), ..Default::default() },
        ProposalListQuery { limit: Some(1000), ..Default::default() },
    ] {
        assert!(matches!(
            fx.pipeline.list_for_decision(&bad),
            Err(AppError::Validation(_))
        ));
    }
}

#[test]
fn test_faculties_with_activity_is_a_set_reduction() {
    let (_dir, pool) = setup_test_pool();
    let org = seed_org(&pool);
    let fx = services(&pool);

    assert!(fx.pipeline.get_faculties_with_activity().unwrap().is_empty());

    submitted_proposal(&pool, org.submitter, "Science draft", 5_000.0);
    let faculties = fx.pipeline.get_faculties_with_activity().unwrap();
    assert_eq!(faculties.len(), 1);
    assert_eq!(faculties[0].id, org.faculty_science);

    // A second proposal from the same faculty adds nothing; a humanities
    // one adds its faculty.
    submitted_proposal(&pool, org.submitter, "Science again", 6_000.0);
    submitted_proposal(&pool, org.submitter_hum, "Humanities draft", 7_000.0);
    let names: Vec<String> = fx
        .pipeline
        .get_faculties_with_activity()
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(
        names,
        vec!["Faculty of Humanities".to_string(), "Faculty of Science".to_string()]
    );
}

#[test]
fn test_full_proposal_list_requires_approved_parent_award() {
    let (_dir, pool) = setup_test_pool();
    let org = seed_org(&pool);
    let fx = services(&pool);
    let conn = pool.get().unwrap();

    let approved = reviewed_for(&pool, &fx, &org, org.submitter, "Approved", 10_000.0, 90.0);
    fx.board
        .decide(approved, AwardStatus::Approved, Some(8_000.0), None, org.admin)
        .unwrap();
    let fp = full_proposal::create(&conn, approved, "doc://v1.pdf", "2025-08-01", FROZEN_NOW)
        .unwrap();

    // A pending-award proposal has no business in this list even if a
    // record were forced in.
    let pending = reviewed_for(&pool, &fx, &org, org.submitter, "Pending", 10_000.0, 70.0);
    full_proposal::create(&conn, pending, "doc://stray.pdf", "2025-08-01", FROZEN_NOW).unwrap();

    let list = fx
        .pipeline
        .list_full_proposals_for_decision(&FullProposalListQuery::default())
        .unwrap();
    assert_eq!(list.stats.total, 1);
    assert_eq!(list.full_proposals.items.len(), 1);
    assert_eq!(list.full_proposals.items[0].id, fp);
    assert_eq!(list.full_proposals.items[0].title, "Approved");
}

#[test]
fn test_full_proposal_time_window_statistics() {
    let (_dir, pool) = setup_test_pool();
    let org = seed_org(&pool);
    let fx = services(&pool);
    let conn = pool.get().unwrap();

    let make_approved = |title: &str| {
        let id = reviewed_for(&pool, &fx, &org, org.submitter, title, 10_000.0, 85.0);
        fx.board
            .decide(id, AwardStatus::Approved, Some(5_000.0), None, org.admin)
            .unwrap();
        id
    };

    // Submitted this month (frozen clock June 2025), deadline far out.
    let recent = make_approved("Recent");
    full_proposal::create(&conn, recent, "doc://recent.pdf", "2025-09-30", FROZEN_NOW).unwrap();

    // Submitted in May, deadline three days from the frozen now, still
    // awaiting a decision: nearing deadline.
    let near = make_approved("Near deadline");
    full_proposal::create(&conn, near, "doc://near.pdf", "2025-06-18", "2025-05-20 10:00:00")
        .unwrap();

    // Deadline already past: not nearing.
    let overdue = make_approved("Overdue");
    full_proposal::create(
        &conn,
        overdue,
        "doc://overdue.pdf",
        "2025-06-10",
        "2025-05-01 09:00:00",
    )
    .unwrap();

    let list = fx
        .pipeline
        .list_full_proposals_for_decision(&FullProposalListQuery::default())
        .unwrap();
    assert_eq!(list.stats.total, 3);
    assert_eq!(list.stats.submitted_this_month, 1);
    assert_eq!(list.stats.nearing_deadline, 1);

    // Deadline sort, soonest first.
    let list = fx
        .pipeline
        .list_full_proposals_for_decision(&FullProposalListQuery {
            sort: Some(FullProposalSortKey::Deadline),
            order: Some(SortOrder::Asc),
            ..Default::default()
        })
        .unwrap();
    let deadlines: Vec<&str> = list
        .full_proposals
        .items
        .iter()
        .map(|row| row.deadline.as_str())
        .collect();
    assert_eq!(deadlines, vec!["2025-06-10", "2025-06-18", "2025-09-30"]);
}
