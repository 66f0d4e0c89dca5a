//! Shared test infrastructure: temporary SQLite database, org seed data,
//! fixed clock and a recording notifier.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use tempfile::TempDir;

use grantflow::clock::FixedClock;
use grantflow::config::EngineConfig;
use grantflow::db::{self, DbPool};
use grantflow::models::org::{self, NewUser};
use grantflow::notify::{Notification, NotificationKind, Notifier};

pub const FROZEN_NOW: &str = "2025-06-15 12:00:00";

/// Setup a pooled test database with schema applied.
///
/// Returns a tuple of (TempDir, DbPool) where TempDir must be kept alive
/// for the database file to remain valid.
pub fn setup_test_pool() -> (TempDir, DbPool) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let pool = db::init_pool(db_path.to_str().expect("temp path not utf-8"));
    db::run_migrations(&pool);
    (dir, pool)
}

/// Engine config used across tests: the documented defaults with a
/// divergence threshold of 5 points.
pub fn test_config() -> EngineConfig {
    EngineConfig {
        divergence_threshold: 5.0,
        ..EngineConfig::default()
    }
}

/// Clock frozen at a mid-month Sunday.
pub fn frozen_clock() -> Arc<FixedClock> {
    let at = NaiveDateTime::parse_from_str(FROZEN_NOW, "%Y-%m-%d %H:%M:%S")
        .expect("bad FROZEN_NOW");
    Arc::new(FixedClock(at))
}

/// Captures every dispatched notification for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.sent.lock().unwrap().iter().map(|n| n.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

/// Seeded organizational records shared by the workflow tests.
pub struct TestOrg {
    pub faculty_science: i64,
    pub faculty_humanities: i64,
    pub department: i64,
    /// Staff submitter in the science faculty.
    pub submitter: i64,
    /// Second submitter, humanities faculty.
    pub submitter_hum: i64,
    /// System account completing automated reviews.
    pub robot: i64,
    pub reviewer: i64,
    pub second_reviewer: i64,
    pub admin: i64,
}

/// Create a proposal and move it to submitted, ready for assignment.
pub fn submitted_proposal(
    pool: &DbPool,
    submitter_id: i64,
    title: &str,
    budget: f64,
) -> i64 {
    use grantflow::models::proposal::{self, NewProposal, ProposalType};

    let conn = pool.get().expect("Failed to get connection");
    let id = proposal::create(
        &conn,
        &NewProposal {
            submitter_id,
            proposal_type: ProposalType::Staff,
            title: title.to_string(),
            abstract_text: String::new(),
            requested_budget: budget,
        },
    )
    .expect("create proposal");
    proposal::mark_submitted(&conn, id, FROZEN_NOW).expect("submit proposal");
    id
}

/// Run a proposal through both base reviews. Convergent scores leave it
/// reviewed with a pending award; divergent scores leave it waiting on
/// reconciliation.
pub fn reviewed_proposal(
    pool: &DbPool,
    manager: &grantflow::AssignmentManager,
    org: &TestOrg,
    title: &str,
    budget: f64,
    automated_score: f64,
    human_score: f64,
) -> i64 {
    use grantflow::models::review::ReviewKind;

    let proposal_id = submitted_proposal(pool, org.submitter, title, budget);
    let auto = manager
        .assign(proposal_id, org.robot, ReviewKind::Automated)
        .expect("assign automated");
    let human = manager
        .assign(proposal_id, org.reviewer, ReviewKind::Human)
        .expect("assign human");
    manager.complete(auto.id, automated_score).expect("complete automated");
    manager.complete(human.id, human_score).expect("complete human");
    proposal_id
}

pub fn seed_org(pool: &DbPool) -> TestOrg {
    let conn = pool.get().expect("Failed to get seed connection");

    let faculty_science =
        org::create_faculty(&conn, "Faculty of Science").expect("seed faculty");
    let faculty_humanities =
        org::create_faculty(&conn, "Faculty of Humanities").expect("seed faculty");
    let department = org::create_department(&conn, "Department of Biology").expect("seed dept");

    let mut user = |username: &str, faculty: Option<i64>, role: &str| {
        org::create_user(
            &conn,
            &NewUser {
                username: username.to_string(),
                display_name: username.to_string(),
                email: format!("{username}@uni.example"),
                role: role.to_string(),
                faculty_id: faculty,
                department_id: Some(department),
            },
        )
        .expect("seed user")
    };

    TestOrg {
        faculty_science,
        faculty_humanities,
        department,
        submitter: user("alice", Some(faculty_science), "staff"),
        submitter_hum: user("bob", Some(faculty_humanities), "staff"),
        robot: user("scorebot", None, "system"),
        reviewer: user("carol", Some(faculty_science), "reviewer"),
        second_reviewer: user("dave", Some(faculty_humanities), "reviewer"),
        admin: user("erin", None, "admin"),
    }
}
