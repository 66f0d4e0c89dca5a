//! Review assignment and decision aggregation engine for research-proposal
//! funding rounds: reviewer assignment across automated, human and
//! reconciliation reviews, final-score derivation, decision-ready listings
//! with population statistics, and the award/archive lifecycle.
//!
//! Transport, authentication, document storage and mail delivery live
//! outside this crate; it consumes a SQLite-backed repository, an
//! injectable clock and a fire-and-forget notifier.

pub mod award;
pub mod clock;
pub mod config;
pub mod db;
pub mod decision;
pub mod errors;
pub mod intake;
pub mod models;
pub mod notify;
pub mod rate_limit;
pub mod review;

pub use award::AwardBoard;
pub use config::EngineConfig;
pub use decision::DecisionPipeline;
pub use errors::AppError;
pub use intake::Intake;
pub use review::AssignmentManager;
