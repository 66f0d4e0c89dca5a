//! Final-score derivation from a proposal's completed review set.

use rusqlite::Connection;

use crate::config::EngineConfig;
use crate::errors::AppError;
use crate::models::review;

/// True when an automated/human score pair is too far apart to average and
/// a reconciliation review is required.
pub fn diverges(cfg: &EngineConfig, automated: f64, human: f64) -> bool {
    (automated - human).abs() > cfg.divergence_threshold
}

/// Derive the final score for a proposal, in priority order:
/// a completed reconciliation review overrides everything; an
/// automated/human pair within the divergence threshold averages; a single
/// completed score stands alone. A divergent pair without a completed
/// reconciliation has no final score yet, and neither does an empty review
/// set; such proposals cannot become decision-ready.
pub fn compute_final_score(
    conn: &Connection,
    cfg: &EngineConfig,
    proposal_id: i64,
) -> Result<Option<f64>, AppError> {
    let scores = review::completed_scores(conn, proposal_id)?;

    if let Some(reconciled) = scores.reconciliation {
        return Ok(Some(reconciled));
    }

    match (scores.automated, scores.human) {
        (Some(a), Some(h)) => {
            if diverges(cfg, a, h) {
                Ok(None)
            } else {
                Ok(Some((a + h) / 2.0))
            }
        }
        (Some(single), None) | (None, Some(single)) => Ok(Some(single)),
        (None, None) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divergence_is_strict() {
        let cfg = EngineConfig {
            divergence_threshold: 5.0,
            ..EngineConfig::default()
        };
        assert!(!diverges(&cfg, 80.0, 85.0));
        assert!(!diverges(&cfg, 85.0, 80.0));
        assert!(diverges(&cfg, 80.0, 90.0));
    }
}
