/// Engine tunables. The divergence threshold and the statistics threshold
/// are parameters rather than constants: downstream decision statistics
/// depend on them.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lowest score a reviewer may submit.
    pub score_min: f64,
    /// Highest score a reviewer may submit.
    pub score_max: f64,
    /// Maximum allowed gap between automated and human scores before a
    /// reconciliation review is required.
    pub divergence_threshold: f64,
    /// Default cutoff for the "above threshold" decision statistics.
    pub decision_threshold: f64,
    /// Page size used when a listing query does not supply one.
    pub page_size_default: i64,
    /// Upper bound on caller-supplied page sizes.
    pub page_size_max: i64,
    /// Days granted for the full-proposal deadline at submission time.
    pub full_proposal_deadline_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            score_min: 0.0,
            score_max: 100.0,
            divergence_threshold: 10.0,
            decision_threshold: 70.0,
            page_size_default: 10,
            page_size_max: 100,
            full_proposal_deadline_days: 60,
        }
    }
}

impl EngineConfig {
    /// Load configuration from the environment, falling back to defaults
    /// for anything unset or unparseable. A `.env` file is honored when
    /// present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();
        Self {
            score_min: env_f64("GRANTFLOW_SCORE_MIN", defaults.score_min),
            score_max: env_f64("GRANTFLOW_SCORE_MAX", defaults.score_max),
            divergence_threshold: env_f64(
                "GRANTFLOW_DIVERGENCE_THRESHOLD",
                defaults.divergence_threshold,
            ),
            decision_threshold: env_f64(
                "GRANTFLOW_DECISION_THRESHOLD",
                defaults.decision_threshold,
            ),
            page_size_default: env_i64("GRANTFLOW_PAGE_SIZE", defaults.page_size_default),
            page_size_max: env_i64("GRANTFLOW_PAGE_SIZE_MAX", defaults.page_size_max),
            full_proposal_deadline_days: env_i64(
                "GRANTFLOW_FULL_PROPOSAL_DEADLINE_DAYS",
                defaults.full_proposal_deadline_days,
            ),
        }
    }
}

fn env_f64(key: &str, fallback: f64) -> f64 {
    match std::env::var(key) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                log::warn!("{key}={val} is not a number - using default {fallback}");
                fallback
            }
        },
        Err(_) => fallback,
    }
}

fn env_i64(key: &str, fallback: i64) -> i64 {
    match std::env::var(key) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                log::warn!("{key}={val} is not an integer - using default {fallback}");
                fallback
            }
        },
        Err(_) => fallback,
    }
}
