use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sliding-window submission limiter keyed on the submitting user. The
/// request layer consults it before handing a submission to the core;
/// none of the core workflow operations depend on it.
#[derive(Clone)]
pub struct SubmissionLimiter {
    max_submissions: usize,
    window: Duration,
    submissions: Arc<Mutex<HashMap<i64, Vec<Instant>>>>,
}

impl SubmissionLimiter {
    pub fn new(max_submissions: usize, window: Duration) -> Self {
        Self {
            max_submissions,
            window,
            submissions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Five submissions per hour.
    pub fn hourly() -> Self {
        Self::new(5, Duration::from_secs(3600))
    }

    /// Check if the given user is over the limit. Returns true if blocked.
    /// Also lazily prunes stale entries for the checked user.
    pub fn is_blocked(&self, user_id: i64) -> bool {
        let mut map = self.submissions.lock().unwrap_or_else(|e| e.into_inner());
        let cutoff = Instant::now() - self.window;

        if let Some(timestamps) = map.get_mut(&user_id) {
            timestamps.retain(|t| *t > cutoff);
            timestamps.len() >= self.max_submissions
        } else {
            false
        }
    }

    /// Record an accepted submission for the given user.
    pub fn record(&self, user_id: i64) {
        let mut map = self.submissions.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(user_id).or_default().push(Instant::now());
    }

    /// Clear all recorded submissions for the given user.
    pub fn clear(&self, user_id: i64) {
        let mut map = self.submissions.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&user_id);
    }
}
