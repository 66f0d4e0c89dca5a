use chrono::NaiveDateTime;

/// Injectable time source. Deadline and calendar-month statistics read the
/// clock at call time; tests freeze it.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// Current time in the storage timestamp format.
    fn timestamp(&self) -> String {
        self.now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Current day in the storage date format.
    fn today(&self) -> String {
        self.now().format("%Y-%m-%d").to_string()
    }
}

/// Wall-clock time, local timezone.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Fixed time source for deterministic tests.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_formats_storage_timestamp() {
        let at = NaiveDateTime::parse_from_str("2025-03-07 14:30:00", "%Y-%m-%d %H:%M:%S")
            .unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.timestamp(), "2025-03-07 14:30:00");
        assert_eq!(clock.today(), "2025-03-07");
    }
}
