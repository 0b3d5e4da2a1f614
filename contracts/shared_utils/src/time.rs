//! Time utilities for timestamp and duration calculations

use soroban_sdk::Env;

/// Time utility functions for working with timestamps and durations
pub struct TimeUtils;

impl TimeUtils {
    /// Get the current ledger timestamp
    pub fn now(e: &Env) -> u64 {
        e.ledger().timestamp()
    }

    /// Convert days to seconds
    pub fn days_to_seconds(days: u32) -> u64 {
        days as u64 * 24 * 60 * 60
    }

    /// Check if a deadline has passed (current time >= deadline)
    pub fn is_expired(e: &Env, deadline: u64) -> bool {
        Self::now(e) >= deadline
    }

    /// Calculate time remaining until a deadline (0 if passed)
    pub fn time_remaining(e: &Env, deadline: u64) -> u64 {
        deadline.saturating_sub(Self::now(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::testutils::Ledger;

    #[test]
    fn test_days_to_seconds() {
        assert_eq!(TimeUtils::days_to_seconds(1), 86400);
        assert_eq!(TimeUtils::days_to_seconds(3), 259200);
    }

    #[test]
    fn test_is_expired() {
        let env = Env::default();
        env.ledger().with_mut(|l| {
            l.timestamp = 1000;
        });

        assert!(TimeUtils::is_expired(&env, 500));
        assert!(TimeUtils::is_expired(&env, 1000));
        assert!(!TimeUtils::is_expired(&env, 2000));
    }

    #[test]
    fn test_time_remaining() {
        let env = Env::default();
        env.ledger().with_mut(|l| {
            l.timestamp = 1000;
        });

        assert_eq!(TimeUtils::time_remaining(&env, 500), 0);
        assert_eq!(TimeUtils::time_remaining(&env, 2000), 1000);
    }
}
