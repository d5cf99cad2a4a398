//! General time utility functions

use chrono;

/// Number of nanoseconds in a second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert a duration into a number of seconds, or `None` if overflow
pub fn duration_to_seconds(duration: chrono::Duration) -> Option<f64> {
    duration
        .num_nanoseconds()
        .map(|ns| ns as f64 / NANOS_PER_SECOND as f64)
}

/// Convert a std duration into the time left until `period` has elapsed.
///
/// Returns a zero duration if `elapsed` is already longer than `period`.
pub fn remaining(
    period: std::time::Duration,
    elapsed: std::time::Duration
) -> std::time::Duration {
    period.checked_sub(elapsed).unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_duration_to_seconds() {
        assert_eq!(
            duration_to_seconds(chrono::Duration::milliseconds(1500)),
            Some(1.5)
        );
    }

    #[test]
    fn test_remaining() {
        let period = Duration::from_millis(100);
        assert_eq!(
            remaining(period, Duration::from_millis(30)),
            Duration::from_millis(70)
        );
        assert_eq!(remaining(period, Duration::from_millis(130)), Duration::ZERO);
    }
}
