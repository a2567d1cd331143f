//! Elapsed-time classification of filesystem entries.

use std::time::{Duration, SystemTime};

const NANOS_PER_MINUTE: u128 = 60 * 1_000_000_000;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: u128 = 24 * NANOS_PER_HOUR;

/// Time elapsed since a modification, expressed in three independent units.
///
/// Each unit is computed separately from the exact elapsed duration and
/// rounded to the nearest integer (half rounds up), so `hours` is not
/// `days * 24` and callers pick whichever unit their policy is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Elapsed {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl Elapsed {
    /// Classify the time between `modified_at` and `now`.
    ///
    /// A modification time later than `now` counts as no elapsed time.
    pub fn between(modified_at: SystemTime, now: SystemTime) -> Self {
        let elapsed = now.duration_since(modified_at).unwrap_or(Duration::ZERO);
        Self::from_duration(elapsed)
    }

    pub fn from_duration(elapsed: Duration) -> Self {
        let nanos = elapsed.as_nanos();
        Self {
            days: rounded_units(nanos, NANOS_PER_DAY),
            hours: rounded_units(nanos, NANOS_PER_HOUR),
            minutes: rounded_units(nanos, NANOS_PER_MINUTE),
        }
    }
}

fn rounded_units(nanos: u128, unit: u128) -> u64 {
    let units = (nanos + unit / 2) / unit;
    u64::try_from(units).unwrap_or(u64::MAX)
}

/// Shorthand for [`Elapsed::between`].
pub fn classify(modified_at: SystemTime, now: SystemTime) -> Elapsed {
    Elapsed::between(modified_at, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 60 * 60;

    #[test]
    fn test_units_are_rounded_not_truncated() {
        let elapsed = Elapsed::from_duration(Duration::from_secs(48 * HOUR + 29 * 60));
        assert_eq!(elapsed.hours, 48);
        let elapsed = Elapsed::from_duration(Duration::from_secs(48 * HOUR + 30 * 60));
        assert_eq!(elapsed.hours, 49);
        assert_eq!(elapsed.days, 2);
        assert_eq!(elapsed.minutes, 48 * 60 + 30);
    }

    #[test]
    fn test_units_are_independent() {
        // 36 hours is 1.5 days: days round up while hours stay exact
        let elapsed = Elapsed::from_duration(Duration::from_secs(36 * HOUR));
        assert_eq!(elapsed.days, 2);
        assert_eq!(elapsed.hours, 36);
    }

    #[test]
    fn test_future_modification_is_zero() {
        let now = SystemTime::now();
        let future = now + Duration::from_secs(10 * HOUR);
        assert_eq!(classify(future, now), Elapsed::default());
    }

    #[test]
    fn test_between_uses_reference_time() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000 * 24 * HOUR);
        let modified = now - Duration::from_secs(400 * 24 * HOUR);
        let elapsed = classify(modified, now);
        assert_eq!(elapsed.days, 400);
        assert_eq!(elapsed.hours, 9_600);
    }
}
