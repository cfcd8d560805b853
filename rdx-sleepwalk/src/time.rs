//! The source of "now" for window evaluation.
//!
//! The timezone is part of the clock rather than ambient process state, so a
//! pass can be evaluated against any zone and tests can pin the instant.

use chrono::{DateTime, TimeZone, Utc};

/// Produces the reference instant for a reconciliation pass.
pub trait Clock: Send + Sync {
    type Zone: TimeZone<Offset: Send + Sync> + Send + Sync;

    fn now(&self) -> DateTime<Self::Zone>;
}

/// Wall-clock time viewed in a fixed zone, e.g. `chrono::Local` or a
/// `chrono_tz::Tz`.
#[derive(Debug, Clone)]
pub struct SystemClock<Z> {
    zone: Z,
}

impl<Z> SystemClock<Z> {
    pub fn new(zone: Z) -> Self {
        Self { zone }
    }
}

impl<Z> Clock for SystemClock<Z>
where
    Z: TimeZone + Send + Sync,
    Z::Offset: Send + Sync,
{
    type Zone = Z;

    fn now(&self) -> DateTime<Z> {
        Utc::now().with_timezone(&self.zone)
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock<Z: TimeZone> {
    instant: DateTime<Z>,
}

impl<Z: TimeZone> FixedClock<Z> {
    pub fn new(instant: DateTime<Z>) -> Self {
        Self { instant }
    }
}

impl<Z> Clock for FixedClock<Z>
where
    Z: TimeZone + Send + Sync,
    Z::Offset: Send + Sync,
{
    type Zone = Z;

    fn now(&self) -> DateTime<Z> {
        self.instant.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Tokyo;

    #[test]
    fn should_report_system_time_in_configured_zone() {
        let clock = SystemClock::new(Tokyo);
        let before = Utc::now();
        let now = clock.now();
        let after = Utc::now();

        assert_eq!(now.timezone(), Tokyo);
        assert!(now >= before);
        assert!(now <= after);
    }

    #[test]
    fn should_always_return_the_pinned_instant() {
        let instant = Tokyo.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        let clock = FixedClock::new(instant);

        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
    }
}
