//! Decides whether an instant falls inside a setting's clock-time window.

use crate::common::ClockTime;
use crate::error::WindowError;
use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeZone};

/// A `start-end` clock-time interval, possibly crossing midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl Window {
    pub const fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// Returns `true` if `now` lies strictly between the window's start and end.
    ///
    /// Both endpoints are placed on `now`'s calendar date in `now`'s timezone.
    /// If the start's clock time lies after the end's, the window spans
    /// midnight: when `now`'s local time is before the end the start is moved
    /// to the previous day, otherwise the end is moved to the next day. Both
    /// boundaries are exclusive, so a window whose start equals its end is
    /// never active.
    ///
    /// # Errors
    /// Fails if an endpoint is not a real time of day (e.g. `99:00`), or does
    /// not exist on the date it lands on because of a DST gap. Only the dates
    /// actually used are checked.
    pub fn contains<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<bool, WindowError> {
        let start_time = naive_time(self.start)?;
        let end_time = naive_time(self.end)?;

        let today = now.date_naive();
        let (start_date, end_date) = if start_time > end_time {
            if now.naive_local() < today.and_time(end_time) {
                let yesterday = today
                    .checked_sub_days(Days::new(1))
                    .ok_or(WindowError::DateOutOfRange(today))?;
                (yesterday, today)
            } else {
                let tomorrow = today
                    .checked_add_days(Days::new(1))
                    .ok_or(WindowError::DateOutOfRange(today))?;
                (today, tomorrow)
            }
        } else {
            (today, today)
        };

        let zone = now.timezone();
        let start = resolve(&zone, start_date, start_time, self.start)?;
        let end = resolve(&zone, end_date, end_time, self.end)?;

        Ok(*now > start && *now < end)
    }
}

fn naive_time(time: ClockTime) -> Result<NaiveTime, WindowError> {
    NaiveTime::from_hms_opt(u32::from(time.hour), u32::from(time.minute), 0)
        .ok_or(WindowError::InvalidClockTime(time))
}

/// Places `naive` on `date` in `zone`. An ambiguous local time (DST fall-back)
/// resolves to its earliest instant.
fn resolve<Tz: TimeZone>(
    zone: &Tz,
    date: NaiveDate,
    naive: NaiveTime,
    time: ClockTime,
) -> Result<DateTime<Tz>, WindowError> {
    match zone.from_local_datetime(&date.and_time(naive)) {
        LocalResult::Single(instant) => Ok(instant),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(WindowError::NonexistentLocalTime { time, date }),
    }
}
