use chrono::{NaiveDate, NaiveDateTime};
use derive_more::{Display, From};

use super::{end_of, is_on_or_after, is_on_or_before};

/// An inclusive query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
#[display("{start} - {end}")]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Midnight to the last instant of `date`.
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date.and_time(chrono::NaiveTime::MIN),
            end: end_of(date),
        }
    }

    /// The window lies within `[start, end]`.
    pub fn is_within(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        is_on_or_after(self.start, start) && is_on_or_before(self.end, end)
    }

    /// `[start, end]` lies within the window.
    pub fn contains(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        is_on_or_after(start, self.start) && is_on_or_before(end, self.end)
    }
}
