//! Normalise the feed's compact date tokens into local timestamps.
//!
//! Parsing happens in two phases: [`std_date`] rewrites a raw token such as
//! `TZID=Europe/London:20240101T100000` or `VALUE=DATE:20240101` into the
//! intermediate form `2024-01-01T10:00:00`, and [`format_date`] parses that
//! form into a [`NaiveDateTime`].
//!
//! All timestamps live in a single implicit zone. A trailing `Z` and any
//! `TZID` parameter are dropped rather than converted.

use chrono::{Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use lazy_static::lazy_static;
use regex::Regex;

use crate::VALUE_DELIMITER;

/// `strftime` pattern of the intermediate textual form.
pub const STD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

lazy_static! {
    static ref RE_DATE_TOKEN: Regex = Regex::new(
        r"^(?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})(?:T(?P<hour>\d{2})(?P<minute>\d{2})(?P<second>\d{2})?)?Z?$"
    )
    .unwrap();
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DateError {
    #[error("invalid date token: {0:?}")]
    InvalidToken(String),
    #[error("date arithmetic out of range: {0}")]
    OutOfRange(NaiveDateTime),
}

/// Rewrite a raw date token into `YYYY-MM-DDTHH:MM:SS`.
///
/// Anything up to the last `:` is a parameter prefix and is discarded.
/// Date-only tokens get a time of day of midnight.
pub fn std_date(raw: &str) -> Result<String, DateError> {
    let token = raw
        .rsplit_once(VALUE_DELIMITER)
        .map_or(raw, |(_, token)| token)
        .trim();
    let caps = RE_DATE_TOKEN
        .captures(token)
        .ok_or_else(|| DateError::InvalidToken(raw.to_owned()))?;
    let part = |name: &str, default: &'static str| caps.name(name).map_or(default, |m| m.as_str());

    Ok(format!(
        "{}-{}-{}T{}:{}:{}",
        &caps["year"],
        &caps["month"],
        &caps["day"],
        part("hour", "00"),
        part("minute", "00"),
        part("second", "00"),
    ))
}

/// Parse the intermediate form produced by [`std_date`].
pub fn format_date(std: &str) -> Result<NaiveDateTime, DateError> {
    NaiveDateTime::parse_from_str(std, STD_FORMAT)
        .map_err(|_| DateError::InvalidToken(std.to_owned()))
}

/// Both phases in one call.
#[inline]
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DateError> {
    format_date(&std_date(raw)?)
}

#[inline]
pub fn is_before(this: NaiveDateTime, other: NaiveDateTime) -> bool {
    this < other
}

#[inline]
pub fn is_on_or_before(this: NaiveDateTime, other: NaiveDateTime) -> bool {
    this <= other
}

#[inline]
pub fn is_on_or_after(this: NaiveDateTime, other: NaiveDateTime) -> bool {
    this >= other
}

/// Last representable instant of the timestamp's calendar day.
pub fn end_of_day(ts: NaiveDateTime) -> NaiveDateTime {
    end_of(ts.date())
}

/// Last instant of `date`.
pub fn end_of(date: NaiveDate) -> NaiveDateTime {
    // 23:59:59.999 is always a valid time
    date.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN))
}

/// One millisecond earlier.
pub fn subtract_one_instant(ts: NaiveDateTime) -> Result<NaiveDateTime, DateError> {
    ts.checked_sub_signed(TimeDelta::milliseconds(1))
        .ok_or(DateError::OutOfRange(ts))
}

/// A recurrence step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Days(u32),
    Months(u32),
}

/// Advance `ts` by `count` steps, keeping the time of day.
///
/// Month steps clamp to the last day of shorter months, so callers rolling a
/// series should always roll from the series anchor.
pub fn roll_by(ts: NaiveDateTime, step: Step, count: u32) -> Result<NaiveDateTime, DateError> {
    let rolled = match step {
        Step::Days(days) => u64::from(days)
            .checked_mul(u64::from(count))
            .and_then(|days| ts.checked_add_days(Days::new(days))),
        Step::Months(months) => months
            .checked_mul(count)
            .and_then(|months| ts.checked_add_months(Months::new(months))),
    };
    rolled.ok_or(DateError::OutOfRange(ts))
}

/// The recency horizon: occurrences ending before it are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recency {
    horizon: NaiveDateTime,
}

impl Recency {
    /// Keep occurrences ending on or after `now - retention`.
    pub fn relative_to(now: NaiveDateTime, retention: TimeDelta) -> Self {
        Self {
            horizon: now.checked_sub_signed(retention).unwrap_or(NaiveDateTime::MIN),
        }
    }

    /// Never drop anything.
    pub fn keep_all() -> Self {
        Self {
            horizon: NaiveDateTime::MIN,
        }
    }

    pub fn horizon(&self) -> NaiveDateTime {
        self.horizon
    }

    #[inline]
    pub fn is_recent_enough_to_keep(&self, end: NaiveDateTime) -> bool {
        is_on_or_after(end, self.horizon)
    }
}
