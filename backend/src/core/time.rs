//! Time handling for exit schedules and episodes.
//!
//! Two distinct clocks exist in a coordination run:
//! - [`TimeOfDay`]: a classroom's exit time ("HH:MM"). Adjustments shift it
//!   by whole minutes and must wrap correctly across hour (and midnight)
//!   boundaries.
//! - [`EpisodeDate`]: a scheduling episode ("YYYY-MM-DD"). Episodes advance
//!   by a fixed interval (default 7 days); commitments fall due on exact
//!   date equality.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing schedule times or episode dates
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("invalid time of day '{0}': expected HH:MM")]
    InvalidTime(String),

    #[error("invalid episode date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// A wall-clock exit time with minute resolution.
///
/// # Example
/// ```
/// use exit_coordination_core::TimeOfDay;
///
/// let base: TimeOfDay = "12:58".parse().unwrap();
/// assert_eq!(base.shift_minutes(5).to_string(), "13:03");
/// assert_eq!(base.shift_minutes(-60).to_string(), "11:58");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Construct from hour and minute.
    ///
    /// Panics outside 0..24 / 0..60; intended for literal values in tests
    /// and built-in scenarios. Parsing is the production entry point.
    pub fn new(hour: u32, minute: u32) -> Self {
        Self(NaiveTime::from_hms_opt(hour, minute, 0).expect("valid hour/minute"))
    }

    /// Shift by a signed number of minutes, wrapping across midnight.
    pub fn shift_minutes(self, minutes: i64) -> Self {
        let (shifted, _wrapped_days) = self.0.overflowing_add_signed(Duration::minutes(minutes));
        Self(shifted)
    }

    /// Hour component (0-23)
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    /// Minute component (0-59)
    pub fn minute(self) -> u32 {
        self.0.minute()
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(TimeOfDay)
            .map_err(|_| TimeError::InvalidTime(s.to_string()))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> String {
        t.to_string()
    }
}

/// A scheduling episode date.
///
/// # Example
/// ```
/// use exit_coordination_core::EpisodeDate;
///
/// let ep: EpisodeDate = "2025-03-28".parse().unwrap();
/// assert_eq!(ep.advance_days(7).to_string(), "2025-04-04");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EpisodeDate(NaiveDate);

impl EpisodeDate {
    /// Construct from year/month/day.
    ///
    /// Panics on an invalid calendar date; intended for literal values in
    /// tests and drivers.
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self(NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date"))
    }

    /// The date a fixed number of days later (negative moves backward).
    pub fn advance_days(self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }
}

impl FromStr for EpisodeDate {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(EpisodeDate)
            .map_err(|_| TimeError::InvalidDate(s.to_string()))
    }
}

impl fmt::Display for EpisodeDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl TryFrom<String> for EpisodeDate {
    type Error = TimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EpisodeDate> for String {
    fn from(d: EpisodeDate) -> String {
        d.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_malformed_time() {
        assert_eq!(
            "12h30".parse::<TimeOfDay>(),
            Err(TimeError::InvalidTime("12h30".to_string()))
        );
    }

    #[test]
    fn test_reject_malformed_date() {
        assert!("2025-13-01".parse::<EpisodeDate>().is_err());
    }
}
