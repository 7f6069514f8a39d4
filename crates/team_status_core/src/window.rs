//! Reporting window types
//!
//! A reporting window is the Wednesday-to-Tuesday week a status report covers.
//! It is identified by its start date (the Wednesday, which is the *later*
//! calendar date) and its end date (the Tuesday seven days earlier).

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::WindowError;

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;

/// Format used for every date that crosses the crate boundary.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of days between the start and end of a default window.
pub const WINDOW_LENGTH_DAYS: i64 = 7;

/// Validated reporting window.
///
/// Windows are immutable once constructed and uniquely identify a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportingWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ReportingWindow {
    /// Derive a window from optional caller-supplied dates.
    ///
    /// # Rules
    /// - A supplied `start` must parse as `YYYY-MM-DD` and fall on a Wednesday.
    ///   When absent, `today` is used as is.
    /// - A supplied `end` must parse and fall on a Tuesday. When absent it is
    ///   `start - 7 days`.
    /// - When both dates are supplied their spacing is not checked, so wider
    ///   custom windows are accepted.
    ///
    /// # Errors
    /// Returns `WindowError` naming the offending field and, for weekday
    /// mismatches, the actual weekday of the supplied date.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, WindowError> {
        let start = match start {
            Some(value) => {
                let date = parse_date("start_date", value)?;
                require_weekday("start_date", date, Weekday::Wed)?;
                date
            }
            None => today,
        };

        let end = match end {
            Some(value) => {
                let date = parse_date("end_date", value)?;
                require_weekday("end_date", date, Weekday::Tue)?;
                date
            }
            None => start
                .checked_sub_signed(Duration::days(WINDOW_LENGTH_DAYS))
                .ok_or_else(|| WindowError::OutOfRange {
                    field: "start_date".to_string(),
                    date: start.format(DATE_FORMAT).to_string(),
                })?,
        };

        Ok(Self { start, end })
    }

    /// The later date of the window.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The earlier date of the window.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Start date rendered as `YYYY-MM-DD`.
    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// End date rendered as `YYYY-MM-DD`.
    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl std::fmt::Display for ReportingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start_str(), self.end_str())
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, WindowError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        WindowError::UnparsableDate {
            field: field.to_string(),
            value: value.to_string(),
        }
    })
}

fn require_weekday(field: &str, date: NaiveDate, expected: Weekday) -> Result<(), WindowError> {
    if date.weekday() == expected {
        return Ok(());
    }

    Err(WindowError::WrongWeekday {
        field: field.to_string(),
        date: date.format(DATE_FORMAT).to_string(),
        expected: weekday_name(expected).to_string(),
        actual: weekday_name(date.weekday()).to_string(),
    })
}

/// Full English weekday name, e.g. `Wednesday`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
