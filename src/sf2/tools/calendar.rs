//! Resolution of a school year and month into reportable school days.
//!
//! A school year such as `2025-2026` spans two calendar years: June to
//! December fall in the first year and January to May in the second. In
//! January, classes resume on the first Monday on or after the 4th, so the
//! days before it are not reportable.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::sf2::tools::error::{Result, ToolError};
use crate::sf2::tools::model::IsoDate;

const ISO_FORMAT: &str = "%Y-%m-%d";

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// First day of January from which school days may be reported.
const JANUARY_RESUMPTION_DAY: u32 = 4;

/// Options controlling how school days are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarOptions {
    /// Skip January days until the first Monday on or after the 4th.
    pub january_rollover: bool,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            january_rollover: true,
        }
    }
}

/// A validated school year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub start_year: i32,
    pub end_year: i32,
    /// Month number, 1 to 12.
    pub month: u32,
}

impl ReportPeriod {
    /// Parses a `YYYY` or `YYYY-YYYY` school year and a month given either
    /// by name or by number.
    pub fn parse(school_year: &str, month: &str) -> Result<Self> {
        let (start_year, end_year) = parse_school_year(school_year)?;
        let month = parse_month(month)?;
        Ok(Self {
            start_year,
            end_year,
            month,
        })
    }

    /// Calendar year the month falls in.
    pub fn target_year(&self) -> i32 {
        if (1..=5).contains(&self.month) {
            self.end_year
        } else {
            self.start_year
        }
    }

    /// Every reportable school day of the period, ascending.
    pub fn school_days(&self, options: &CalendarOptions) -> Result<Vec<NaiveDate>> {
        let year = self.target_year();
        let first = NaiveDate::from_ymd_opt(year, self.month, 1).ok_or_else(|| {
            ToolError::InvalidPeriod(format!("{year}-{:02} is out of range", self.month))
        })?;

        let apply_rollover = options.january_rollover && self.month == 1;
        let mut days = Vec::with_capacity(23);

        for date in first.iter_days().take_while(|date| date.month() == self.month) {
            if is_weekend(date.weekday()) {
                continue;
            }
            // Nothing is kept until the first Monday on or after the 4th.
            if apply_rollover
                && days.is_empty()
                && (date.day() < JANUARY_RESUMPTION_DAY || date.weekday() != Weekday::Mon)
            {
                continue;
            }
            days.push(date);
        }

        debug!(
            year,
            month = self.month,
            school_days = days.len(),
            "resolved school days"
        );
        Ok(days)
    }
}

/// Resolves the school days of a period using the default calendar.
pub fn resolve(school_year: &str, month: &str) -> Result<Vec<IsoDate>> {
    resolve_with(school_year, month, &CalendarOptions::default())
}

/// Resolves the school days of a period as ISO date strings.
pub fn resolve_with(
    school_year: &str,
    month: &str,
    options: &CalendarOptions,
) -> Result<Vec<IsoDate>> {
    let period = ReportPeriod::parse(school_year, month)?;
    let days = period.school_days(options)?;
    Ok(days.iter().map(format_iso_date).collect())
}

/// Parses a strict `YYYY-MM-DD` date. Surrounding whitespace is rejected,
/// since dates are also used verbatim as lookup keys.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate> {
    if raw.len() != 10 {
        return Err(ToolError::InvalidDate(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, ISO_FORMAT).map_err(|_| ToolError::InvalidDate(raw.to_string()))
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_iso_date(date: &NaiveDate) -> IsoDate {
    date.format(ISO_FORMAT).to_string()
}

/// Returns the English name of a month number, e.g. `February` for 2.
pub fn month_name(month: u32) -> Option<String> {
    let name = MONTH_NAMES.get(month.checked_sub(1)? as usize)?;
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_ascii_uppercase().to_string() + chars.as_str())
}

fn parse_school_year(raw: &str) -> Result<(i32, i32)> {
    let invalid = || ToolError::InvalidPeriod(format!("invalid school year '{raw}'"));
    let trimmed = raw.trim();

    match trimmed.split_once('-') {
        Some((start, end)) => {
            let start = parse_year(start).ok_or_else(invalid)?;
            let end = parse_year(end).ok_or_else(invalid)?;
            Ok((start, end))
        }
        None => {
            let start = parse_year(trimmed).ok_or_else(invalid)?;
            Ok((start, start + 1))
        }
    }
}

fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if raw.len() != 4 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn parse_month(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    if let Ok(number) = trimmed.parse::<u32>() {
        if (1..=12).contains(&number) {
            return Ok(number);
        }
        return Err(ToolError::InvalidPeriod(format!(
            "month {number} is not between 1 and 12"
        )));
    }

    let lowered = trimmed.to_lowercase();
    MONTH_NAMES
        .iter()
        .position(|name| *name == lowered || (lowered.len() == 3 && name.starts_with(&lowered)))
        .map(|index| index as u32 + 1)
        .ok_or_else(|| ToolError::InvalidPeriod(format!("unknown month '{raw}'")))
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}
