//! Five-field cron expressions
//!
//! `minute hour day-of-month month day-of-week`, with `*`, lists, ranges,
//! steps and three-letter month/weekday names. Day-of-week accepts both 0 and
//! 7 for Sunday. When both day fields are restricted a time matches if either
//! one does, as in classic cron.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use time::{Date, Duration, Month, OffsetDateTime, Time};

/// Error parsing a cron expression
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CronError {
    #[error("Expected 5 fields, found {0}")]
    FieldCount(usize),
    #[error("Invalid {field} value '{value}'")]
    InvalidValue { field: &'static str, value: String },
    #[error("{field} value {value} out of range {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
}

const MINUTE: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    names: &[],
};
const HOUR: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    names: &[],
};
const DAY_OF_MONTH: FieldSpec = FieldSpec {
    name: "day-of-month",
    min: 1,
    max: 31,
    names: &[],
};
const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    names: &[
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ],
};
// 7 is folded onto 0 after parsing
const DAY_OF_WEEK: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 0,
    max: 7,
    names: &["sun", "mon", "tue", "wed", "thu", "fri", "sat"],
};

/// Searching further than this without a match means the expression can never fire
const SEARCH_LIMIT_DAYS: i64 = 366 * 5;

/// A parsed cron expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    source: String,
    minutes: BTreeSet<u32>,
    hours: BTreeSet<u32>,
    days_of_month: BTreeSet<u32>,
    months: BTreeSet<u32>,
    days_of_week: BTreeSet<u32>,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronSchedule {
    pub fn parse(expression: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::FieldCount(fields.len()));
        }

        let minutes = parse_field(fields[0], MINUTE)?;
        let hours = parse_field(fields[1], HOUR)?;
        let days_of_month = parse_field(fields[2], DAY_OF_MONTH)?;
        let months = parse_field(fields[3], MONTH)?;
        let days_of_week = parse_field(fields[4], DAY_OF_WEEK)?
            .into_iter()
            .map(|d| d % 7)
            .collect();

        Ok(Self {
            source: fields.join(" "),
            minutes,
            hours,
            days_of_month,
            months,
            days_of_week,
            dom_restricted: !fields[2].starts_with('*'),
            dow_restricted: !fields[4].starts_with('*'),
        })
    }

    /// First matching minute strictly after `after`, in the same offset
    pub fn next_after(&self, after: OffsetDateTime) -> Option<OffsetDateTime> {
        let start = after.replace_time(Time::from_hms(after.hour(), after.minute(), 0).ok()?)
            + Duration::minutes(1);
        let limit = start + Duration::days(SEARCH_LIMIT_DAYS);
        let mut candidate = start;

        while candidate < limit {
            if !self.months.contains(&(u8::from(candidate.month()) as u32)) {
                candidate = start_of_next_month(candidate)?;
                continue;
            }
            if !self.day_matches(candidate.date()) {
                candidate = start_of_day(candidate, candidate.date().next_day()?);
                continue;
            }
            if !self.hours.contains(&(candidate.hour() as u32)) {
                candidate = candidate.replace_time(Time::from_hms(candidate.hour(), 0, 0).ok()?)
                    + Duration::hours(1);
                continue;
            }
            if !self.minutes.contains(&(candidate.minute() as u32)) {
                candidate += Duration::minutes(1);
                continue;
            }
            return Some(candidate);
        }

        None
    }

    fn day_matches(&self, date: Date) -> bool {
        let dom = self.days_of_month.contains(&(date.day() as u32));
        let dow = self
            .days_of_week
            .contains(&(date.weekday().number_days_from_sunday() as u32));

        match (self.dom_restricted, self.dow_restricted) {
            (true, true) => dom || dow,
            (true, false) => dom,
            (false, true) => dow,
            (false, false) => true,
        }
    }
}

impl FromStr for CronSchedule {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn start_of_day(at: OffsetDateTime, date: Date) -> OffsetDateTime {
    at.replace_date(date).replace_time(Time::MIDNIGHT)
}

fn start_of_next_month(at: OffsetDateTime) -> Option<OffsetDateTime> {
    let year = if at.month() == Month::December {
        at.year() + 1
    } else {
        at.year()
    };
    let first = Date::from_calendar_date(year, at.month().next(), 1).ok()?;
    Some(start_of_day(at, first))
}

fn parse_field(raw: &str, spec: FieldSpec) -> Result<BTreeSet<u32>, CronError> {
    let mut values = BTreeSet::new();

    for part in raw.split(',') {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => {
                let step = step
                    .parse::<u32>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| invalid(spec, part))?;
                (range, step)
            }
            None => (part, 1),
        };

        let (start, end) = if range == "*" {
            (spec.min, spec.max)
        } else if let Some((lo, hi)) = range.split_once('-') {
            (parse_value(lo, spec)?, parse_value(hi, spec)?)
        } else {
            let value = parse_value(range, spec)?;
            // `5/15` means every 15 starting at 5
            if part.contains('/') {
                (value, spec.max)
            } else {
                (value, value)
            }
        };

        if start > end {
            return Err(invalid(spec, part));
        }

        values.extend((start..=end).step_by(step as usize));
    }

    Ok(values)
}

fn parse_value(raw: &str, spec: FieldSpec) -> Result<u32, CronError> {
    let lowered = raw.to_ascii_lowercase();
    let value = match spec.names.iter().position(|name| *name == lowered) {
        // Names are listed from the field minimum: months from 1, weekdays from 0
        Some(index) => index as u32 + spec.min,
        None => raw.parse::<u32>().map_err(|_| invalid(spec, raw))?,
    };

    if value < spec.min || value > spec.max {
        return Err(CronError::OutOfRange {
            field: spec.name,
            value,
            min: spec.min,
            max: spec.max,
        });
    }

    Ok(value)
}

fn invalid(spec: FieldSpec, value: &str) -> CronError {
    CronError::InvalidValue {
        field: spec.name,
        value: value.to_string(),
    }
}
