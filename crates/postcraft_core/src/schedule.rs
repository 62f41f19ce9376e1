//! crates/postcraft_core/src/schedule.rs
//!
//! Monday/Wednesday/Friday schedule dates: generation and validation.
//!
//! All arithmetic works on `NaiveDate` (plain year, month and day). Instants with
//! a timezone never enter this module, so daylight-saving and UTC offsets cannot
//! shift a date by one.

use chrono::{Datelike, Days, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::{GeneratedPrompt, NewPrompt};

/// The canonical date key pattern, `YYYY-MM-DD`.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// A caller passed an argument outside the function's contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Malformed date: {0}")]
    MalformedDate(String),
}

//=========================================================================================
// Date Keys
//=========================================================================================

/// Renders a date in the canonical `YYYY-MM-DD` form.
///
/// Every date key in the system (prompt dates, post grouping, calendar keys) goes
/// through this function.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Strictly parses a `YYYY-MM-DD` key into a calendar date.
///
/// The string must be exactly four digits, a dash, two digits, a dash and two
/// digits, and must name a real date (`2024-02-30` is rejected).
pub fn parse_date_key(date: &str) -> Result<NaiveDate, ScheduleError> {
    let bytes = date.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(ScheduleError::MalformedDate(format!(
            "'{}' is not in YYYY-MM-DD format",
            date
        )));
    }

    let invalid = || ScheduleError::MalformedDate(format!("'{}' is not a real calendar date", date));
    let year: i32 = date[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = date[5..7].parse().map_err(|_| invalid())?;
    let day: u32 = date[8..10].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn is_schedule_weekday(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Mon | Weekday::Wed | Weekday::Fri)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

//=========================================================================================
// ScheduleDate
//=========================================================================================

/// A calendar date that falls on a Monday, Wednesday or Friday.
///
/// Serializes as its canonical `YYYY-MM-DD` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleDate(NaiveDate);

impl ScheduleDate {
    pub fn new(date: NaiveDate) -> Result<Self, ScheduleError> {
        if is_schedule_weekday(date.weekday()) {
            Ok(Self(date))
        } else {
            Err(ScheduleError::MalformedDate(format!(
                "{} falls on a {}; schedule dates must be a Monday, Wednesday or Friday",
                date_key(date),
                date.format("%A")
            )))
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn key(&self) -> String {
        date_key(self.0)
    }

    /// The next date in the cycle: Monday and Wednesday step two days, Friday
    /// steps three days to the following Monday. `None` past the last
    /// representable date.
    pub fn succ(&self) -> Option<Self> {
        let step = match self.0.weekday() {
            Weekday::Fri => 3,
            _ => 2,
        };
        self.0.checked_add_days(Days::new(step)).map(Self)
    }
}

impl fmt::Display for ScheduleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for ScheduleDate {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_date_key(s).and_then(ScheduleDate::new)
    }
}

impl TryFrom<String> for ScheduleDate {
    type Error = ScheduleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScheduleDate> for String {
    fn from(value: ScheduleDate) -> Self {
        value.key()
    }
}

impl From<ScheduleDate> for NaiveDate {
    fn from(value: ScheduleDate) -> Self {
        value.0
    }
}

//=========================================================================================
// Generation
//=========================================================================================

/// Returns `from` (today when `None`) if it is a Monday, Wednesday or Friday,
/// otherwise the first such date after it.
pub fn next_schedule_date(from: Option<NaiveDate>) -> Result<ScheduleDate, ScheduleError> {
    let from = from.unwrap_or_else(today);
    from.iter_days()
        .take(7)
        .find(|date| is_schedule_weekday(date.weekday()))
        .map(ScheduleDate)
        .ok_or_else(|| {
            ScheduleError::InvalidArgument(format!(
                "no Monday, Wednesday or Friday on or after {}",
                from
            ))
        })
}

fn schedule_from(
    start: Option<NaiveDate>,
) -> Result<impl Iterator<Item = ScheduleDate>, ScheduleError> {
    let first = next_schedule_date(start)?;
    Ok(std::iter::successors(Some(first), ScheduleDate::succ))
}

fn run_out(count: usize, fitted: usize) -> ScheduleError {
    ScheduleError::InvalidArgument(format!(
        "only {} of {} schedule dates fit before the last representable date",
        fitted, count
    ))
}

/// Returns exactly `count` strictly increasing schedule dates, beginning at
/// `next_schedule_date(start)`.
pub fn generate_schedule(
    count: i64,
    start: Option<NaiveDate>,
) -> Result<Vec<ScheduleDate>, ScheduleError> {
    let count = usize::try_from(count).map_err(|_| {
        ScheduleError::InvalidArgument(format!(
            "schedule count must be a non-negative integer, got {}",
            count
        ))
    })?;
    if count == 0 {
        return Ok(Vec::new());
    }
    let dates: Vec<ScheduleDate> = schedule_from(start)?.take(count).collect();
    if dates.len() < count {
        return Err(run_out(count, dates.len()));
    }
    Ok(dates)
}

/// Converts a JSON number into a schedule count, rejecting fractions,
/// negatives and non-finite values.
pub fn schedule_count_from_f64(value: f64) -> Result<i64, ScheduleError> {
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value >= i64::MAX as f64 {
        return Err(ScheduleError::InvalidArgument(format!(
            "schedule count must be a non-negative integer, got {}",
            value
        )));
    }
    Ok(value as i64)
}

/// Stamps each generated prompt with consecutive schedule dates.
pub fn assign_schedule(
    prompts: Vec<GeneratedPrompt>,
    start: Option<NaiveDate>,
) -> Result<Vec<NewPrompt>, ScheduleError> {
    let count = prompts.len();
    if count == 0 {
        return Ok(Vec::new());
    }
    let stamped: Vec<NewPrompt> = prompts
        .into_iter()
        .zip(schedule_from(start)?)
        .map(|(prompt, scheduled_date)| NewPrompt {
            prompt,
            scheduled_date,
        })
        .collect();
    if stamped.len() < count {
        return Err(run_out(count, stamped.len()));
    }
    Ok(stamped)
}

//=========================================================================================
// Validation
//=========================================================================================

/// Outcome of validating a user-supplied schedule date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Validation {
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// True iff `date` is a well-formed key naming a Monday, Wednesday or Friday.
pub fn is_valid_schedule_date(date: &str) -> bool {
    date.parse::<ScheduleDate>().is_ok()
}

/// Validates a date coming from outside the core, explaining any rejection.
pub fn validate(date: &str) -> Validation {
    match date.parse::<ScheduleDate>() {
        Ok(_) => Validation::ok(),
        Err(ScheduleError::MalformedDate(reason)) | Err(ScheduleError::InvalidArgument(reason)) => {
            Validation::invalid(reason)
        }
    }
}
