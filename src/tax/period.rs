//! Accounting periods and date ranges
//!
//! A company picks its own 12-month accounting period, configured as a day and
//! month ("anchor"). Everything here works on `NaiveDate`, so no time-of-day or
//! daylight-saving shift can leak into day counting.

use super::error::TaxError;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Day and month on which every accounting period of the company begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodAnchor {
    day: u32,
    month: u32,
}

impl PeriodAnchor {
    pub fn new(day: u32, month: u32) -> Result<Self, TaxError> {
        if !(1..=12).contains(&month) {
            return Err(TaxError::InvalidConfiguration(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if !(1..=31).contains(&day) {
            return Err(TaxError::InvalidConfiguration(format!(
                "day must be between 1 and 31, got {day}"
            )));
        }
        Ok(PeriodAnchor { day, month })
    }

    /// The anchor in a given year. A day the month does not have (31-04, 30-02,
    /// 29-02 outside leap years) falls on the last day of that month.
    pub fn date_in(&self, year: i32) -> Result<NaiveDate, TaxError> {
        (1..=self.day)
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(year, self.month, day))
            .ok_or_else(|| TaxError::InvalidConfiguration(format!("{self} in {year}")))
    }
}

impl Default for PeriodAnchor {
    /// Accounting period matching the financial year
    fn default() -> Self {
        PeriodAnchor { day: 1, month: 4 }
    }
}

impl fmt::Display for PeriodAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.day, self.month)
    }
}

impl FromStr for PeriodAnchor {
    type Err = TaxError;

    /// Parses "DD-MM", e.g. "01-11" for 1st of November
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b'-'
            && bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit);
        if !well_formed {
            return Err(TaxError::InvalidAnchorFormat(s.to_string()));
        }
        let day = s[..2].parse().map_err(|_| TaxError::InvalidAnchorFormat(s.to_string()))?;
        let month = s[3..].parse().map_err(|_| TaxError::InvalidAnchorFormat(s.to_string()))?;
        PeriodAnchor::new(day, month)
    }
}

/// Start date of the accounting period that is running on `now`.
pub fn resolve_current_period_start(
    anchor: &PeriodAnchor,
    now: NaiveDate,
) -> Result<NaiveDate, TaxError> {
    let this_year = anchor.date_in(now.year())?;
    // the period begins today
    if now == this_year {
        return Ok(now);
    }

    // only the month decides, so an anchor later in the current month is this year's
    if anchor.month > now.month() {
        anchor.date_in(now.year() - 1)
    } else {
        Ok(this_year)
    }
}

/// Adds calendar months, clamping to the end of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Half-open range of dates `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TaxError> {
        if end <= start {
            return Err(TaxError::DegenerateInput { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// From `start` up to and including `last`
    pub fn through(start: NaiveDate, last: NaiveDate) -> Result<Self, TaxError> {
        DateRange::new(start, add_days(last, 1))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// One 12-month accounting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountingPeriod {
    pub start: NaiveDate,
    /// First day of the following period
    pub end: NaiveDate,
    #[serde(skip)]
    anchor: PeriodAnchor,
}

impl AccountingPeriod {
    /// The period whose start falls in `year`. Both ends are resolved from the
    /// anchor, so a clamped 28 February start does not drift off 29 February.
    pub fn in_year(anchor: &PeriodAnchor, year: i32) -> Result<Self, TaxError> {
        Ok(AccountingPeriod {
            start: anchor.date_in(year)?,
            end: anchor.date_in(year + 1)?,
            anchor: *anchor,
        })
    }

    pub fn current(anchor: &PeriodAnchor, now: NaiveDate) -> Result<Self, TaxError> {
        let start = resolve_current_period_start(anchor, now)?;
        AccountingPeriod::in_year(anchor, start.year())
    }

    pub fn previous(&self) -> Result<Self, TaxError> {
        AccountingPeriod::in_year(&self.anchor, self.start.year() - 1)
    }

    pub fn range(&self) -> Result<DateRange, TaxError> {
        DateRange::new(self.start, self.end)
    }

    /// Last day inside the period
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.end)
    }

    /// Corporation Tax is due nine months and one day after the last day of the period
    pub fn payment_deadline(&self) -> NaiveDate {
        add_days(add_months(self.last_day(), 9), 1)
    }
}
