use super::error::TaxError;
use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// UK Tax Year (runs 6 April to 5 April)
/// The year value represents the end year (e.g., 2020 = 2019/20 tax year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxYear(pub i32);

impl TaxYear {
    /// Create a tax year from a date
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        // 6 April or later belongs to the tax year ending next April
        if (date.month(), date.day()) >= (4, 6) {
            TaxYear(year + 1)
        } else {
            TaxYear(year)
        }
    }

    /// Start date of the tax year (6 April of previous year)
    pub fn start_date(&self) -> NaiveDate {
        ymd_or_max(self.0.saturating_sub(1), 4, 6)
    }

    /// End date of the tax year (5 April)
    pub fn end_date(&self) -> NaiveDate {
        ymd_or_max(self.0, 4, 5)
    }

    /// Self Assessment balancing payment: 31 January after the tax year ends
    pub fn payment_deadline(&self) -> NaiveDate {
        ymd_or_max(self.0.saturating_add(1), 1, 31)
    }

    /// Display as "2019/20" format
    pub fn display(&self) -> String {
        format!("{}/{:02}", self.0.saturating_sub(1), self.0 % 100)
    }
}

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Dates past the end of the calendar saturate, like `add_days`
fn ymd_or_max(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

impl Serialize for TaxYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// UK Financial Year for Corporation Tax (runs 1 April to 31 March)
/// The year value is the year containing the 1 April that opens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FinancialYear(pub i32);

impl FinancialYear {
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        if date >= Self::first_day_in(year) {
            FinancialYear(year)
        } else {
            FinancialYear(year - 1)
        }
    }

    /// 1 April of the given calendar year
    pub fn first_day_in(year: i32) -> NaiveDate {
        ymd_or_max(year, 4, 1)
    }

    pub fn start_date(&self) -> NaiveDate {
        Self::first_day_in(self.0)
    }

    /// Last day (31 March)
    pub fn end_date(&self) -> NaiveDate {
        ymd_or_max(self.0.saturating_add(1), 3, 31)
    }

    pub fn next(&self) -> Self {
        FinancialYear(self.0.saturating_add(1))
    }

    /// True when the date is exactly 1 April
    pub fn starts_on(date: NaiveDate) -> bool {
        date.month() == 4 && date.day() == 1
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.0.saturating_add(1))
    }
}

impl FromStr for FinancialYear {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TaxError::InvalidConfiguration(format!("invalid financial year '{s}'"));
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start: i32 = start.trim().parse().map_err(|_| invalid())?;
        let end: i32 = end.trim().parse().map_err(|_| invalid())?;
        if start.checked_add(1) != Some(end) {
            return Err(invalid());
        }
        Ok(FinancialYear(start))
    }
}

impl Serialize for FinancialYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FinancialYear {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(de::Error::custom)
    }
}
