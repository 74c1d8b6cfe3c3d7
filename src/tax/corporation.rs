//! Corporation Tax for one accounting period
//!
//! Rates are set per financial year (1 April to 31 March). An accounting period that
//! does not start on 1 April straddles two financial years; when their rates differ
//! the profit is apportioned by the number of days falling into each one.
//!
//! ```text
//!   Before 1st of April:
//!                 ┌------------------------┐
//!                 |   accounting period    |
//!   +---------|---+-----+-------------|----+---+----->
//!            2019       ↑            2020      ↑
//!                   1st of April             1st of April
//!
//!   After 1st of April:
//!                          ┌----------------------┐
//!                          |   accounting period  |
//!   +---------|---------+--+----------|--------+--+---->
//!            2019       ↑            2020      ↑
//!                    1st of April            1st of April
//! ```

use super::error::TaxError;
use super::money::{round_pence, Money};
use super::period::add_months;
use super::uk::FinancialYear;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Corporation Tax main rate per financial year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RateTable {
    /// Rate as a fraction keyed by financial year label, e.g. {"2017-2018": 0.19}
    #[schemars(with = "BTreeMap<String, f64>")]
    rates: BTreeMap<FinancialYear, Decimal>,
}

impl RateTable {
    pub fn new() -> Self {
        RateTable {
            rates: BTreeMap::new(),
        }
    }

    /// Historical main rates, see https://www.gov.uk/corporation-tax-rates
    pub fn uk() -> Self {
        let mut table = RateTable::new();
        for year in 2015..=2016 {
            table.insert(FinancialYear(year), dec!(0.20));
        }
        for year in 2017..=2022 {
            table.insert(FinancialYear(year), dec!(0.19));
        }
        for year in 2023..=2025 {
            table.insert(FinancialYear(year), dec!(0.25));
        }
        table
    }

    pub fn insert(&mut self, year: FinancialYear, rate: Decimal) {
        self.rates.insert(year, rate);
    }

    pub fn rate(&self, year: FinancialYear) -> Result<Decimal, TaxError> {
        self.rates
            .get(&year)
            .copied()
            .ok_or_else(|| TaxError::MissingRateData {
                financial_year: year.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FinancialYear, &Decimal)> {
        self.rates.iter()
    }

    /// Financial years without a rate between the first and last configured ones
    pub fn gaps(&self) -> Vec<FinancialYear> {
        let (Some(first), Some(last)) = (self.rates.keys().next(), self.rates.keys().last())
        else {
            return Vec::new();
        };
        (first.0..=last.0)
            .map(FinancialYear)
            .filter(|year| !self.rates.contains_key(year))
            .collect()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        RateTable::uk()
    }
}

impl FromIterator<(FinancialYear, Decimal)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (FinancialYear, Decimal)>>(iter: I) -> Self {
        RateTable {
            rates: iter.into_iter().collect(),
        }
    }
}

/// Days of an accounting period on either side of the 1 April it straddles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodSplit {
    pub days_before: i64,
    pub rate_before: Decimal,
    pub days_after: i64,
    pub rate_after: Decimal,
}

impl PeriodSplit {
    /// For example, if the accounting period is 1 January 2017 to 31 December 2017:
    ///
    ///    1) financial year starting 1 April 2016 for 90 days (1 January 2017 to 31 March 2017)
    ///    2) financial year starting 1 April 2017 for 275 days (1 April 2017 to 31 December 2017)
    pub fn of(period_start: NaiveDate, rate_before: Decimal, rate_after: Decimal) -> Self {
        let (days_before, days_after) = split_days(period_start);
        PeriodSplit {
            days_before,
            rate_before,
            days_after,
            rate_after,
        }
    }

    /// 365 or 366
    pub fn total_days(&self) -> i64 {
        self.days_before + self.days_after
    }

    /// Tax on `profit`, each slice charged at its own rate
    pub fn apply(&self, profit: Money) -> Money {
        let total = Decimal::from(self.total_days());
        let before = profit * Decimal::from(self.days_before) / total * self.rate_before;
        let after = profit * Decimal::from(self.days_after) / total * self.rate_after;
        round_pence(before + after)
    }
}

/// Day counts either side of the first 1 April after `period_start`
pub fn split_days(period_start: NaiveDate) -> (i64, i64) {
    let (_, next) = straddled_years(period_start);
    let boundary = next.start_date();
    let anniversary = add_months(period_start, 12);
    (
        (boundary - period_start).num_days(),
        (anniversary - boundary).num_days(),
    )
}

/// The financial year containing `period_start` and the one opening at the next 1 April
pub fn straddled_years(period_start: NaiveDate) -> (FinancialYear, FinancialYear) {
    let current = FinancialYear::from_date(period_start);
    (current, current.next())
}

/// Corporation Tax owed for one accounting period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorporationTax {
    pub amount: Money,
    pub financial_years: Vec<FinancialYear>,
    /// Present only when the straddled years have different rates
    pub split: Option<PeriodSplit>,
}

/// Corporation Tax on a year's profit (revenue - expenses - pension - salary)
/// for the accounting period starting on `period_start`.
///
/// See https://www.gov.uk/corporation-tax-accounting-period
pub fn calculate_corporate_tax(
    profit: Money,
    period_start: NaiveDate,
    rates: &RateTable,
) -> Result<CorporationTax, TaxError> {
    // no tax on a loss
    let profit = profit.max(Decimal::ZERO);

    if FinancialYear::starts_on(period_start) {
        let year = FinancialYear::from_date(period_start);
        let rate = rates.rate(year)?;
        return Ok(CorporationTax {
            amount: round_pence(profit * rate),
            financial_years: vec![year],
            split: None,
        });
    }

    let (prev, next) = straddled_years(period_start);
    let rate_prev = rates.rate(prev)?;
    let rate_next = rates.rate(next)?;
    if rate_prev == rate_next {
        return Ok(CorporationTax {
            amount: round_pence(profit * rate_prev),
            financial_years: vec![prev, next],
            split: None,
        });
    }

    let split = PeriodSplit::of(period_start, rate_prev, rate_next);
    log::debug!(
        "Period from {} splits into {} days of {} at {} and {} days of {} at {}",
        period_start,
        split.days_before,
        prev,
        rate_prev,
        split.days_after,
        next,
        rate_next
    );

    Ok(CorporationTax {
        amount: split.apply(profit),
        financial_years: vec![prev, next],
        split: Some(split),
    })
}
