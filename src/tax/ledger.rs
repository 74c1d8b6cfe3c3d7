//! Categorised bank transactions, read from a CSV statement export.

use super::loan::{LoanEntry, LoanKind};
use super::money::Money;
use super::period::DateRange;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to read ledger CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// What a transaction was for
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Category {
    /// Payment received from a client
    Income,
    /// Money moved out to the director (salary, dividends)
    Personal,
    /// Accountancy, advertising
    Legal,
    Travel,
    /// Rent
    Office,
    /// Computers, hosting
    Equipment,
    /// Heat, water, electricity
    Premises,
    /// Goods purchased for resale, subcontractors
    CostOfSales,
    Wages,
    Penalties,
    BankCharges,
    Pension,
    Hmrc,
    FixedAsset,
    /// Director borrowing from the company
    Loan,
    LoanRepayment,
    /// Not yet categorised
    #[default]
    #[serde(other)]
    Unknown,
}

impl Category {
    /// Categories that count as allowable expenses unless configured otherwise
    pub fn default_expenses() -> Vec<Category> {
        vec![
            Category::Legal,
            Category::Travel,
            Category::Office,
            Category::Equipment,
            Category::Premises,
            Category::FixedAsset,
        ]
    }
}

/// One row of the ledger CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LedgerRecord {
    /// Transaction date (YYYY-MM-DD)
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    /// Money paid into the company account
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub credit: Option<Decimal>,
    /// Money paid out of the company account
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub debit: Option<Decimal>,
    #[serde(default)]
    pub category: Category,
}

impl LedgerRecord {
    pub fn credit(&self) -> Money {
        self.credit.unwrap_or_default().abs()
    }

    pub fn debit(&self) -> Money {
        self.debit.unwrap_or_default().abs()
    }
}

/// Aggregated views of the ledger over a date range.
///
/// Every sum is a non-negative magnitude.
pub trait LedgerSource {
    /// Credits categorised as income
    fn revenue(&self, range: &DateRange) -> Money;

    /// Debits in any of the given categories
    fn expenses(&self, range: &DateRange, categories: &[Category]) -> Money;

    /// Pension contributions paid by the company
    fn pension(&self, range: &DateRange) -> Money {
        self.expenses(range, &[Category::Pension])
    }

    /// Money paid out to the director personally
    fn moved_out(&self, range: &DateRange) -> Money {
        self.expenses(range, &[Category::Personal])
    }

    /// Loan draws and repayments in ledger order
    fn loan_entries(&self, range: &DateRange) -> Vec<LoanEntry>;

    /// Records still waiting for a category
    fn unallocated(&self) -> Vec<&LedgerRecord>;

    /// Up to `count` records dated on or before `last`, newest first
    fn recent(&self, last: NaiveDate, count: usize) -> Vec<&LedgerRecord>;
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<LedgerRecord>,
}

impl Ledger {
    /// Records are kept ordered by date; same-day records keep their file order.
    pub fn new(mut records: Vec<LedgerRecord>) -> Self {
        records.sort_by_key(|r| r.date);
        Ledger { records }
    }

    pub fn read_csv<R: Read>(reader: R) -> Result<Self, LedgerError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let records = rdr
            .deserialize()
            .collect::<Result<Vec<LedgerRecord>, _>>()?;
        log::info!("Read {} ledger records", records.len());
        Ok(Ledger::new(records))
    }

    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    fn within<'a>(&'a self, range: &'a DateRange) -> impl Iterator<Item = &'a LedgerRecord> {
        self.records.iter().filter(move |r| range.contains(r.date))
    }
}

impl LedgerSource for Ledger {
    fn revenue(&self, range: &DateRange) -> Money {
        self.within(range)
            .filter(|r| r.category == Category::Income)
            .map(LedgerRecord::credit)
            .sum()
    }

    fn expenses(&self, range: &DateRange, categories: &[Category]) -> Money {
        self.within(range)
            .filter(|r| categories.contains(&r.category))
            .map(LedgerRecord::debit)
            .sum()
    }

    fn loan_entries(&self, range: &DateRange) -> Vec<LoanEntry> {
        self.within(range)
            .filter_map(|r| {
                let (kind, amount) = match r.category {
                    Category::Loan => (LoanKind::Draw, r.debit().max(r.credit())),
                    Category::LoanRepayment => (LoanKind::Repayment, r.credit().max(r.debit())),
                    _ => return None,
                };
                Some(LoanEntry {
                    date: r.date,
                    kind,
                    amount,
                })
            })
            .collect()
    }

    fn unallocated(&self) -> Vec<&LedgerRecord> {
        self.records
            .iter()
            .filter(|r| r.category == Category::Unknown)
            .collect()
    }

    fn recent(&self, last: NaiveDate, count: usize) -> Vec<&LedgerRecord> {
        self.records
            .iter()
            .rev()
            .filter(|r| r.date <= last)
            .take(count)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const CSV: &str = "\
date,description,credit,debit,category
2019-05-01,Invoice 12,5000.00,,Income
2019-04-02,Laptop,,1200.00,Equipment
2019-04-30,Train,,45.50,Travel
2019-05-01,Director loan,,800.00,Loan
2019-06-01,Loan repaid,300.00,,LoanRepayment
2019-06-15,Dividend,,2000.00,Personal
2019-06-20,Pension,,500.00,Pension
2019-07-01,Mystery,,12.00,
2019-07-02,Coffee,,3.20,Snacks
2020-04-01,Invoice 13,7000.00,,Income
";

    fn ledger() -> Ledger {
        Ledger::read_csv(CSV.as_bytes()).unwrap()
    }

    fn period() -> DateRange {
        DateRange::new(date(2019, 4, 1), date(2020, 4, 1)).unwrap()
    }

    #[test]
    fn records_sorted_by_date() {
        let ledger = ledger();
        let dates: Vec<_> = ledger.records().iter().map(|r| r.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(ledger.records()[0].description, "Laptop");
    }

    #[test]
    fn same_day_records_keep_file_order() {
        let ledger = ledger();
        let may_first: Vec<_> = ledger
            .records()
            .iter()
            .filter(|r| r.date == date(2019, 5, 1))
            .map(|r| r.description.as_str())
            .collect();
        assert_eq!(may_first, vec!["Invoice 12", "Director loan"]);
    }

    #[test]
    fn sums_over_half_open_range() {
        let ledger = ledger();
        let period = period();
        // the 2020-04-01 invoice belongs to the next period
        assert_eq!(ledger.revenue(&period), dec!(5000));
        assert_eq!(
            ledger.expenses(&period, &Category::default_expenses()),
            dec!(1245.50)
        );
        assert_eq!(ledger.pension(&period), dec!(500));
        assert_eq!(ledger.moved_out(&period), dec!(2000));
    }

    #[test]
    fn empty_range_sums_to_zero() {
        let ledger = ledger();
        let range = DateRange::new(date(2010, 1, 1), date(2011, 1, 1)).unwrap();
        assert_eq!(ledger.revenue(&range), Decimal::ZERO);
        assert!(ledger.loan_entries(&range).is_empty());
    }

    #[test]
    fn loan_entries_in_order() {
        let entries = ledger().loan_entries(&period());
        assert_eq!(
            entries,
            vec![
                LoanEntry {
                    date: date(2019, 5, 1),
                    kind: LoanKind::Draw,
                    amount: dec!(800),
                },
                LoanEntry {
                    date: date(2019, 6, 1),
                    kind: LoanKind::Repayment,
                    amount: dec!(300),
                },
            ]
        );
    }

    #[test]
    fn blank_and_unrecognised_categories_are_unallocated() {
        let ledger = ledger();
        let unallocated: Vec<_> = ledger
            .unallocated()
            .iter()
            .map(|r| r.description.as_str())
            .collect();
        assert_eq!(unallocated, vec!["Mystery", "Coffee"]);
    }

    #[test]
    fn recent_records_newest_first() {
        let ledger = ledger();
        let recent: Vec<_> = ledger
            .recent(date(2019, 7, 1), 3)
            .iter()
            .map(|r| r.description.as_str())
            .collect();
        assert_eq!(recent, vec!["Mystery", "Pension", "Dividend"]);

        assert_eq!(ledger.recent(date(2030, 1, 1), 100).len(), 10);
        assert!(ledger.recent(date(2019, 4, 1), 5).is_empty());
        assert!(ledger.recent(date(2030, 1, 1), 0).is_empty());
    }

    #[test]
    fn malformed_row_is_an_error() {
        let csv = "date,description,credit,debit,category\nyesterday,x,1,,Income\n";
        assert!(Ledger::read_csv(csv.as_bytes()).is_err());
    }
}
