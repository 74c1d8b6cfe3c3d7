//! Director's loan account
//!
//! Money the director borrows from the company must be repaid within nine months
//! and a day of the accounting period's end, otherwise the company owes extra tax
//! (s455).

use super::money::Money;
use super::period::{add_days, add_months};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoanKind {
    Draw,
    Repayment,
}

/// A loan or loan repayment transaction from the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanEntry {
    pub date: NaiveDate,
    pub kind: LoanKind,
    pub amount: Money,
}

/// Balance still owed by the director.
///
/// A new draw starts tracking afresh rather than adding to an earlier loan; each
/// repayment is deducted from the loan being tracked. Entries on the same day keep
/// their ledger order.
pub fn outstanding_loan_balance(entries: &[LoanEntry]) -> Money {
    let mut ordered: Vec<&LoanEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.date);

    ordered
        .into_iter()
        .fold(Decimal::ZERO, |balance, entry| match entry.kind {
            LoanKind::Draw => entry.amount.abs(),
            LoanKind::Repayment => balance - entry.amount.abs(),
        })
}

/// One year, nine months and a day after the accounting period begins
pub fn loan_repayment_deadline(period_start: NaiveDate) -> NaiveDate {
    add_days(add_months(period_start, 21), 1)
}

/// Loan tracked for the current accounting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectorLoan {
    pub balance: Money,
    pub repayment_deadline: NaiveDate,
}

impl DirectorLoan {
    pub fn track(entries: &[LoanEntry], period_start: NaiveDate) -> Self {
        DirectorLoan {
            balance: outstanding_loan_balance(entries),
            repayment_deadline: loan_repayment_deadline(period_start),
        }
    }

    pub fn is_outstanding(&self) -> bool {
        self.balance > Decimal::ZERO
    }

    pub fn is_overdue(&self, now: NaiveDate) -> bool {
        self.is_outstanding() && now > self.repayment_deadline
    }
}
