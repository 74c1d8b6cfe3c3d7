use super::self_assessment::Band;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Things on the dashboard that need the director's attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Warning {
    /// No Corporation Tax rate is configured for a financial year, so the figure
    /// for that period could not be estimated.
    MissingRateData { financial_year: String },
    /// Income is close to the top of its Self Assessment band.
    ApproachingThreshold { band: Band, remaining: Decimal },
    /// The director still owes money to the company.
    OutstandingDirectorLoan {
        balance: Decimal,
        repayment_deadline: NaiveDate,
    },
    /// The loan repayment deadline has passed with money still owed.
    DirectorLoanOverdue {
        balance: Decimal,
        repayment_deadline: NaiveDate,
    },
    /// Ledger records without a category are left out of every total.
    UnallocatedTransactions { count: usize },
}

impl Warning {
    pub fn message(&self) -> String {
        match self {
            Warning::MissingRateData { financial_year } => format!(
                "No Corporation Tax rate configured for {financial_year}"
            ),
            Warning::ApproachingThreshold { band, remaining } if remaining.is_zero() => {
                format!("Income is taxed in the {band} band")
            }
            Warning::ApproachingThreshold { band, remaining } => format!(
                "£{remaining:.2} left before income leaves the {band} band"
            ),
            Warning::OutstandingDirectorLoan {
                balance,
                repayment_deadline,
            } => format!("Director owes £{balance:.2}, repay by {repayment_deadline}"),
            Warning::DirectorLoanOverdue {
                balance,
                repayment_deadline,
            } => format!("Director loan of £{balance:.2} was due by {repayment_deadline}"),
            Warning::UnallocatedTransactions { count } => {
                format!("{count} transaction(s) have no category")
            }
        }
    }
}
