//! Collects every tax figure for the dashboard from the ledger.

use super::config::Config;
use super::corporation::{calculate_corporate_tax, CorporationTax};
use super::error::TaxError;
use super::ledger::{LedgerRecord, LedgerSource};
use super::loan::{DirectorLoan, LoanKind};
use super::money::Money;
use super::period::{add_days, add_months, AccountingPeriod, DateRange, PeriodAnchor};
use super::self_assessment::{
    calculate_self_assessment_tax, how_much_before_next_threshold, tax_year_dates,
    SelfAssessment, TaxYearDates, ThresholdProximity,
};
use super::vat::{
    beginning_of_previous_period, estimate_vat, next_return_date, VatRegistration, VatReturn,
};
use super::warnings::Warning;
use chrono::NaiveDate;
use serde::Serialize;

/// What the dashboard is computed for
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Day and month the company's accounting period starts
    pub anchor: PeriodAnchor,
    /// Unset when the company is not VAT registered
    pub vat: Option<VatRegistration>,
    pub config: Config,
    /// How many of the latest transactions to list
    pub recent: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorporationTaxSummary {
    pub period: AccountingPeriod,
    pub revenue: Money,
    pub expenses: Money,
    pub pension: Money,
    pub profit: Money,
    /// None when a rate is missing for one of the financial years
    pub tax: Option<CorporationTax>,
    pub payment_deadline: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelfAssessmentSummary {
    pub dates: TaxYearDates,
    pub moved_out: Money,
    pub assessment: SelfAssessment,
    pub threshold: ThresholdProximity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VatSummary {
    pub next_return: VatReturn,
    pub quarter_start: NaiveDate,
    pub revenue: Money,
    pub expenses: Money,
    pub estimate: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub current_period: CorporationTaxSummary,
    pub previous_period: CorporationTaxSummary,
    pub self_assessment: SelfAssessmentSummary,
    pub vat: Option<VatSummary>,
    pub director_loan: DirectorLoan,
    pub warnings: Vec<Warning>,
    /// Newest first, nothing dated after `today`
    pub recent_transactions: Vec<LedgerRecord>,
}

/// Build the dashboard as it stands on `today`.
///
/// A missing Corporation Tax rate leaves that period without a tax figure and adds
/// a warning; any other engine error is returned.
pub fn assemble<L: LedgerSource>(
    ledger: &L,
    settings: &Settings,
    today: NaiveDate,
) -> Result<Dashboard, TaxError> {
    let mut warnings = Vec::new();
    let config = &settings.config;

    let current = AccountingPeriod::current(&settings.anchor, today)?;
    let previous = current.previous()?;
    // an anchor later in this month starts the period after today
    let so_far = if today < current.start {
        None
    } else {
        Some(DateRange::through(current.start, today)?)
    };
    log::debug!(
        "Current accounting period {} to {}, {} day(s) so far",
        current.start,
        current.last_day(),
        so_far.map_or(0, |range| range.days())
    );

    let current_period = corporation_tax_summary(ledger, config, current, so_far, &mut warnings)?;
    let previous_period = corporation_tax_summary(
        ledger,
        config,
        previous,
        Some(previous.range()?),
        &mut warnings,
    )?;

    let self_assessment = self_assessment_summary(ledger, config, today)?;
    if self_assessment.threshold.is_warning {
        warnings.push(Warning::ApproachingThreshold {
            band: self_assessment.threshold.band,
            remaining: self_assessment.threshold.remaining,
        });
    }

    let vat = settings
        .vat
        .map(|registration| vat_summary(ledger, config, registration, today))
        .transpose()?;

    let director_loan = director_loan(ledger, &settings.anchor, today)?;
    if director_loan.is_overdue(today) {
        warnings.push(Warning::DirectorLoanOverdue {
            balance: director_loan.balance,
            repayment_deadline: director_loan.repayment_deadline,
        });
    } else if director_loan.is_outstanding() {
        warnings.push(Warning::OutstandingDirectorLoan {
            balance: director_loan.balance,
            repayment_deadline: director_loan.repayment_deadline,
        });
    }

    let unallocated = ledger.unallocated().len();
    if unallocated > 0 {
        warnings.push(Warning::UnallocatedTransactions { count: unallocated });
    }

    let recent_transactions = ledger
        .recent(today, settings.recent)
        .into_iter()
        .cloned()
        .collect();

    Ok(Dashboard {
        today,
        current_period,
        previous_period,
        self_assessment,
        vat,
        director_loan,
        warnings,
        recent_transactions,
    })
}

fn corporation_tax_summary<L: LedgerSource>(
    ledger: &L,
    config: &Config,
    period: AccountingPeriod,
    range: Option<DateRange>,
    warnings: &mut Vec<Warning>,
) -> Result<CorporationTaxSummary, TaxError> {
    let (revenue, expenses, pension) = match range {
        Some(range) => (
            ledger.revenue(&range),
            ledger.expenses(&range, &config.expense_categories),
            ledger.pension(&range),
        ),
        None => (Money::ZERO, Money::ZERO, Money::ZERO),
    };
    let profit = revenue - expenses - pension;

    let tax = match calculate_corporate_tax(profit, period.start, &config.corporation_tax_rates) {
        Ok(tax) => Some(tax),
        Err(TaxError::MissingRateData { financial_year }) => {
            log::warn!(
                "No corporation tax for period starting {}: missing rate for {}",
                period.start,
                financial_year
            );
            let warning = Warning::MissingRateData { financial_year };
            if !warnings.contains(&warning) {
                warnings.push(warning);
            }
            None
        }
        Err(e) => return Err(e),
    };

    Ok(CorporationTaxSummary {
        period,
        revenue,
        expenses,
        pension,
        profit,
        tax,
        payment_deadline: period.payment_deadline(),
    })
}

/// The director's personal tax on money moved out of the company this tax year
fn self_assessment_summary<L: LedgerSource>(
    ledger: &L,
    config: &Config,
    today: NaiveDate,
) -> Result<SelfAssessmentSummary, TaxError> {
    let dates = tax_year_dates(today);
    let moved_out = ledger.moved_out(&DateRange::through(dates.start, today)?);
    let assessment =
        calculate_self_assessment_tax(moved_out, Money::ZERO, &config.self_assessment);
    let threshold = how_much_before_next_threshold(moved_out, &config.self_assessment.income_tax);

    Ok(SelfAssessmentSummary {
        dates,
        moved_out,
        assessment,
        threshold,
    })
}

fn vat_summary<L: LedgerSource>(
    ledger: &L,
    config: &Config,
    registration: VatRegistration,
    today: NaiveDate,
) -> Result<VatSummary, TaxError> {
    let next_return = next_return_date(registration, today);
    let quarter_start =
        beginning_of_previous_period(next_return.submitting_month, next_return.quarter_end_year);
    // the quarter so far, future-dated rows stay out
    let quarter_end = add_months(quarter_start, 3).min(add_days(today, 1));
    let quarter = DateRange::new(quarter_start, quarter_end)?;

    let revenue = ledger.revenue(&quarter);
    let expenses = ledger.expenses(&quarter, &config.expense_categories);

    Ok(VatSummary {
        next_return,
        quarter_start,
        revenue,
        expenses,
        estimate: estimate_vat(revenue, expenses, config.vat_rate),
    })
}

/// Loan activity up to and including `today`. The repayment deadline follows the
/// accounting period of the most recent draw.
fn director_loan<L: LedgerSource>(
    ledger: &L,
    anchor: &PeriodAnchor,
    today: NaiveDate,
) -> Result<DirectorLoan, TaxError> {
    let entries = ledger.loan_entries(&DateRange::through(NaiveDate::MIN, today)?);
    let last_draw = entries
        .iter()
        .filter(|e| e.kind == LoanKind::Draw)
        .map(|e| e.date)
        .max()
        .unwrap_or(today);
    let period = AccountingPeriod::current(anchor, last_draw)?;
    Ok(DirectorLoan::track(&entries, period.start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::corporation::RateTable;
    use crate::tax::ledger::{Category, Ledger, LedgerRecord};
    use crate::tax::self_assessment::Band;
    use crate::tax::uk::TaxYear;
    use chrono::Month;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn credit(date: NaiveDate, category: Category, amount: Decimal) -> LedgerRecord {
        LedgerRecord {
            date,
            description: String::new(),
            credit: Some(amount),
            debit: None,
            category,
        }
    }

    fn debit(date: NaiveDate, category: Category, amount: Decimal) -> LedgerRecord {
        LedgerRecord {
            date,
            description: String::new(),
            credit: None,
            debit: Some(amount),
            category,
        }
    }

    fn settings() -> Settings {
        Settings {
            anchor: "01-11".parse().unwrap(),
            vat: Some(VatRegistration::new(11).unwrap()),
            config: Config::default(),
            recent: 0,
        }
    }

    fn ledger() -> Ledger {
        Ledger::new(vec![
            // previous period
            credit(date(2019, 1, 10), Category::Income, dec!(60000)),
            // current period
            credit(date(2019, 11, 10), Category::Income, dec!(10000)),
            debit(date(2019, 11, 20), Category::Travel, dec!(1000)),
            credit(date(2019, 12, 5), Category::Income, dec!(2000)),
            debit(date(2019, 12, 6), Category::Office, dec!(500)),
            // tax year 2019/20
            debit(date(2019, 5, 1), Category::Personal, dec!(40000)),
            debit(date(2019, 12, 1), Category::Loan, dec!(1000)),
            credit(date(2019, 12, 10), Category::LoanRepayment, dec!(400)),
            // later in the current period, after today
            credit(date(2020, 6, 10), Category::Income, dec!(99999)),
        ])
    }

    #[test]
    fn full_dashboard() {
        let dashboard = assemble(&ledger(), &settings(), date(2019, 12, 15)).unwrap();

        let current = &dashboard.current_period;
        assert_eq!(current.period.start, date(2019, 11, 1));
        assert_eq!(current.revenue, dec!(12000));
        assert_eq!(current.expenses, dec!(1500));
        assert_eq!(current.profit, dec!(10500));
        assert_eq!(current.tax.as_ref().map(|t| t.amount), Some(dec!(1995)));
        assert_eq!(current.payment_deadline, date(2021, 8, 1));

        let previous = &dashboard.previous_period;
        assert_eq!(previous.period.start, date(2018, 11, 1));
        assert_eq!(previous.tax.as_ref().map(|t| t.amount), Some(dec!(11400)));

        let sa = &dashboard.self_assessment;
        assert_eq!(sa.dates.tax_year, TaxYear(2020));
        assert_eq!(sa.moved_out, dec!(40000));
        assert_eq!(sa.assessment.income_tax, dec!(5500));
        assert_eq!(sa.assessment.class2, dec!(159));
        assert_eq!(sa.assessment.class4, dec!(2745));
        assert_eq!(sa.assessment.total, dec!(8404));

        let vat = dashboard.vat.as_ref().unwrap();
        assert_eq!(vat.next_return.submitting_month, Month::February);
        assert_eq!(vat.next_return.payment_deadline, date(2020, 4, 7));
        assert_eq!(vat.quarter_start, date(2019, 12, 1));
        assert_eq!(vat.revenue, dec!(2000));
        assert_eq!(vat.expenses, dec!(500));
        assert_eq!(vat.estimate, dec!(300));

        assert_eq!(dashboard.director_loan.balance, dec!(600));
        assert_eq!(dashboard.director_loan.repayment_deadline, date(2021, 8, 2));

        assert_eq!(
            dashboard.warnings,
            vec![
                Warning::ApproachingThreshold {
                    band: Band::Basic,
                    remaining: dec!(10000),
                },
                Warning::OutstandingDirectorLoan {
                    balance: dec!(600),
                    repayment_deadline: date(2021, 8, 2),
                },
            ]
        );
    }

    #[test]
    fn vat_quarter_stops_at_today() {
        let ledger = Ledger::new(vec![
            credit(date(2019, 12, 5), Category::Income, dec!(2000)),
            // same quarter, not yet happened
            credit(date(2020, 1, 20), Category::Income, dec!(50000)),
            debit(date(2020, 2, 1), Category::Office, dec!(700)),
        ]);
        let dashboard = assemble(&ledger, &settings(), date(2019, 12, 15)).unwrap();

        let vat = dashboard.vat.as_ref().unwrap();
        assert_eq!(vat.quarter_start, date(2019, 12, 1));
        assert_eq!(vat.revenue, dec!(2000));
        assert_eq!(vat.expenses, Decimal::ZERO);
        assert_eq!(vat.estimate, dec!(400));
    }

    #[test]
    fn period_not_yet_started_this_month() {
        let settings = Settings {
            anchor: "20-11".parse().unwrap(),
            vat: None,
            ..settings()
        };
        let dashboard = assemble(&ledger(), &settings, date(2019, 11, 10)).unwrap();

        let current = &dashboard.current_period;
        assert_eq!(current.period.start, date(2019, 11, 20));
        assert_eq!(current.revenue, Decimal::ZERO);
        assert_eq!(current.profit, Decimal::ZERO);

        let previous = &dashboard.previous_period;
        assert_eq!(previous.period.start, date(2018, 11, 20));
        assert_eq!(previous.period.end, date(2019, 11, 20));
        assert_eq!(previous.revenue, dec!(70000));
    }

    #[test]
    fn recent_transactions_stop_at_today() {
        let with_recent = Settings {
            recent: 3,
            ..settings()
        };
        let dashboard = assemble(&ledger(), &with_recent, date(2019, 12, 15)).unwrap();
        let dates: Vec<_> = dashboard
            .recent_transactions
            .iter()
            .map(|r| r.date)
            .collect();
        assert_eq!(
            dates,
            vec![date(2019, 12, 10), date(2019, 12, 6), date(2019, 12, 5)]
        );

        let dashboard = assemble(&ledger(), &settings(), date(2019, 12, 15)).unwrap();
        assert!(dashboard.recent_transactions.is_empty());
    }

    #[test]
    fn vat_skipped_when_not_registered() {
        let settings = Settings {
            vat: None,
            ..settings()
        };
        let dashboard = assemble(&ledger(), &settings, date(2019, 12, 15)).unwrap();
        assert!(dashboard.vat.is_none());
    }

    #[test]
    fn missing_rates_become_warnings() {
        let mut settings = settings();
        settings.config.corporation_tax_rates = RateTable::new();

        let dashboard = assemble(&ledger(), &settings, date(2019, 12, 15)).unwrap();
        assert!(dashboard.current_period.tax.is_none());
        assert!(dashboard.previous_period.tax.is_none());
        assert!(dashboard.warnings.contains(&Warning::MissingRateData {
            financial_year: "2019-2020".to_string()
        }));
        assert!(dashboard.warnings.contains(&Warning::MissingRateData {
            financial_year: "2018-2019".to_string()
        }));
    }

    #[test]
    fn overdue_loan() {
        let ledger = Ledger::new(vec![debit(date(2019, 5, 1), Category::Loan, dec!(500))]);
        let settings = Settings {
            anchor: PeriodAnchor::default(),
            vat: None,
            ..settings()
        };

        let dashboard = assemble(&ledger, &settings, date(2021, 6, 1)).unwrap();
        assert_eq!(dashboard.director_loan.repayment_deadline, date(2021, 1, 2));
        assert_eq!(
            dashboard.warnings,
            vec![Warning::DirectorLoanOverdue {
                balance: dec!(500),
                repayment_deadline: date(2021, 1, 2),
            }]
        );
    }

    #[test]
    fn unallocated_records_are_flagged() {
        let ledger = Ledger::new(vec![debit(date(2019, 5, 1), Category::Unknown, dec!(12))]);
        let dashboard = assemble(&ledger, &Settings::default(), date(2019, 6, 1)).unwrap();
        assert_eq!(
            dashboard.warnings,
            vec![Warning::UnallocatedTransactions { count: 1 }]
        );
        assert_eq!(dashboard.director_loan.balance, Decimal::ZERO);
    }

    #[test]
    fn empty_ledger_owes_nothing() {
        let dashboard = assemble(&Ledger::default(), &settings(), date(2019, 11, 1)).unwrap();
        assert_eq!(dashboard.current_period.period.start, date(2019, 11, 1));
        assert_eq!(
            dashboard.current_period.tax.as_ref().map(|t| t.amount),
            Some(Decimal::ZERO)
        );
        assert_eq!(dashboard.self_assessment.assessment.total, Decimal::ZERO);
        assert!(dashboard.warnings.is_empty());
    }
}
