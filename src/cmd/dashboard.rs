//! Dashboard command - tax estimates for the running periods

use super::{format_gbp, read_config, read_ledger};
use crate::tax::{
    assemble, CorporationTaxSummary, Dashboard, LedgerRecord, PeriodAnchor,
    SelfAssessmentSummary, Settings, VatRegistration, VatSummary,
};
use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::PathBuf;
use tabled::{
    settings::{
        object::{Columns, Rows},
        Alignment, Modify, Style,
    },
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct DashboardCommand {
    /// CSV file of categorised bank transactions ("-" for stdin)
    #[arg(short, long)]
    ledger: PathBuf,

    /// Day and month the accounting period starts (e.g. 01-11 for 1 November)
    #[arg(short, long, default_value_t = PeriodAnchor::default())]
    accounting_start: PeriodAnchor,

    /// Month (1-12) the company registered for VAT
    #[arg(long)]
    vat_month: Option<u32>,

    /// JSON file overriding the built-in rates and thresholds
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Date to report on (YYYY-MM-DD), defaults to today
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Number of recent transactions to list
    #[arg(long, default_value_t = 10)]
    recent: usize,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl DashboardCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = read_ledger(&self.ledger)?;
        let settings = Settings {
            anchor: self.accounting_start,
            vat: self.vat_month.map(VatRegistration::new).transpose()?,
            config: read_config(self.config.as_deref())?,
            recent: self.recent,
        };
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());

        let dashboard = assemble(&ledger, &settings, today)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        } else {
            print_dashboard(&dashboard);
        }
        Ok(())
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    println!();
    println!("TAX DASHBOARD ({})", dashboard.today);
    println!();

    print_corporation_tax(&dashboard.current_period, &dashboard.previous_period);
    print_self_assessment(&dashboard.self_assessment);
    if let Some(vat) = &dashboard.vat {
        print_vat(vat);
    }

    let loan = &dashboard.director_loan;
    println!("DIRECTOR LOAN");
    println!(
        "  Outstanding: {} | Repay by: {}",
        format_gbp(loan.balance),
        loan.repayment_deadline
    );
    println!();

    if !dashboard.warnings.is_empty() {
        println!("WARNINGS");
        for warning in &dashboard.warnings {
            println!("  \u{26A0} {}", warning.message());
        }
        println!();
    }

    if !dashboard.recent_transactions.is_empty() {
        print_recent(&dashboard.recent_transactions);
    }
}

#[derive(Debug, Clone, Tabled)]
struct CorporationTaxRow {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Expenses")]
    expenses: String,
    #[tabled(rename = "Pension")]
    pension: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Tax")]
    tax: String,
    #[tabled(rename = "Due By")]
    due: String,
}

impl CorporationTaxRow {
    fn new(label: &str, summary: &CorporationTaxSummary) -> Self {
        CorporationTaxRow {
            period: format!(
                "{} ({} - {})",
                label,
                summary.period.start,
                summary.period.last_day()
            ),
            revenue: format_gbp(summary.revenue),
            expenses: format_gbp(summary.expenses),
            pension: format_gbp(summary.pension),
            profit: format_gbp(summary.profit),
            tax: summary
                .tax
                .as_ref()
                .map_or_else(|| "n/a".to_string(), |t| format_gbp(t.amount)),
            due: summary.payment_deadline.to_string(),
        }
    }
}

fn print_corporation_tax(current: &CorporationTaxSummary, previous: &CorporationTaxSummary) {
    println!("CORPORATION TAX");
    let rows = vec![
        CorporationTaxRow::new("Current, so far", current),
        CorporationTaxRow::new("Previous", previous),
    ];
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);

    if let Some(split) = current.tax.as_ref().and_then(|t| t.split.as_ref()) {
        println!(
            "  Current period split: {} days @ {:.0}% and {} days @ {:.0}%",
            split.days_before,
            split.rate_before * dec!(100),
            split.days_after,
            split.rate_after * dec!(100)
        );
    }
    println!();
}

#[derive(Debug, Clone, Tabled)]
struct AmountRow {
    #[tabled(rename = "Item")]
    item: &'static str,
    #[tabled(rename = "Amount")]
    amount: String,
}

fn print_self_assessment(summary: &SelfAssessmentSummary) {
    let dates = &summary.dates;
    let sa = &summary.assessment;

    println!("SELF ASSESSMENT {}", dates.tax_year);
    println!(
        "  {} to {} | Pay by: {}",
        dates.start, dates.end, dates.payment_deadline
    );
    let rows = vec![
        AmountRow {
            item: "Moved out of company",
            amount: format_gbp(summary.moved_out),
        },
        AmountRow {
            item: "Personal allowance",
            amount: format_gbp(sa.personal_allowance),
        },
        AmountRow {
            item: "Income tax",
            amount: format_gbp(sa.income_tax),
        },
        AmountRow {
            item: "Class 2 NI",
            amount: format_gbp(sa.class2),
        },
        AmountRow {
            item: "Class 4 NI",
            amount: format_gbp(sa.class4),
        },
        AmountRow {
            item: "Total",
            amount: format_gbp(sa.total),
        },
    ];
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);

    let threshold = &summary.threshold;
    if threshold.remaining.is_zero() {
        println!("  Band: {}", threshold.band);
    } else {
        println!(
            "  Band: {} | {} before the next band",
            threshold.band,
            format_gbp(threshold.remaining)
        );
    }
    println!();
}

fn print_vat(vat: &VatSummary) {
    let next = &vat.next_return;
    println!("VAT");
    println!(
        "  Next return: {} {} | Pay by: {}",
        next.submitting_month.name(),
        next.quarter_end_year,
        next.payment_deadline
    );
    println!(
        "  Quarter from {}: Sales {} | Expenses {} | Estimated VAT {}",
        vat.quarter_start,
        format_gbp(vat.revenue),
        format_gbp(vat.expenses),
        format_gbp(vat.estimate)
    );
    println!();
}

#[derive(Debug, Clone, Tabled)]
struct TransactionRow {
    #[tabled(rename = "Date")]
    date: NaiveDate,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "In")]
    credit: String,
    #[tabled(rename = "Out")]
    debit: String,
    #[tabled(rename = "Category")]
    category: String,
}

impl From<&LedgerRecord> for TransactionRow {
    fn from(record: &LedgerRecord) -> Self {
        let amount = |value: Option<Decimal>| value.map(format_gbp).unwrap_or_default();
        TransactionRow {
            date: record.date,
            description: record.description.clone(),
            credit: amount(record.credit),
            debit: amount(record.debit),
            category: format!("{:?}", record.category),
        }
    }
}

fn print_recent(records: &[LedgerRecord]) {
    println!("RECENT TRANSACTIONS");
    let rows: Vec<TransactionRow> = records.iter().map(TransactionRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();
}
