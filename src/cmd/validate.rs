//! Validate command - surface ledger and config problems without building the dashboard

use super::{format_gbp, read_config, read_ledger};
use crate::tax::{LedgerRecord, LedgerSource};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// CSV file of categorised bank transactions ("-" for stdin)
    #[arg(short, long)]
    ledger: PathBuf,

    /// JSON file overriding the built-in rates and thresholds
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A validation issue for output
#[derive(Debug, Clone, Serialize)]
struct ValidationIssue {
    #[serde(rename = "type")]
    issue_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    message: String,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput {
    record_count: usize,
    issue_count: usize,
    issues: Vec<ValidationIssue>,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = read_ledger(&self.ledger)?;
        let config = read_config(self.config.as_deref())?;

        let mut issues: Vec<ValidationIssue> = ledger
            .unallocated()
            .into_iter()
            .map(unallocated_issue)
            .collect();

        issues.extend(
            config
                .corporation_tax_rates
                .gaps()
                .into_iter()
                .map(|year| ValidationIssue {
                    issue_type: "MissingRate",
                    date: None,
                    message: format!("No Corporation Tax rate configured for {year}"),
                }),
        );

        if config.expense_categories.is_empty() {
            issues.push(ValidationIssue {
                issue_type: "NoExpenseCategories",
                date: None,
                message: "No expense categories configured, profit equals revenue".to_string(),
            });
        }

        let record_count = ledger.records().len();
        if self.json {
            let output = ValidationOutput {
                record_count,
                issue_count: issues.len(),
                issues: issues.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_text(record_count, &issues);
        }

        // Exit with code 1 if issues found
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}

fn unallocated_issue(record: &LedgerRecord) -> ValidationIssue {
    let amount = if record.credit() > record.debit() {
        format!("in {}", format_gbp(record.credit()))
    } else {
        format!("out {}", format_gbp(record.debit()))
    };
    ValidationIssue {
        issue_type: "Unallocated",
        date: Some(record.date.to_string()),
        message: format!("'{}' ({}) has no category", record.description, amount),
    }
}

fn print_text(record_count: usize, issues: &[ValidationIssue]) {
    println!();
    println!("VALIDATION RESULTS ({} ledger records)", record_count);
    println!();

    if issues.is_empty() {
        println!("\u{2713} No issues found.");
        return;
    }

    println!("\u{26A0} {} issue(s) found:", issues.len());
    println!();
    for (i, issue) in issues.iter().enumerate() {
        match &issue.date {
            Some(date) => println!("  {}. [{}] {} {}", i + 1, issue.issue_type, date, issue.message),
            None => println!("  {}. [{}] {}", i + 1, issue.issue_type, issue.message),
        }
    }
    println!();
}
