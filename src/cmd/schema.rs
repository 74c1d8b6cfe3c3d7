//! Schema command - print expected input formats

use crate::tax::{Config, LedgerRecord};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Which input to describe
    #[arg(value_enum, default_value = "ledger-csv")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for one ledger CSV row
    LedgerCsv,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
    /// JSON Schema for the config file
    Config,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::LedgerCsv => {
                let schema = schema_for!(LedgerRecord);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => println!("{}", CSV_COLUMNS.join(",")),
            SchemaFormat::CsvFields => print_csv_fields(),
            SchemaFormat::Config => {
                let schema = schema_for!(Config);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
        }
        Ok(())
    }
}

fn print_csv_fields() {
    println!("Ledger CSV Format");
    println!("=================");
    println!();
    for (name, required, description) in CSV_FIELD_DESCRIPTIONS {
        let req = if *required { "required" } else { "optional" };
        println!("{:12} ({:8})  {}", name, req, description);
    }
    println!();
    println!("Rows with a blank or unrecognised category are left out of every total.");
}

const CSV_COLUMNS: &[&str] = &["date", "description", "credit", "debit", "category"];

const CSV_FIELD_DESCRIPTIONS: &[(&str, bool, &str)] = &[
    ("date", true, "Transaction date (YYYY-MM-DD)"),
    ("description", false, "Free text from the bank statement"),
    ("credit", false, "Amount paid into the company account"),
    ("debit", false, "Amount paid out of the company account"),
    (
        "category",
        false,
        "Income, Personal, Legal, Travel, Office, Equipment, Premises, CostOfSales, \
         Wages, Penalties, BankCharges, Pension, Hmrc, FixedAsset, Loan, LoanRepayment",
    ),
];
