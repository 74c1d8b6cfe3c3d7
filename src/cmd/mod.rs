pub mod dashboard;
pub mod schema;
pub mod validate;

use crate::tax::{Config, Ledger};
use anyhow::Context;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Read the ledger CSV (or stdin with "-")
pub fn read_ledger(path: &Path) -> anyhow::Result<Ledger> {
    if path.as_os_str() == "-" {
        let mut buffer = Vec::new();
        io::stdin().lock().read_to_end(&mut buffer)?;
        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }
        return Ok(Ledger::read_csv(buffer.as_slice())?);
    }

    let file = File::open(path).with_context(|| format!("opening ledger {}", path.display()))?;
    let ledger = Ledger::read_csv(BufReader::new(file))
        .with_context(|| format!("reading ledger {}", path.display()))?;
    Ok(ledger)
}

/// Read the config file, or fall back to the built-in rates
pub fn read_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let file = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    Config::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing config {}", path.display()))
}

fn format_gbp(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-£{:.2}", amount.abs())
    } else {
        format!("£{:.2}", amount)
    }
}
