//! Rates and thresholds the engine works with. Every field can be overridden from a
//! JSON file; anything left out falls back to the built-in UK figures.

use super::corporation::RateTable;
use super::ledger::Category;
use super::self_assessment::SelfAssessmentRates;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Corporation Tax main rate per financial year, e.g. {"2019-2020": 0.19}
    pub corporation_tax_rates: RateTable,
    pub self_assessment: SelfAssessmentRates,
    /// Standard VAT rate as a fraction
    #[schemars(with = "f64")]
    pub vat_rate: Decimal,
    /// Ledger categories deducted from revenue as allowable expenses
    pub expense_categories: Vec<Category>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            corporation_tax_rates: RateTable::default(),
            self_assessment: SelfAssessmentRates::default(),
            vat_rate: dec!(0.20),
            expense_categories: Category::default_expenses(),
        }
    }
}

impl Config {
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        let config: Config = serde_json::from_reader(reader)?;
        log::debug!(
            "Loaded config with {} corporation tax rate(s)",
            config.corporation_tax_rates.iter().count()
        );
        Ok(config)
    }
}
