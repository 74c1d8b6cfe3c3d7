use chrono::NaiveDate;

/// Errors raised by the tax engine.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TaxError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("accounting period start '{0}' should look like '01-11' (1st of November)")]
    InvalidAnchorFormat(String),
    #[error("no corporation tax rate configured for financial year {financial_year}")]
    MissingRateData { financial_year: String },
    #[error("degenerate date range: {start} -> {end}")]
    DegenerateInput { start: NaiveDate, end: NaiveDate },
}
