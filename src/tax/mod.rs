pub mod config;
pub mod corporation;
pub mod error;
pub mod ledger;
pub mod loan;
pub mod money;
pub mod period;
pub mod report;
pub mod self_assessment;
pub mod uk;
pub mod vat;
pub mod warnings;

pub use config::Config;
pub use ledger::{Ledger, LedgerRecord, LedgerSource};
pub use period::PeriodAnchor;
pub use report::{
    assemble, CorporationTaxSummary, Dashboard, SelfAssessmentSummary, Settings, VatSummary,
};
pub use vat::VatRegistration;
