//! Self Assessment: personal Income Tax plus Class 2 and Class 4 National Insurance
//!
//! ```text
//!  Band                  Taxable income          Tax rate
//!  -------------         --------------          --------
//!  Personal Allowance    Up to £12,500           0%
//!  Basic rate            £12,501 to £50,000      20%
//!  Higher rate           £50,001 to £150,000     40%
//!  Additional rate       over £150,000           45%
//! ```
//!
//! See https://www.gov.uk/government/publications/rates-and-allowances-income-tax

use super::money::{round_pence, round_pounds, Money};
use super::uk::TaxYear;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Share of a band left before its ceiling that triggers a warning
const WARNING_SHARE: Decimal = dec!(0.2);

const WEEKS_IN_YEAR: Decimal = dec!(52);

/// Income Tax band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Band {
    PersonalAllowance,
    Basic,
    Higher,
    Additional,
}

impl Band {
    pub fn display(&self) -> &'static str {
        match self {
            Band::PersonalAllowance => "Personal Allowance",
            Band::Basic => "Basic rate",
            Band::Higher => "Higher rate",
            Band::Additional => "Additional rate",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// One band with its bounds; the additional rate band has no upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BandRange {
    pub band: Band,
    pub lower: Money,
    pub upper: Option<Money>,
    pub rate: Decimal,
}

/// Income Tax thresholds and rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IncomeTaxBands {
    #[schemars(with = "f64")]
    pub personal_allowance: Money,
    /// Upper bound of the basic rate band
    #[schemars(with = "f64")]
    pub basic_limit: Money,
    /// Upper bound of the higher rate band
    #[schemars(with = "f64")]
    pub higher_limit: Money,
    /// Income above which the personal allowance is withdrawn, £1 for every £2
    #[schemars(with = "f64")]
    pub taper_threshold: Money,
    #[schemars(with = "f64")]
    pub basic_rate: Decimal,
    #[schemars(with = "f64")]
    pub higher_rate: Decimal,
    #[schemars(with = "f64")]
    pub additional_rate: Decimal,
}

impl Default for IncomeTaxBands {
    fn default() -> Self {
        IncomeTaxBands {
            personal_allowance: dec!(12500),
            basic_limit: dec!(50000),
            higher_limit: dec!(150000),
            taper_threshold: dec!(100000),
            basic_rate: dec!(0.20),
            higher_rate: dec!(0.40),
            additional_rate: dec!(0.45),
        }
    }
}

impl IncomeTaxBands {
    pub fn bands(&self) -> [BandRange; 4] {
        [
            BandRange {
                band: Band::PersonalAllowance,
                lower: Decimal::ZERO,
                upper: Some(self.personal_allowance),
                rate: Decimal::ZERO,
            },
            BandRange {
                band: Band::Basic,
                lower: self.personal_allowance,
                upper: Some(self.basic_limit),
                rate: self.basic_rate,
            },
            BandRange {
                band: Band::Higher,
                lower: self.basic_limit,
                upper: Some(self.higher_limit),
                rate: self.higher_rate,
            },
            BandRange {
                band: Band::Additional,
                lower: self.higher_limit,
                upper: None,
                rate: self.additional_rate,
            },
        ]
    }

    /// The band `income` currently sits in
    pub fn band_for(&self, income: Money) -> Band {
        self.bands()
            .into_iter()
            .find(|range| range.upper.map_or(true, |upper| income < upper))
            .map_or(Band::Additional, |range| range.band)
    }

    pub fn upper_bound(&self, band: Band) -> Option<Money> {
        match band {
            Band::PersonalAllowance => Some(self.personal_allowance),
            Band::Basic => Some(self.basic_limit),
            Band::Higher => Some(self.higher_limit),
            Band::Additional => None,
        }
    }

    /// The Personal Allowance goes down by £1 for every £2 of income above the
    /// taper threshold, down to zero.
    pub fn personal_allowance_for(&self, profit: Money) -> Money {
        if profit < self.taper_threshold {
            return self.personal_allowance;
        }
        let withdrawn = (profit - self.taper_threshold) / dec!(2);
        (self.personal_allowance - withdrawn).max(Decimal::ZERO)
    }

    /// Width of the basic rate band once the allowance is used up
    fn basic_band_width(&self) -> Money {
        self.basic_limit - self.personal_allowance
    }

    pub fn income_tax(&self, profit: Money) -> Money {
        let taxable = profit - self.personal_allowance_for(profit);
        let basic_band = self.basic_band_width();
        let basic_band_tax = basic_band * self.basic_rate;

        let tax = match self.band_for(profit) {
            Band::PersonalAllowance => Decimal::ZERO,
            Band::Basic => taxable * self.basic_rate,
            Band::Higher => basic_band_tax + (taxable - basic_band) * self.higher_rate,
            Band::Additional => {
                basic_band_tax
                    + (self.higher_limit - basic_band) * self.higher_rate
                    + (profit - self.higher_limit) * self.additional_rate
            }
        };
        round_pence(tax.max(Decimal::ZERO))
    }
}

/// Class 2 and Class 4 National Insurance for the self-employed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NationalInsuranceRates {
    #[schemars(with = "f64")]
    pub class2_weekly_rate: Money,
    /// No Class 2 below this profit
    #[schemars(with = "f64")]
    pub class2_small_profits_threshold: Money,
    /// Class 4 is charged on profit above this threshold
    #[schemars(with = "f64")]
    pub class4_lower_profits_limit: Money,
    #[schemars(with = "f64")]
    pub class4_upper_profits_limit: Money,
    #[schemars(with = "f64")]
    pub class4_main_rate: Decimal,
    #[schemars(with = "f64")]
    pub class4_additional_rate: Decimal,
}

impl Default for NationalInsuranceRates {
    fn default() -> Self {
        NationalInsuranceRates {
            class2_weekly_rate: dec!(3.05),
            class2_small_profits_threshold: dec!(6365),
            class4_lower_profits_limit: dec!(9500),
            class4_upper_profits_limit: dec!(50000),
            class4_main_rate: dec!(0.09),
            class4_additional_rate: dec!(0.02),
        }
    }
}

impl NationalInsuranceRates {
    pub fn class2(&self, profit: Money) -> Money {
        if profit < self.class2_small_profits_threshold {
            return Decimal::ZERO;
        }
        round_pounds(self.class2_weekly_rate * WEEKS_IN_YEAR)
    }

    pub fn class4(&self, profit: Money) -> Money {
        if profit <= self.class4_lower_profits_limit {
            return Decimal::ZERO;
        }
        let main_slice = profit.min(self.class4_upper_profits_limit) - self.class4_lower_profits_limit;
        let upper_slice = (profit - self.class4_upper_profits_limit).max(Decimal::ZERO);
        round_pounds(main_slice * self.class4_main_rate + upper_slice * self.class4_additional_rate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SelfAssessmentRates {
    pub income_tax: IncomeTaxBands,
    pub national_insurance: NationalInsuranceRates,
}

/// Breakdown of a Self Assessment liability
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfAssessment {
    pub profit: Money,
    pub personal_allowance: Money,
    pub income_tax: Money,
    pub class2: Money,
    pub class4: Money,
    pub total: Money,
}

/// Self Assessment liability on `income` less allowable `costs`
pub fn calculate_self_assessment_tax(
    income: Money,
    costs: Money,
    rates: &SelfAssessmentRates,
) -> SelfAssessment {
    let profit = (income - costs).max(Decimal::ZERO);
    let personal_allowance = rates.income_tax.personal_allowance_for(profit);
    let income_tax = rates.income_tax.income_tax(profit);
    let class2 = rates.national_insurance.class2(profit);
    let class4 = rates.national_insurance.class4(profit);

    log::debug!(
        "Self Assessment on profit {}: allowance {}, income tax {}, class 2 {}, class 4 {}",
        profit,
        personal_allowance,
        income_tax,
        class2,
        class4
    );

    SelfAssessment {
        profit,
        personal_allowance,
        income_tax,
        class2,
        class4,
        total: income_tax + class2 + class4,
    }
}

/// Bounds of the tax year running on a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxYearDates {
    pub tax_year: TaxYear,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub payment_deadline: NaiveDate,
}

pub fn tax_year_dates(now: NaiveDate) -> TaxYearDates {
    let tax_year = TaxYear::from_date(now);
    TaxYearDates {
        tax_year,
        start: tax_year.start_date(),
        end: tax_year.end_date(),
        payment_deadline: tax_year.payment_deadline(),
    }
}

/// How far an income is from the next band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdProximity {
    pub band: Band,
    /// Zero in the additional rate band, which has no ceiling
    pub remaining: Money,
    pub is_warning: bool,
}

/// Money left before `income` crosses into the next band. Warns once the rest is
/// within a fifth of the band's ceiling.
pub fn how_much_before_next_threshold(income: Money, bands: &IncomeTaxBands) -> ThresholdProximity {
    let band = bands.band_for(income);
    match bands.upper_bound(band) {
        Some(ceiling) => {
            let remaining = ceiling - income;
            ThresholdProximity {
                band,
                remaining,
                is_warning: remaining <= ceiling * WARNING_SHARE,
            }
        }
        None => ThresholdProximity {
            band,
            remaining: Decimal::ZERO,
            is_warning: true,
        },
    }
}
