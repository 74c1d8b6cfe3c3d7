//! Quarterly VAT return cycle
//!
//! VAT returns are due 1 month and 7 days after the end of a VAT quarter. For
//! example, the return for the quarter ending June 2019 is due by 7 August 2019.
//! Quarters recur every three months from the month the company registered.

use super::error::TaxError;
use super::money::{round_pence, Money};
use chrono::{Datelike, Month, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// Month the company registered for VAT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatRegistration(Month);

impl VatRegistration {
    pub fn new(month: u32) -> Result<Self, TaxError> {
        u8::try_from(month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(VatRegistration)
            .ok_or_else(|| {
                TaxError::InvalidConfiguration(format!(
                    "VAT registration month must be between 1 and 12, got {month}"
                ))
            })
    }

    pub fn month(&self) -> Month {
        self.0
    }
}

/// The next VAT return to submit and when it must be paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VatReturn {
    #[serde(serialize_with = "serialize_month")]
    pub submitting_month: Month,
    /// Calendar year the quarter ends in
    pub quarter_end_year: i32,
    pub payment_deadline: NaiveDate,
}

fn serialize_month<S: serde::Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(month.name())
}

/// Submitting month of the VAT return covering `now`, and its payment deadline.
pub fn next_return_date(registration: VatRegistration, now: NaiveDate) -> VatReturn {
    let current = now.month();
    let submitting = closest_submitting_month(registration.month(), current);
    let mut year = now.year();
    if submitting < current {
        year += 1;
    }

    // 7th day two months after the quarter ends
    let deadline_month = submitting + 2;
    let (deadline_year, deadline_month) = if deadline_month > 12 {
        (year + 1, deadline_month - 12)
    } else {
        (year, deadline_month)
    };

    VatReturn {
        submitting_month: month_of(submitting),
        quarter_end_year: year,
        payment_deadline: NaiveDate::from_ymd_opt(deadline_year, deadline_month, 7)
            .unwrap_or(NaiveDate::MAX),
    }
}

/// First quarter month on or after `current`, as a month number 1..=12
fn closest_submitting_month(registered: Month, current: u32) -> u32 {
    let registered = registered.number_from_month() as i32;
    let offset = (registered - current as i32).rem_euclid(3) as u32;
    let month = current + offset;
    if month > 12 {
        month - 12
    } else {
        month
    }
}

fn month_of(number: u32) -> Month {
    u8::try_from(number)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .unwrap_or(Month::January)
}

/// First day of the quarter that ends in `submitting_month` of `year`
pub fn beginning_of_previous_period(submitting_month: Month, year: i32) -> NaiveDate {
    let month = submitting_month.number_from_month() as i32 - 2;
    let (year, month) = if month < 1 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };
    NaiveDate::from_ymd_opt(year, month as u32, 1).unwrap_or(NaiveDate::MIN)
}

/// VAT owed so far this quarter: output tax on sales less input tax on expenses
pub fn estimate_vat(revenue: Money, expenses: Money, rate: Decimal) -> Money {
    round_pence(((revenue - expenses) * rate).max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn registered(month: u32) -> VatRegistration {
        VatRegistration::new(month).unwrap()
    }

    #[test]
    fn registration_month_is_validated() {
        assert!(VatRegistration::new(0).is_err());
        assert!(VatRegistration::new(13).is_err());
        assert_eq!(registered(11).month(), Month::November);
    }

    // registered in November: returns are submitted in May, August, November and
    // February, paid by 7 July, 7 October, 7 January and 7 April
    #[test]
    fn next_return_registered_in_november() {
        for (now, month, deadline) in [
            (date(2018, 12, 15), Month::February, date(2019, 4, 7)),
            (date(2019, 1, 15), Month::February, date(2019, 4, 7)),
            (date(2019, 2, 15), Month::February, date(2019, 4, 7)),
            (date(2019, 3, 15), Month::May, date(2019, 7, 7)),
            (date(2019, 4, 15), Month::May, date(2019, 7, 7)),
            (date(2019, 5, 15), Month::May, date(2019, 7, 7)),
            (date(2019, 6, 15), Month::August, date(2019, 10, 7)),
            (date(2019, 7, 15), Month::August, date(2019, 10, 7)),
            (date(2019, 8, 15), Month::August, date(2019, 10, 7)),
            (date(2019, 9, 15), Month::November, date(2020, 1, 7)),
            (date(2019, 10, 15), Month::November, date(2020, 1, 7)),
            (date(2019, 11, 15), Month::November, date(2020, 1, 7)),
        ] {
            let vat_return = next_return_date(registered(11), now);
            assert_eq!(vat_return.submitting_month, month, "{now}");
            assert_eq!(vat_return.payment_deadline, deadline, "{now}");
        }
    }

    #[test]
    fn quarter_end_year_rolls_over() {
        let vat_return = next_return_date(registered(11), date(2018, 12, 15));
        assert_eq!(vat_return.quarter_end_year, 2019);
        let vat_return = next_return_date(registered(11), date(2019, 11, 15));
        assert_eq!(vat_return.quarter_end_year, 2019);
    }

    #[test]
    fn closest_submitting_months() {
        use Month::*;
        for (vat, now, expected) in [
            (November, December, February),
            (November, January, February),
            (November, February, February),
            (November, March, May),
            (November, April, May),
            (November, May, May),
            (November, June, August),
            (November, July, August),
            (November, August, August),
            (November, September, November),
            (November, October, November),
            (November, November, November),
            // registered in January: Jan, Apr, Jul and Oct
            (January, February, April),
            (January, March, April),
            (January, April, April),
            (January, May, July),
            (January, June, July),
            (January, July, July),
            (January, August, October),
            (January, September, October),
            (January, October, October),
            (January, November, January),
            (January, December, January),
            (January, January, January),
        ] {
            let month = closest_submitting_month(vat, now.number_from_month());
            assert_eq!(month, expected.number_from_month(), "{vat:?} {now:?}");
        }
    }

    #[test]
    fn quarter_beginnings() {
        assert_eq!(beginning_of_previous_period(Month::May, 2019), date(2019, 3, 1));
        assert_eq!(beginning_of_previous_period(Month::March, 2019), date(2019, 1, 1));
        assert_eq!(beginning_of_previous_period(Month::February, 2019), date(2018, 12, 1));
        assert_eq!(beginning_of_previous_period(Month::January, 2019), date(2018, 11, 1));
    }

    #[test]
    fn vat_estimate() {
        assert_eq!(estimate_vat(dec!(10000), dec!(2000), dec!(0.20)), dec!(1600));
        assert_eq!(estimate_vat(dec!(1000), dec!(2000), dec!(0.20)), Decimal::ZERO);
    }
}
