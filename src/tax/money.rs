use rust_decimal::{Decimal, RoundingStrategy};

/// Amount in pounds sterling
pub type Money = Decimal;

/// Round to whole pence, half-up
pub fn round_pence(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to whole pounds, half-up
pub fn round_pounds(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pence_round_half_up() {
        assert_eq!(round_pence(dec!(11648.2191)), dec!(11648.22));
        assert_eq!(round_pence(dec!(0.005)), dec!(0.01));
        assert_eq!(round_pence(dec!(0.004)), dec!(0.00));
    }

    #[test]
    fn pounds_round_half_up() {
        assert_eq!(round_pounds(dec!(158.6)), dec!(159));
        assert_eq!(round_pounds(dec!(944.5)), dec!(945));
        assert_eq!(round_pounds(dec!(944.49)), dec!(944));
    }
}
