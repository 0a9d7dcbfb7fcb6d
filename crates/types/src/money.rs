//! Exact money arithmetic. Amounts are stored as minor-unit integers (e.g. cents);
//! intermediate pricing math uses `Decimal` so that `seat_price = base_fare ×
//! seat.price_multiplier` never accumulates binary-float error.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Round a decimal amount (already in minor units) to the nearest integer,
/// breaking ties to the nearest even number (banker's rounding).
///
/// This is the single rounding point used by booking creation, seat price
/// snapshotting, and modification re-pricing, so that repeated rounding of
/// the same inputs is always reproducible.
pub fn round_half_even(amount: Decimal) -> i64 {
    amount
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointNearestEven)
        .to_i64()
        .unwrap_or_else(|| if amount.is_sign_negative() { i64::MIN } else { i64::MAX })
}

/// Compute a seat's minor-unit price from the trip's base fare and the seat's
/// multiplier, rounding half-to-even at the final step.
pub fn seat_price_minor_units(base_fare_minor_units: i64, multiplier: Decimal) -> i64 {
    let base = Decimal::from(base_fare_minor_units);
    round_half_even(base * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_to_even() {
        assert_eq!(round_half_even(dec!(100.5)), 100);
        assert_eq!(round_half_even(dec!(101.5)), 102);
        assert_eq!(round_half_even(dec!(100.4)), 100);
        assert_eq!(round_half_even(dec!(100.6)), 101);
    }

    #[test]
    fn applies_seat_multiplier() {
        // 100_00 minor units * 1.5 = 150_00
        assert_eq!(seat_price_minor_units(100_00, dec!(1.5)), 150_00);
        // 100_00 * 1.125 = 112_50 -> exact, no rounding needed
        assert_eq!(seat_price_minor_units(100_00, dec!(1.125)), 112_50);
    }
}
