//! Foreign currency -> EUR conversion with fixed rounding rules.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::DomainError;

/// Fractional digits kept for the inverted (foreign -> EUR) rate.
pub const INVERSE_RATE_SCALE: u32 = 6;
/// Fractional digits of the converted EUR amount.
pub const EUR_AMOUNT_SCALE: u32 = 4;

const MAX_AMOUNT_INTEGER_DIGITS: u32 = 10;
const MAX_AMOUNT_FRACTION_DIGITS: u32 = 2;

/// Checks a requested amount: positive, at most 10 integer and 2 fraction digits.
pub fn validate_amount(amount: Decimal) -> Result<(), DomainError> {
    if amount <= Decimal::ZERO {
        return Err(DomainError::ValidationError(
            "Amount must be positive".into(),
        ));
    }
    if amount.normalize().scale() > MAX_AMOUNT_FRACTION_DIGITS {
        return Err(DomainError::ValidationError(format!(
            "Amount must have at most {MAX_AMOUNT_FRACTION_DIGITS} fraction digits"
        )));
    }
    if amount.trunc() >= Decimal::from(10_i64.pow(MAX_AMOUNT_INTEGER_DIGITS)) {
        return Err(DomainError::ValidationError(format!(
            "Amount must have at most {MAX_AMOUNT_INTEGER_DIGITS} integer digits"
        )));
    }
    Ok(())
}

/// Converts `amount` units of a foreign currency into EUR, given the
/// published EUR -> foreign rate.
///
/// The rate is inverted to 6 fractional digits (half-up), multiplied by the
/// amount and the product rounded to 4 fractional digits (half-up).
pub fn convert_to_eur(amount: Decimal, eur_to_foreign: Decimal) -> Result<Decimal, DomainError> {
    if eur_to_foreign.is_zero() {
        return Err(DomainError::ZeroRate);
    }

    let foreign_to_eur = Decimal::ONE
        .checked_div(eur_to_foreign)
        .ok_or(DomainError::ConversionOverflow)?
        .round_dp_with_strategy(INVERSE_RATE_SCALE, RoundingStrategy::MidpointAwayFromZero);

    let mut eur = amount
        .checked_mul(foreign_to_eur)
        .ok_or(DomainError::ConversionOverflow)?
        .round_dp_with_strategy(EUR_AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    eur.rescale(EUR_AMOUNT_SCALE);
    Ok(eur)
}

/// Renders a decimal with exactly `dp` fractional digits, rounding half-even.
pub fn display_scaled(value: Decimal, dp: u32) -> String {
    let mut scaled = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
    scaled.rescale(dp);
    scaled.to_string()
}
