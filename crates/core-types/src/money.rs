use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Converts a currency amount to whole cents without rounding.
///
/// `None` when the amount has sub-cent precision or its cent value does not
/// fit in an `i64`. Trailing zeros are ignored, so `19.990` is `1999`.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    if amount.normalize().scale() > 2 {
        return None;
    }
    amount.checked_mul(Decimal::ONE_HUNDRED)?.to_i64()
}
