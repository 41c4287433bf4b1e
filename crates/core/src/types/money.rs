//! Monetary rounding and derived-metric rules.
//!
//! All monetary amounts are `rust_decimal::Decimal`. Derived outputs
//! (averages, growth percentages) are rounded half-up to 2 decimal places;
//! raw sums are never rounded.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round half-up to 2 decimal places.
#[must_use]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Average order value: 0 when there are no orders, else revenue / orders
/// rounded to 2 decimal places.
#[must_use]
pub fn average_order_value(revenue: Decimal, orders: u64) -> Decimal {
    if orders == 0 {
        Decimal::ZERO
    } else {
        round2(revenue / Decimal::from(orders))
    }
}

/// Month-over-month growth percentage.
///
/// `(current - previous) / previous * 100` when `previous > 0`; otherwise
/// 100 when `current > 0`, else 0. Rounded to 2 decimal places.
#[must_use]
pub fn growth_percent(current: Decimal, previous: Decimal) -> Decimal {
    if previous > Decimal::ZERO {
        round2((current - previous) / previous * Decimal::from(100))
    } else if current > Decimal::ZERO {
        Decimal::from(100)
    } else {
        Decimal::ZERO
    }
}
