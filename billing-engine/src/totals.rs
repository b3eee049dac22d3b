//! Financial Calculator.
//!
//! Pure decimal arithmetic over the position list. Intermediate values
//! are never rounded — only [`round_money`] at the display/persistence
//! edge snaps to 2 fractional digits, so rounding error cannot
//! compound across steps.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::model::{Discount, DiscountBase, DiscountKind, Position};

/// Derived document totals, exact (unrounded) decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub net_subtotal: Decimal,
    pub discount_amount: Decimal,
    pub net_after_discount: Decimal,
    pub tax_amount: Decimal,
    pub gross_total: Decimal,
}

/// Round a monetary value for display or persistence (2 digits,
/// midpoint away from zero).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Net sum of the item rows among the first `upto` positions. Feeds
/// `subtotal` rows during rendering.
pub fn running_net(positions: &[Position], upto: usize) -> Decimal {
    positions[..upto.min(positions.len())]
        .iter()
        .map(Position::net_amount)
        .sum()
}

/// Compute document totals from positions, tax rate (percent) and the
/// document-level discount.
///
/// Deterministic and total: degenerate inputs (zero tax rate, empty
/// positions, over-large discounts) yield valid results. The discount
/// amount is clamped to its basis so net and gross can never go
/// negative.
///
/// The gross-basis back-out divides by the tax factor, which assumes a
/// single uniform tax rate for the whole document. Mixed per-line
/// rates would need a different model.
pub fn compute_totals(positions: &[Position], tax_rate: Decimal, discount: &Discount) -> Totals {
    let net_subtotal: Decimal = positions.iter().map(Position::net_amount).sum();
    let tax_factor = Decimal::ONE + tax_rate / Decimal::ONE_HUNDRED;
    let tax_rate_factor = tax_factor - Decimal::ONE;

    if !discount.is_active() {
        let tax_amount = net_subtotal * tax_rate_factor;
        return Totals {
            net_subtotal,
            discount_amount: Decimal::ZERO,
            net_after_discount: net_subtotal,
            tax_amount,
            gross_total: net_subtotal + tax_amount,
        };
    }

    match discount.base {
        DiscountBase::Net => {
            let raw = match discount.kind {
                DiscountKind::Percent => net_subtotal * discount.value / Decimal::ONE_HUNDRED,
                DiscountKind::Amount => discount.value,
            };
            let discount_amount = clamp(raw, net_subtotal);
            let net_after_discount = net_subtotal - discount_amount;
            let tax_amount = net_after_discount * tax_rate_factor;
            Totals {
                net_subtotal,
                discount_amount,
                net_after_discount,
                tax_amount,
                gross_total: net_after_discount + tax_amount,
            }
        }
        DiscountBase::Gross => {
            let gross_before = net_subtotal * tax_factor;
            let raw = match discount.kind {
                DiscountKind::Percent => gross_before * discount.value / Decimal::ONE_HUNDRED,
                DiscountKind::Amount => discount.value,
            };
            let discount_amount = clamp(raw, gross_before);
            let gross_after = gross_before - discount_amount;
            let net_after_discount = gross_after / tax_factor;
            Totals {
                net_subtotal,
                discount_amount,
                net_after_discount,
                tax_amount: gross_after - net_after_discount,
                gross_total: gross_after,
            }
        }
    }
}

fn clamp(value: Decimal, basis: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(basis)
}
