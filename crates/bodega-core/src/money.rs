//! Monetary derivation shared by every component. Amounts are integer
//! currency units; the VAT (IVA) rate is fixed at 19% for this domain.

use rust_decimal::{Decimal, RoundingStrategy};

fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// 1.19, the gross-over-net factor at the fixed 19% rate.
fn gross_factor() -> Decimal {
    Decimal::new(119, 2)
}

pub fn net(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round_currency(quantity * unit_price)
}

pub fn gross(net: Decimal) -> Decimal {
    round_currency(net * gross_factor())
}

pub fn tax(net: Decimal, gross: Decimal) -> Decimal {
    gross - net
}
