//! Price labels shown next to catalog products.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceKind {
    /// A fixed price.
    Exact,
    /// A starting price; the final price depends on size and finish.
    From,
    /// No published price.
    OnRequest,
}

impl PriceKind {
    pub fn of(price: Option<Decimal>, price_from: bool) -> Self {
        match (price, price_from) {
            (None, _) => PriceKind::OnRequest,
            (Some(_), true) => PriceKind::From,
            (Some(_), false) => PriceKind::Exact,
        }
    }
}

pub fn format_price(kind: PriceKind, amount: Option<Decimal>, currency: &str) -> String {
    let amount = match (kind, amount) {
        (PriceKind::OnRequest, _) | (_, None) => return "Price on request".to_string(),
        (_, Some(amount)) => format_amount(amount),
    };
    match kind {
        PriceKind::From => format!("from {amount} {currency}"),
        _ => format!("{amount} {currency}"),
    }
}

/// Groups the integer part by thousands; keeps two decimals only when
/// the fractional part is non-zero.
fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let whole = rounded.trunc();
    let fraction = (rounded - whole).abs();

    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.insert(0, '-');
    }

    if fraction.is_zero() {
        grouped
    } else {
        let cents = (fraction * Decimal::ONE_HUNDRED).trunc().to_string();
        format!("{grouped}.{cents:0>2}")
    }
}
