use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Round to cents, half away from zero, and pin the scale so `1.5` renders as `1.50`.
pub fn normalize(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Render an amount the way receipts and dashboards show it: `₱12,500.00`.
pub fn format_currency(amount: Decimal) -> String {
    let normalized = normalize(amount);
    let negative = normalized < Decimal::ZERO;
    let digits = normalized.abs().to_string();
    let (whole, cents) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, ch) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}₱{grouped}.{cents}", if negative { "-" } else { "" })
}
