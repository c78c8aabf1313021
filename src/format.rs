use rust_decimal::{Decimal, RoundingStrategy};

/// Format a balance with thousands separators, no decimals and a currency
/// suffix: `1234567` -> `1,234,567 원`.
///
/// Halves round to even, so `2.5` shows as `2`.
pub fn format_balance(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = rounded.abs().trunc().to_string();
    let grouped = group_thousands(&digits);

    if currency.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{} {}", sign, grouped, currency)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
