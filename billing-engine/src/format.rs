//! Shared display formatting: money, dates, filenames.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::totals::round_money;

/// Format a monetary value with thousands separators and the given
/// currency symbol: 9600 -> "9,600.00 EUR".
pub fn format_money(value: Decimal, symbol: &str) -> String {
    let rounded = round_money(value);
    let negative = rounded.is_sign_negative();
    let text = rounded.abs().to_string();
    let (integral, fraction) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), format!("{:0<2}", f)),
        None => (text, "00".to_string()),
    };

    let grouped = integral
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect::<Vec<_>>()
        .join(",");

    let sign = if negative { "-" } else { "" };
    if symbol.is_empty() {
        format!("{}{}.{}", sign, grouped, fraction)
    } else {
        format!("{}{}.{} {}", sign, grouped, fraction, symbol)
    }
}

/// Format a date as DD.MM.YYYY.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Reduce a string to a filename-safe slug: lowercase alphanumerics
/// with single dashes.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut dash_pending = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if dash_pending && !out.is_empty() {
                out.push('-');
            }
            dash_pending = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            dash_pending = true;
        }
    }
    out
}
