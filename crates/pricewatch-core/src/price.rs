//! Localized (pt-BR) money parsing and formatting.
//!
//! Prices travel through the system as the strings the resolver produced
//! (`"R$ 1.234,56"`). They are only turned into numbers for comparison, and
//! anything that is not a recognizable amount compares as `f64::INFINITY`,
//! i.e. worse than every real price.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::NOT_AVAILABLE;

const CURRENCY_SYMBOL: &str = "R$";

static MONEY_PATTERN: OnceLock<Regex> = OnceLock::new();

fn money_pattern() -> &'static Regex {
    MONEY_PATTERN.get_or_init(|| {
        Regex::new(r"^(?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d+)?$").expect("Invalid regex")
    })
}

/// Parse a formatted price into a comparable number.
///
/// Returns `f64::INFINITY` for `None`, the `"N/A"` marker, or any text that
/// does not match the `R$ 1.234,56` shape. Never fails.
///
/// # Examples
///
/// ```
/// use pricewatch_core::price::parse_price;
///
/// assert_eq!(parse_price(Some("R$ 1.234,56")), 1234.56);
/// assert!(parse_price(Some("N/A")).is_infinite());
/// ```
#[must_use]
pub fn parse_price(text: Option<&str>) -> f64 {
    let Some(text) = text else {
        return f64::INFINITY;
    };
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case(NOT_AVAILABLE) {
        return f64::INFINITY;
    }

    let digits: String = trimmed
        .strip_prefix(CURRENCY_SYMBOL)
        .unwrap_or(trimmed)
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();

    if !money_pattern().is_match(&digits) {
        return f64::INFINITY;
    }

    digits
        .replace('.', "")
        .replace(',', ".")
        .parse::<f64>()
        .unwrap_or(f64::INFINITY)
}

/// Format an amount as `R$ 1.234,56`. Non-finite amounts render as `"N/A"`.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // cents of any realistic price fit in i64
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let cents = (value.abs() * 100.0).round() as i64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, ch) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{CURRENCY_SYMBOL} {grouped},{fraction:02}")
}

/// Whether `text` is a price that parses to a finite amount.
#[must_use]
pub fn is_priced(text: Option<&str>) -> bool {
    parse_price(text).is_finite()
}
