//! Lenient text-to-value coercion for DTE fields.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;

use super::Numeric;

/// Trim `text`; whitespace-only text counts as absent.
pub fn non_blank(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}

/// Coerce already-trimmed text to an integer.
///
/// Tries an integer parse, then a decimal parse (plain or scientific)
/// truncated toward zero. Anything else is returned unchanged as
/// [`Numeric::Raw`].
pub fn coerce_int(text: &str) -> Numeric {
    if let Ok(n) = text.parse::<i64>() {
        return Numeric::Int(n);
    }
    parse_decimal(text)
        .and_then(|d| d.trunc().to_i64())
        .map(Numeric::Int)
        .unwrap_or_else(|| Numeric::Raw(text.to_string()))
}

/// Absent-aware wrapper: blank text is absent, everything else is coerced.
pub fn coerce_field(text: Option<&str>) -> Option<Numeric> {
    text.and_then(non_blank).map(coerce_int)
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
