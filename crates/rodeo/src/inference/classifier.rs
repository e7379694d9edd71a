//! Per-value primitive type classification.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::PrimitiveType;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

/// Signed base-10 integer without `+`, separators or redundant leading zeros.
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?(0|[1-9][0-9]*)$").unwrap());

/// Decimal number that carries a fractional part and/or an exponent.
static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?(?:[0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap()
});

/// Recognized date shapes paired with the chrono format that validates them.
static DATE_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").unwrap(), "%Y-%m-%d"), // ISO date
        (Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").unwrap(), "%m/%d/%Y"), // US date
        (Regex::new(r"^\d{4}/\d{1,2}/\d{1,2}$").unwrap(), "%Y/%m/%d"), // Alt ISO
    ]
});

/// Classify a raw textual value.
///
/// Total: anything that is not recognized as a number, date or boolean is a
/// `string`. Checks run in order and the first match wins:
///
/// 1. empty or whitespace-only -> `string`
/// 2. signed integer (`"007"` is an identifier, so `string`) -> `int`
/// 3. decimal with a fractional part or exponent -> `float`
/// 4. `YYYY-MM-DD`, `MM/DD/YYYY`, `YYYY/MM/DD` that is a real calendar day -> `date`
/// 5. `true`/`false`/`yes`/`no`, any case -> `boolean`
///
/// ```
/// use rodeo::{classify, PrimitiveType};
///
/// assert_eq!(classify("42"), PrimitiveType::Int);
/// assert_eq!(classify("007"), PrimitiveType::String);
/// assert_eq!(classify("2021-05-01"), PrimitiveType::Date);
/// ```
pub fn classify(value: &str) -> PrimitiveType {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return PrimitiveType::String;
    }

    if is_integer(trimmed) {
        return PrimitiveType::Int;
    }

    if is_float(trimmed) {
        return PrimitiveType::Float;
    }

    if is_date(trimmed) {
        return PrimitiveType::Date;
    }

    if is_boolean(trimmed) {
        return PrimitiveType::Boolean;
    }

    PrimitiveType::String
}

fn is_integer(value: &str) -> bool {
    INTEGER.is_match(value) && value.parse::<i64>().is_ok()
}

fn is_float(value: &str) -> bool {
    if !FLOAT.is_match(value) {
        return false;
    }
    // Plain digit runs were already rejected as integers (leading zeros, overflow).
    let has_fraction_or_exponent = value.contains(['.', 'e', 'E']);
    has_fraction_or_exponent && value.parse::<f64>().is_ok_and(|v| v.is_finite())
}

fn is_date(value: &str) -> bool {
    DATE_PATTERNS
        .iter()
        .any(|(pattern, format)| {
            pattern.is_match(value) && NaiveDate::parse_from_str(value, format).is_ok()
        })
}

fn is_boolean(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "false" | "yes" | "no"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_types() {
        assert_eq!(classify("42"), PrimitiveType::Int);
        assert_eq!(classify("-17"), PrimitiveType::Int);
        assert_eq!(classify("0"), PrimitiveType::Int);
        assert_eq!(classify("42.5"), PrimitiveType::Float);
        assert_eq!(classify("2021-05-01"), PrimitiveType::Date);
        assert_eq!(classify("true"), PrimitiveType::Boolean);
        assert_eq!(classify("hello"), PrimitiveType::String);
    }

    #[test]
    fn test_leading_zeros_are_identifiers() {
        assert_eq!(classify("007"), PrimitiveType::String);
        assert_eq!(classify("00"), PrimitiveType::String);
        assert_eq!(classify("-01"), PrimitiveType::String);
    }

    #[test]
    fn test_integer_edge_cases() {
        assert_eq!(classify("+5"), PrimitiveType::String);
        assert_eq!(classify("1,000"), PrimitiveType::String);
        // Overflows i64 and has no fraction.
        assert_eq!(classify("99999999999999999999999"), PrimitiveType::String);
    }

    #[test]
    fn test_float_forms() {
        assert_eq!(classify("1e10"), PrimitiveType::Float);
        assert_eq!(classify("-3.25E-4"), PrimitiveType::Float);
        assert_eq!(classify(".5"), PrimitiveType::Float);
        assert_eq!(classify("0.0"), PrimitiveType::Float);
        assert_eq!(classify("nan"), PrimitiveType::String);
        assert_eq!(classify("inf"), PrimitiveType::String);
        assert_eq!(classify("1.2.3"), PrimitiveType::String);
    }

    #[test]
    fn test_dates() {
        assert_eq!(classify("05/01/2021"), PrimitiveType::Date);
        assert_eq!(classify("2021/05/01"), PrimitiveType::Date);
        assert_eq!(classify("2021-02-30"), PrimitiveType::String);
        assert_eq!(classify("13/01/2021"), PrimitiveType::String);
        assert_eq!(classify("2021-05-01T10:00:00"), PrimitiveType::String);
    }

    #[test]
    fn test_booleans() {
        assert_eq!(classify("YES"), PrimitiveType::Boolean);
        assert_eq!(classify("False"), PrimitiveType::Boolean);
        assert_eq!(classify("no"), PrimitiveType::Boolean);
        assert_eq!(classify("t"), PrimitiveType::String);
    }

    #[test]
    fn test_blank() {
        assert_eq!(classify(""), PrimitiveType::String);
        assert_eq!(classify("   "), PrimitiveType::String);
        assert_eq!(classify(" 12 "), PrimitiveType::Int);
    }
}
