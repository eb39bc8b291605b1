//! Amount parsing for OCR'd receipt prices.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

lazy_static! {
    /// Anything that cannot be part of a plain decimal number.
    static ref NON_NUMERIC: Regex = Regex::new(r"[^0-9.\-]").unwrap();
}

/// Outcome of parsing a raw amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedAmount {
    /// A well-formed number.
    Value(Decimal),
    /// Nothing numeric was left after cleanup, or it did not parse.
    Unparsable,
}

impl ParsedAmount {
    /// The amount, with unparsable input counted as zero.
    pub fn or_zero(self) -> Decimal {
        match self {
            ParsedAmount::Value(v) => v,
            ParsedAmount::Unparsable => Decimal::ZERO,
        }
    }
}

/// Strip currency symbols, thousands separators and other noise, keeping
/// only digits, `.` and `-`.
///
/// Every `.` and `-` survives, wherever it sits, so `"£1.85."` cleans to
/// `"1.85."` and then fails to parse. Stray points are not repaired.
pub fn clean_amount(raw: &str) -> String {
    NON_NUMERIC.replace_all(raw, "").into_owned()
}

/// Parse a raw receipt amount such as `"£1.85"`, `"1,234.50"` or `"£-0.50"`.
///
/// Input with more than one decimal point or a trailing minus does not
/// parse.
pub fn parse_amount(raw: &str) -> ParsedAmount {
    let cleaned = clean_amount(raw);
    if cleaned.is_empty() {
        return ParsedAmount::Unparsable;
    }

    match Decimal::from_str(&cleaned) {
        Ok(value) => ParsedAmount::Value(value),
        Err(e) => {
            debug!("Amount {:?} (cleaned {:?}) did not parse: {}", raw, cleaned, e);
            ParsedAmount::Unparsable
        }
    }
}
