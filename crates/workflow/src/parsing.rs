//! Operator input parsing.

use engine::{EngineError, Money, ResultEngine};

/// Abandons the current workflow at any step.
pub const CANCEL_TOKEN: &str = "-";
/// Keeps the current value (edits) or takes the empty default (optional
/// fields of new records).
pub const SKIP_TOKEN: &str = ".";

pub fn is_cancel(text: &str) -> bool {
    text.trim() == CANCEL_TOKEN
}

pub fn is_skip(text: &str) -> bool {
    text.trim() == SKIP_TOKEN
}

/// Maps Persian and Arabic-Indic digits (and their separators) to ASCII.
pub fn normalize_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{066C}' | '\u{060C}' => ',',
            other => other,
        })
        .collect()
}

/// Parses a non-negative whole amount such as `15,000,000` or `۱۵۰۰۰۰۰`.
pub fn parse_amount(text: &str) -> ResultEngine<i64> {
    normalize_digits(text)
        .parse::<Money>()
        .map(Money::value)
        .map_err(|_| {
            EngineError::Validation(format!(
                "\"{}\" is not a valid amount; send digits only, e.g. 15000000",
                text.trim()
            ))
        })
}
