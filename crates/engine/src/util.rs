//! Internal helpers for input normalization and validation.
//!
//! These utilities are **not** part of the public API. They centralize the
//! checks every operation shares so the ledger enforces consistent rules.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, MAX_AMOUNT, Money, ResultEngine};

/// NFC-normalizes and trims free text.
pub(crate) fn normalize_text(value: &str) -> String {
    value.trim().nfc().collect()
}

/// Like [`normalize_text`] but rejects blank values.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let normalized = normalize_text(value);
    if normalized.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(normalized)
}

pub(crate) fn ensure_non_negative(amount: i64, label: &str) -> ResultEngine<()> {
    if amount < 0 {
        return Err(EngineError::Validation(format!("{label} must be >= 0")));
    }
    ensure_within_cap(amount, label)
}

pub(crate) fn ensure_positive(amount: i64, label: &str) -> ResultEngine<()> {
    if amount <= 0 {
        return Err(EngineError::Validation(format!("{label} must be > 0")));
    }
    ensure_within_cap(amount, label)
}

fn ensure_within_cap(amount: i64, label: &str) -> ResultEngine<()> {
    if amount > MAX_AMOUNT {
        return Err(EngineError::Validation(format!(
            "{label} must be at most {}",
            Money::new(MAX_AMOUNT)
        )));
    }
    Ok(())
}

/// `true` for `0..=MAX_AMOUNT`.
pub(crate) fn in_amount_range(amount: i64) -> bool {
    (0..=MAX_AMOUNT).contains(&amount)
}

/// Sums in `i128` and clamps into `i64`, so derived figures never overflow.
pub(crate) fn clamped_sum(values: impl IntoIterator<Item = i128>) -> i64 {
    let total: i128 = values.into_iter().sum();
    i64::try_from(total).unwrap_or(if total < 0 { i64::MIN } else { i64::MAX })
}

/// `a + b + ...` without silent overflow.
pub(crate) fn checked_sum(parts: &[i64], label: &str) -> ResultEngine<i64> {
    parts
        .iter()
        .try_fold(0i64, |acc, part| acc.checked_add(*part))
        .ok_or_else(|| EngineError::Validation(format!("{label} is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_composes_and_trims() {
        // "e" + combining acute accent becomes a single code point.
        assert_eq!(normalize_text("  Cafe\u{301} "), "Caf\u{e9}");
    }

    #[test]
    fn required_rejects_blank() {
        assert!(normalize_required("   ", "model").is_err());
        assert_eq!(normalize_required(" A52 ", "model").unwrap(), "A52");
    }

    #[test]
    fn amounts_above_the_cap_are_rejected() {
        assert!(ensure_non_negative(MAX_AMOUNT, "price").is_ok());
        assert!(ensure_non_negative(MAX_AMOUNT + 1, "price").is_err());
        assert!(ensure_positive(i64::MAX, "payment").is_err());
    }

    #[test]
    fn clamped_sum_saturates() {
        assert_eq!(clamped_sum([1, 2, 3]), 6);
        let huge = i128::from(i64::MAX);
        assert_eq!(clamped_sum([huge, huge]), i64::MAX);
        assert_eq!(clamped_sum([-huge, -huge]), i64::MIN);
    }

    #[test]
    fn checked_sum_reports_overflow() {
        assert_eq!(checked_sum(&[1, 2, 3], "total").unwrap(), 6);
        assert!(checked_sum(&[i64::MAX, 1], "total").is_err());
    }
}
