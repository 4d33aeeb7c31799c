use std::{fmt, str::FromStr};

use crate::EngineError;

/// Largest amount the ledger accepts for a single value (10^15 Toman).
///
/// Far above any real price, and low enough that sums over many records
/// cannot reach `i64::MAX`.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Money amount in whole **Toman**, for parsing and display.
///
/// Ledger records keep plain `i64` fields (that is what the JSON snapshot
/// stores); wrap them in `Money` to format or parse them.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!(Money::new(1_500_000).to_string(), "1,500,000");
/// assert_eq!(Money::new(-42_000).to_string(), "-42,000");
/// ```
///
/// Parsing accepts thousands separators but no fractions or signs:
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("1,500,000".parse::<Money>().unwrap().value(), 1_500_000);
/// assert!("-10".parse::<Money>().is_err());
/// assert!("10.5".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{sign}{grouped}")
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a non-negative integer amount.
    ///
    /// `,`, `_`, `'` and blanks are accepted as thousands separators and
    /// dropped. Anything else that is not an ASCII digit is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ',' | '_' | '\'') && !c.is_whitespace())
            .collect();

        if cleaned.is_empty() {
            return Err(EngineError::Validation("empty amount".to_string()));
        }
        if !cleaned.chars().all(|c| c.is_ascii_digit()) {
            return Err(EngineError::Validation(format!(
                "\"{}\" is not a whole number",
                s.trim()
            )));
        }

        match cleaned.parse::<i64>() {
            Ok(value) if value <= MAX_AMOUNT => Ok(Money(value)),
            _ => Err(EngineError::Validation(format!(
                "amount too large (at most {})",
                Money(MAX_AMOUNT)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_groups_thousands() {
        assert_eq!(Money::new(0).to_string(), "0");
        assert_eq!(Money::new(999).to_string(), "999");
        assert_eq!(Money::new(1_000).to_string(), "1,000");
        assert_eq!(Money::new(12_345_678).to_string(), "12,345,678");
        assert_eq!(Money::new(-150_000).to_string(), "-150,000");
    }

    #[test]
    fn parse_strips_separators() {
        assert_eq!("15000000".parse::<Money>().unwrap().value(), 15_000_000);
        assert_eq!(" 15,000,000 ".parse::<Money>().unwrap().value(), 15_000_000);
        assert_eq!("15 000 000".parse::<Money>().unwrap().value(), 15_000_000);
        assert_eq!("15_000".parse::<Money>().unwrap().value(), 15_000);
    }

    #[test]
    fn parse_rejects_signs_fractions_and_words() {
        assert!("-5".parse::<Money>().is_err());
        assert!("+5".parse::<Money>().is_err());
        assert!("12.5".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn parse_caps_amounts() {
        assert_eq!(
            "1,000,000,000,000,000".parse::<Money>().unwrap().value(),
            MAX_AMOUNT
        );
        assert!("1,000,000,000,000,001".parse::<Money>().is_err());
        assert!("5000000000000000000".parse::<Money>().is_err());
    }
}
