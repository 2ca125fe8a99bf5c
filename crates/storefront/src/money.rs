//! Displayed prices.
//!
//! The storefront shows prices as `$29.99`. [`Price`] holds an amount in
//! whole cents; conversion to cents rounds half away from zero, which for the
//! non-negative prices of a shop is the same as fixed-point formatting to two
//! decimals (ties go up).
//!
//! Totals are computed from the unrounded amounts ([`parse_amount`]) and
//! rounded once at the end ([`round_to_cents`]), so sub-cent display values
//! never round per line.

use std::fmt;
use std::str::FromStr;

use crate::result::{ShopError, ShopResult};

/// Currency symbols accepted in front of an amount
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£'];

/// Largest magnitude in cents that converts to `i64` without saturating
const MAX_CENTS: f64 = 9.0e18;

/// A price in cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: i64,
}

impl Price {
    /// Zero
    pub const ZERO: Self = Self { cents: 0 };

    /// From whole cents
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Whole cents
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.cents
    }

    /// Amount as a decimal number with two fractional digits
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Sum, or `InvalidNumber` when it does not fit
    pub fn checked_add(self, rhs: Self) -> ShopResult<Self> {
        self.cents
            .checked_add(rhs.cents)
            .map(Self::from_cents)
            .ok_or_else(|| ShopError::InvalidNumber {
                text: format!("{self} + {rhs}"),
            })
    }

    /// Exact sum of `prices`
    pub fn total<I: IntoIterator<Item = Self>>(prices: I) -> ShopResult<Self> {
        prices
            .into_iter()
            .try_fold(Self::ZERO, |total, price| total.checked_add(price))
    }
}

/// Amount of displayed text such as `"$29.99"`, `" 9.99 "` or `"$15"`,
/// unrounded
pub fn parse_amount(text: &str) -> ShopResult<f64> {
    let amount = text.trim().trim_start_matches(CURRENCY_SYMBOLS).trim();
    match amount.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ShopError::InvalidNumber {
            text: text.to_string(),
        }),
    }
}

/// `value` rounded to two decimals, ties away from zero
#[must_use]
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl FromStr for Price {
    type Err = ShopError;

    /// Parse displayed text, rounding to the nearest cent
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let cents = (parse_amount(text)? * 100.0).round();
        if cents.abs() > MAX_CENTS {
            return Err(ShopError::InvalidNumber {
                text: text.to_string(),
            });
        }
        Ok(Self::from_cents(cents as i64))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_with_symbol() {
            assert_eq!("$29.99".parse::<Price>().unwrap().cents(), 2999);
            assert_eq!(" $9.99 ".parse::<Price>().unwrap().cents(), 999);
            assert_eq!("15".parse::<Price>().unwrap().cents(), 1500);
        }

        #[test]
        fn test_half_cent_rounds_up() {
            assert_eq!("$0.125".parse::<Price>().unwrap().cents(), 13);
            assert_eq!("$0.375".parse::<Price>().unwrap().cents(), 38);
        }

        #[test]
        fn test_amount_is_unrounded() {
            assert_eq!(parse_amount("$0.005").unwrap(), 0.005);
            assert_eq!(parse_amount(" 29.99 ").unwrap(), 29.99);
            assert!(matches!(
                parse_amount("$").unwrap_err(),
                ShopError::InvalidNumber { .. }
            ));
        }

        #[test]
        fn test_out_of_range_is_rejected() {
            let err = "$1e17".parse::<Price>().unwrap_err();
            assert!(matches!(err, ShopError::InvalidNumber { .. }));
            assert_eq!("$1e15".parse::<Price>().unwrap().cents(), 100_000_000_000_000_000);
        }

        #[test]
        fn test_rejects_garbage() {
            for text in ["", "$", "free", "$NaN", "$inf"] {
                let err = text.parse::<Price>().unwrap_err();
                assert!(matches!(err, ShopError::InvalidNumber { .. }), "{text}");
            }
        }
    }

    mod arithmetic_tests {
        use super::*;

        #[test]
        fn test_cart_total() {
            let total = Price::total(
                ["$29.99", "$9.99"].iter().map(|t| t.parse::<Price>().unwrap()),
            )
            .unwrap();
            assert_eq!(total.cents(), 3998);
            assert_eq!(total.as_f64(), 39.98);
        }

        #[test]
        fn test_overflow_is_an_error() {
            let big = Price::from_cents(i64::MAX - 1);
            let err = big.checked_add(Price::from_cents(2)).unwrap_err();
            assert!(matches!(err, ShopError::InvalidNumber { .. }));
            assert!(Price::total([big, Price::from_cents(5)]).is_err());
            assert_eq!(big.checked_add(Price::from_cents(1)).unwrap().cents(), i64::MAX);
        }

        #[test]
        fn test_round_once_after_summing() {
            let sum: f64 = ["$0.005", "$0.005"]
                .iter()
                .map(|t| parse_amount(t).unwrap())
                .sum();
            assert_eq!(round_to_cents(sum), 0.01);
            assert_eq!(round_to_cents(29.99 + 9.99), 39.98);
            assert_eq!(round_to_cents(0.125), 0.13);
        }

        #[test]
        fn test_display() {
            assert_eq!(Price::from_cents(2999).to_string(), "$29.99");
            assert_eq!(Price::from_cents(5).to_string(), "$0.05");
            assert_eq!(Price::from_cents(-150).to_string(), "-$1.50");
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Formatting then parsing yields the same amount
            #[test]
            fn prop_display_parse_identity(cents in 0i64..10_000_000) {
                let price = Price::from_cents(cents);
                prop_assert_eq!(price.to_string().parse::<Price>().unwrap(), price);
            }

            /// A total never drifts from the sum of its parts in cents
            #[test]
            fn prop_sum_is_exact(parts in proptest::collection::vec(0i64..100_000, 0..20)) {
                let total = Price::total(
                    parts
                        .iter()
                        .map(|c| format!("${}.{:02}", c / 100, c % 100).parse::<Price>().unwrap()),
                )
                .unwrap();
                prop_assert_eq!(total.cents(), parts.iter().sum::<i64>());
            }
        }
    }
}
