//! # Displayed Numbers and Decimal Rounding
//!
//! Table cells show numbers the way a paper prints them: `1,234`,
//! `(0.052)`, `-0.31***`, `−2.4`. [`DisplayedNumber::parse`] strips the
//! decoration, determines the sign and records how many decimals were
//! printed. That count fixes the precision at which log tokens are compared.
//!
//! Rounding is done on the decimal digits as printed, half away from zero.
//! Rounding an `f64` instead would depend on where the nearest double
//! falls: `2.675` is stored below the half and `3.095` above it. On the
//! digits both sit exactly on the half and round up.

use serde::{Deserialize, Serialize};

use rrmap_core::NotANumber;

/// How a value enclosed in parentheses is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParenthesesPolicy {
    /// `(0.5)` means `-0.5` (accounting convention).
    #[default]
    Negative,
    /// Parentheses are decoration only, e.g. standard errors under a
    /// coefficient.
    Ignore,
}

/// A number written in plain decimal notation, kept as digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalText {
    negative: bool,
    int_digits: String,
    frac_digits: String,
}

/// A decimal rounded to a fixed number of places; comparable with `==`.
///
/// Holds the sign and the scaled digit string without leading zeros.
/// Zero is never negative, so `-0.00` equals `0.00`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rounded {
    negative: bool,
    scaled: String,
}

impl DecimalText {
    /// Parse `-?digits?(.digits?)?` with at least one digit.
    pub fn parse(token: &str) -> Option<Self> {
        let (negative, body) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let (int_digits, frac_digits) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_digits) || !all_digits(frac_digits) {
            return None;
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }
        Some(Self {
            negative,
            int_digits: int_digits.to_string(),
            frac_digits: frac_digits.to_string(),
        })
    }

    /// Number of digits after the decimal point.
    pub fn decimal_places(&self) -> usize {
        self.frac_digits.len()
    }

    /// Canonical text form: `-0.5` for `-.5`, `12` for `12.`.
    pub fn normalized(&self) -> String {
        let mut out = String::with_capacity(self.int_digits.len() + self.frac_digits.len() + 3);
        if self.negative {
            out.push('-');
        }
        if self.int_digits.is_empty() {
            out.push('0');
        } else {
            out.push_str(&self.int_digits);
        }
        if !self.frac_digits.is_empty() {
            out.push('.');
            out.push_str(&self.frac_digits);
        }
        out
    }

    /// Floating-point value, used only for distance ranking.
    pub fn to_f64(&self) -> f64 {
        self.normalized().parse().unwrap_or(f64::NAN)
    }

    /// Round half away from zero to `places` decimals.
    pub fn round_to(&self, places: usize) -> Rounded {
        let mut digits: Vec<u8> = self.int_digits.bytes().map(|b| b - b'0').collect();
        let frac: Vec<u8> = self.frac_digits.bytes().map(|b| b - b'0').collect();
        let round_up = frac.get(places).is_some_and(|&d| d >= 5);
        digits.extend(frac.iter().take(places));
        digits.extend(std::iter::repeat(0).take(places.saturating_sub(frac.len())));

        if round_up {
            let mut carry = true;
            for d in digits.iter_mut().rev() {
                if *d == 9 {
                    *d = 0;
                } else {
                    *d += 1;
                    carry = false;
                    break;
                }
            }
            if carry {
                digits.insert(0, 1);
            }
        }

        let first_nonzero = digits.iter().position(|&d| d != 0);
        let scaled: String = match first_nonzero {
            Some(i) => digits[i..].iter().map(|d| char::from(b'0' + d)).collect(),
            None => String::from("0"),
        };
        Rounded {
            negative: self.negative && first_nonzero.is_some(),
            scaled,
        }
    }
}

/// A table value after decoration has been removed.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedNumber {
    raw: String,
    decimal: DecimalText,
    value: f64,
    rounded: Rounded,
}

impl DisplayedNumber {
    /// Parse a displayed value with the default parentheses policy.
    pub fn parse(displayed: &str) -> Result<Self, NotANumber> {
        Self::parse_with(displayed, ParenthesesPolicy::default())
    }

    /// Parse a displayed value.
    ///
    /// Everything except digits, the decimal point and minus signs is
    /// dropped (grouping commas, significance stars, currency or percent
    /// signs, whitespace). U+2212 counts as a minus. A minus that is not the
    /// first remaining character (as in `1.2e-3`) makes the value
    /// unparsable.
    ///
    /// # Errors
    ///
    /// [`NotANumber`] if no digits remain or the remaining characters do not
    /// form a plain decimal.
    pub fn parse_with(displayed: &str, policy: ParenthesesPolicy) -> Result<Self, NotANumber> {
        let not_a_number = || NotANumber {
            input: displayed.to_string(),
        };

        let compact: String = displayed
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '*')
            .collect();
        let enclosed = compact.starts_with('(') && compact.ends_with(')');

        let kept: String = compact
            .chars()
            .filter_map(|c| match c {
                '0'..='9' | '.' | '-' => Some(c),
                '\u{2212}' => Some('-'),
                _ => None,
            })
            .collect();

        let has_minus = kept.starts_with('-');
        let body = kept.strip_prefix('-').unwrap_or(&kept);
        if body.contains('-') {
            return Err(not_a_number());
        }
        let mut decimal = DecimalText::parse(body).ok_or_else(not_a_number)?;
        decimal.negative = has_minus || (enclosed && policy == ParenthesesPolicy::Negative);
        let value = decimal.to_f64();
        if !value.is_finite() {
            return Err(not_a_number());
        }
        let rounded = decimal.round_to(decimal.decimal_places());

        Ok(Self {
            raw: displayed.to_string(),
            decimal,
            value,
            rounded,
        })
    }

    /// The text as it appeared in the cell.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Sign plus digits, decoration removed (e.g. `-1234.50`).
    pub fn normalized(&self) -> String {
        self.decimal.normalized()
    }

    /// Digits printed after the decimal point.
    pub fn decimal_places(&self) -> usize {
        self.decimal.decimal_places()
    }

    /// Unrounded value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The value rounded at its own printed precision.
    pub fn rounded(&self) -> &Rounded {
        &self.rounded
    }
}
