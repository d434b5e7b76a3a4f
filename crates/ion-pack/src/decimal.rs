//! Arbitrary-precision decimal: `coefficient × 10^exponent`.
//!
//! The coefficient is kept in sign-magnitude form so that negative zero
//! survives (`-0d0` is a distinct Ion value, and a `BigInt` cannot carry a
//! signed zero). Equality is exact over (sign, magnitude, exponent), which
//! makes `1.00` and `1.0` unequal even though they are mathematically the
//! same number; use [`Decimal::equivalent_value`] for numeric comparison.

use std::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use crate::error::{IonError, IonResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    negative: bool,
    magnitude: BigUint,
    exponent: i64,
}

impl Decimal {
    /// Builds a decimal from a signed coefficient and an exponent.
    pub fn new(coefficient: BigInt, exponent: i64) -> Self {
        let negative = coefficient.sign() == Sign::Minus;
        Self {
            negative,
            magnitude: coefficient.magnitude().clone(),
            exponent,
        }
    }

    /// Builds a decimal from explicit sign and magnitude. This is the only
    /// way to construct negative zero.
    pub fn from_parts(negative: bool, magnitude: BigUint, exponent: i64) -> Self {
        Self {
            negative,
            magnitude,
            exponent,
        }
    }

    /// The decimal `-0 × 10^exponent`.
    pub fn negative_zero(exponent: i64) -> Self {
        Self::from_parts(true, BigUint::zero(), exponent)
    }

    pub fn from_i64(value: i64) -> Self {
        Self::new(BigInt::from(value), 0)
    }

    /// The signed coefficient. Negative zero collapses to plain zero here.
    pub fn coefficient(&self) -> BigInt {
        let sign = if self.negative && !self.magnitude.is_zero() {
            Sign::Minus
        } else if self.magnitude.is_zero() {
            Sign::NoSign
        } else {
            Sign::Plus
        };
        BigInt::from_biguint(sign, self.magnitude.clone())
    }

    pub fn magnitude(&self) -> &BigUint {
        &self.magnitude
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Compares mathematical value, ignoring coefficient precision and zero
    /// sign: `1.0`, `1.00`, and `1d0` are all equivalent.
    pub fn equivalent_value(&self, other: &Decimal) -> bool {
        if self.is_zero() && other.is_zero() {
            return true;
        }
        if self.negative != other.negative {
            return false;
        }
        // Scale both coefficients to the smaller exponent and compare.
        let (a, b) = if self.exponent >= other.exponent {
            (
                scale_up(&self.magnitude, (self.exponent - other.exponent) as u64),
                other.magnitude.clone(),
            )
        } else {
            (
                self.magnitude.clone(),
                scale_up(&other.magnitude, (other.exponent - self.exponent) as u64),
            )
        };
        a == b
    }

    /// Parses the Ion text form: `[+-]digits[.digits][(d|D)[+-]digits]`.
    pub fn parse(text: &str) -> IonResult<Decimal> {
        let bytes = text.as_bytes();
        let mut pos = 0;

        let negative = match bytes.first() {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };

        let digits_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == digits_start {
            return Err(invalid(text));
        }
        let mut digits: Vec<u8> = bytes[digits_start..pos].to_vec();

        let mut exponent: i64 = 0;
        if pos < bytes.len() && bytes[pos] == b'.' {
            pos += 1;
            let frac_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            digits.extend_from_slice(&bytes[frac_start..pos]);
            exponent -= (pos - frac_start) as i64;
        }

        if pos < bytes.len() && (bytes[pos] == b'd' || bytes[pos] == b'D') {
            pos += 1;
            let exp_negative = match bytes.get(pos) {
                Some(b'-') => {
                    pos += 1;
                    true
                }
                Some(b'+') => {
                    pos += 1;
                    false
                }
                _ => false,
            };
            let exp_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos == exp_start {
                return Err(invalid(text));
            }
            let exp_text = std::str::from_utf8(&bytes[exp_start..pos]).expect("ascii digits");
            let declared: i64 = exp_text.parse().map_err(|_| invalid(text))?;
            exponent += if exp_negative { -declared } else { declared };
        }

        if pos != bytes.len() {
            return Err(invalid(text));
        }

        let digit_text = std::str::from_utf8(&digits).expect("ascii digits");
        let magnitude = digit_text
            .parse::<BigUint>()
            .map_err(|_| invalid(text))?;
        Ok(Decimal::from_parts(negative, magnitude, exponent))
    }
}

fn invalid(text: &str) -> IonError {
    IonError::malformed(0, format!("invalid decimal '{text}'"))
}

fn scale_up(magnitude: &BigUint, powers: u64) -> BigUint {
    let mut result = magnitude.clone();
    for _ in 0..powers {
        result *= 10u32;
    }
    result
}

impl fmt::Display for Decimal {
    /// Canonical Ion text. Non-positive exponents render in point form
    /// (`1.00`, `0.001`, `123.`), positive exponents use the `d` marker
    /// (`1d3`). Both forms re-parse to the identical coefficient/exponent
    /// pair.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        let digits = self.magnitude.to_string();
        if self.exponent > 0 {
            return write!(f, "{digits}d{}", self.exponent);
        }
        let scale = (-self.exponent) as usize;
        if scale == 0 {
            return write!(f, "{digits}.");
        }
        if scale < digits.len() {
            let split = digits.len() - scale;
            return write!(f, "{}.{}", &digits[..split], &digits[split..]);
        }
        write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal::from_i64(value)
    }
}
