//! Exact numerator/denominator values.
//!
//! A [`Numeric`] is how GnuCash stores every split value and quantity: the
//! text `"250/100"` or `"-3"`, read back without any floating point rounding.
//!
//! Two rules differ from ordinary rational arithmetic and are relied upon by
//! the rest of the workspace:
//!
//! - **Zero**: a value is zero when *either* its numerator or its denominator
//!   is zero, so `1/0`, `0/0` and `0/7` are all zero and all equal.
//! - **Equality**: non-zero values are compared as stored, never reduced.
//!   `1/1` and `10/10` denote the same quantity but are **not** equal.
//!
//! # Example
//!
//! ```
//! use rustcash_core::Numeric;
//!
//! let a: Numeric = "1/2".parse().unwrap();
//! let b: Numeric = "5/10".parse().unwrap();
//!
//! // Sum uses the lcm of the denominators and is not reduced.
//! assert_eq!(&a + &b, Numeric::new(10, 10));
//! assert_ne!(&a + &b, Numeric::new(1, 1));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::num::ParseIntError;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Error returned when the text of a value is neither `N` nor `N/D`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid numeric {input:?}: {source}")]
pub struct ParseNumericError {
    /// The offending text.
    pub input: String,
    /// The integer parse failure of the numerator or denominator.
    #[source]
    pub source: ParseIntError,
}

/// A signed numerator/denominator pair. The denominator is never negative.
///
/// `Numeric::default()` is `0/0`, which is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Numeric {
    num: i64,
    den: i64,
}

impl Numeric {
    /// Create a value, moving the sign onto the numerator when `den` is negative.
    #[must_use]
    pub const fn new(num: i64, den: i64) -> Self {
        if den < 0 {
            Self {
                num: num.wrapping_neg(),
                den: den.wrapping_neg(),
            }
        } else {
            Self { num, den }
        }
    }

    /// Create a whole-number value (`n/1`).
    #[must_use]
    pub const fn from_integer(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    /// The stored numerator.
    #[must_use]
    pub const fn numerator(&self) -> i64 {
        self.num
    }

    /// The stored denominator (always `>= 0`).
    #[must_use]
    pub const fn denominator(&self) -> i64 {
        self.den
    }

    /// True when the numerator or the denominator is zero.
    ///
    /// Must stay consistent with [`Numeric::sign`].
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.num == 0 || self.den == 0
    }

    /// `-1`, `0` or `1`. Returns `0` for every value [`Numeric::is_zero`] accepts.
    #[must_use]
    pub const fn sign(&self) -> i32 {
        if self.is_zero() {
            0
        } else if self.num > 0 {
            1
        } else {
            -1
        }
    }

    /// Approximate the value as a float; zero values give `0.0`.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        self.num as f64 / self.den as f64
    }

    /// Convert to a [`Decimal`], or `None` if the quotient does not fit.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        if self.is_zero() {
            return Some(Decimal::ZERO);
        }
        Decimal::from(self.num).checked_div(Decimal::from(self.den))
    }
}

/// Greatest common divisor of `|a|` and `|b|`.
///
/// `gcd(0, b) == |b|`, `gcd(a, 0) == |a|`.
#[must_use]
pub const fn gcd(a: i64, b: i64) -> i64 {
    let mut a = a.wrapping_abs();
    let mut b = b.wrapping_abs();
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Least common multiple of `|a|` and `|b|`; `0` if either input is `0`.
#[must_use]
pub const fn lcm(a: i64, b: i64) -> i64 {
    if a == 0 || b == 0 {
        return 0;
    }
    let a = a.wrapping_abs();
    let b = b.wrapping_abs();
    (a / gcd(a, b)).wrapping_mul(b)
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        if self.is_zero() {
            return other.is_zero();
        }
        self.num == other.num && self.den == other.den
    }
}

impl Eq for Numeric {}

impl FromStr for Numeric {
    type Err = ParseNumericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.parse::<i64>().map_err(|source| ParseNumericError {
                input: s.to_string(),
                source,
            })
        };
        match s.split_once('/') {
            None => Ok(Self::from_integer(parse(s)?)),
            Some((num, den)) => Ok(Self::new(parse(num)?, parse(den)?)),
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            write!(f, "0")
        } else if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// Arithmetic operations. There is deliberately no Mul or Div.

impl AddAssign<&Self> for Numeric {
    fn add_assign(&mut self, other: &Self) {
        if other.is_zero() {
            return;
        }
        if self.is_zero() {
            *self = *other;
            return;
        }
        if self.den == other.den {
            self.num = self.num.wrapping_add(other.num);
            return;
        }
        let den = lcm(self.den, other.den);
        self.num = self
            .num
            .wrapping_mul(den / self.den)
            .wrapping_add(other.num.wrapping_mul(den / other.den));
        self.den = den;
    }
}

impl SubAssign<&Self> for Numeric {
    fn sub_assign(&mut self, other: &Self) {
        *self += &-other;
    }
}

impl Neg for &Numeric {
    type Output = Numeric;

    fn neg(self) -> Numeric {
        Numeric {
            num: self.num.wrapping_neg(),
            den: self.den,
        }
    }
}

impl Neg for Numeric {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}

impl Add for &Numeric {
    type Output = Numeric;

    fn add(self, other: &Numeric) -> Numeric {
        let mut sum = *self;
        sum += other;
        sum
    }
}

impl Sub for &Numeric {
    type Output = Numeric;

    fn sub(self, other: &Numeric) -> Numeric {
        let mut diff = *self;
        diff -= other;
        diff
    }
}

impl Add for Numeric {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        &self + &other
    }
}

impl Sub for Numeric {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

impl<'a> Sum<&'a Numeric> for Numeric {
    fn sum<I: Iterator<Item = &'a Numeric>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, n| {
            acc += n;
            acc
        })
    }
}
