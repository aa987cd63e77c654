//! Fixed-point decimal arithmetic
//!
//! Every rank, residual and parameter in the engine is a [`Fixed`]: a signed
//! 64-bit integer scaled by 10^6. All operators re-round their result to six
//! fractional digits with ROUND_HALF_UP (ties away from zero), so callers never
//! pass a rounding mode around.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

/// Number of fractional digits carried by [`Fixed`]
pub const SCALE: u32 = 6;

const UNIT: i64 = 1_000_000;

/// A decimal with six fractional digits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(i64);

/// Error returned when a string is not a plain decimal number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFixedError {
    input: String,
}

impl fmt::Display for ParseFixedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid decimal literal '{}' (expected plain digits such as 0.85)",
            self.input
        )
    }
}

impl std::error::Error for ParseFixedError {}

/// Divide with ROUND_HALF_UP semantics (ties away from zero).
fn round_div(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) != (denominator < 0) {
            quotient - 1
        } else {
            quotient + 1
        }
    } else {
        quotient
    }
}

fn saturate(value: i128) -> Fixed {
    Fixed(value.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(UNIT);

    /// Build from the underlying scaled integer (`raw / 10^6`)
    pub const fn from_raw(raw: i64) -> Self {
        Fixed(raw)
    }

    /// The underlying scaled integer
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// `numerator / denominator`, rounded to the fixed scale.
    ///
    /// Returns `None` when `denominator` is zero.
    pub fn from_ratio(numerator: u128, denominator: u128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        // Widen before scaling so that large denominators (epsilon_scale * N) never overflow.
        let scaled = numerator.saturating_mul(UNIT as u128);
        let quotient = scaled / denominator;
        let remainder = scaled % denominator;
        let rounded = if remainder.saturating_mul(2) >= denominator {
            quotient + 1
        } else {
            quotient
        };
        Some(Fixed(rounded.min(i64::MAX as u128) as i64))
    }

    /// Divide by a positive integer count (an out-degree).
    pub fn div_count(self, count: u64) -> Self {
        saturate(round_div(self.0 as i128, count as i128))
    }

    pub fn abs(self) -> Self {
        Fixed(self.0.saturating_abs())
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Fixed {
    type Output = Fixed;

    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Fixed {
    type Output = Fixed;

    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.saturating_sub(rhs.0))
    }
}

impl Mul for Fixed {
    type Output = Fixed;

    fn mul(self, rhs: Fixed) -> Fixed {
        saturate(round_div(self.0 as i128 * rhs.0 as i128, UNIT as i128))
    }
}

impl Sum for Fixed {
    fn sum<I: Iterator<Item = Fixed>>(iter: I) -> Fixed {
        iter.fold(Fixed::ZERO, |acc, x| acc + x)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{}.{:06}",
            sign,
            magnitude / UNIT as u64,
            magnitude % UNIT as u64
        )
    }
}

impl FromStr for Fixed {
    type Err = ParseFixedError;

    /// Accepts `[+-]digits[.digits]`; digits past the sixth fractional place
    /// are rounded half-up.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFixedError { input: s.to_string() };
        let trimmed = s.trim();

        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }

        let int_value: i128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| err())?
        };

        let mut frac_value: i128 = 0;
        for (i, digit) in frac_part.bytes().take(SCALE as usize).enumerate() {
            frac_value += (digit - b'0') as i128 * 10i128.pow(SCALE - 1 - i as u32);
        }
        if let Some(next) = frac_part.as_bytes().get(SCALE as usize) {
            if *next >= b'5' {
                frac_value += 1;
            }
        }

        let magnitude = int_value
            .checked_mul(UNIT as i128)
            .and_then(|v| v.checked_add(frac_value))
            .filter(|v| *v <= i64::MAX as i128)
            .ok_or_else(err)?;

        let signed = if negative { -magnitude } else { magnitude };
        Ok(Fixed(signed as i64))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Fixed {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Fixed {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
