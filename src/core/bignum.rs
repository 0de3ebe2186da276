//! Arbitrary-magnitude number type for gold and echo balances
//!
//! Stored as a normalized mantissa/exponent pair so values can outgrow f64
//! without losing the cheap arithmetic an incremental economy needs. The
//! save format persists the two parts verbatim (`*-mantissa`, `*-exponent`,
//! plus `*-is-zero` for exact zero).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Suffixes for short formatting, one per 10^3 step above 10^3.
const SHORT_SUFFIXES: [&str; 7] = ["K", "M", "B", "T", "Qa", "Qi", "Sx"];

/// A number held as `mantissa * 10^exponent`.
///
/// Invariant: either the value is exactly zero (`mantissa == 0.0`,
/// `exponent == 0`) or `1.0 <= |mantissa| < 10.0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BigNumber {
    mantissa: f64,
    exponent: i64,
}

impl BigNumber {
    pub const ZERO: BigNumber = BigNumber {
        mantissa: 0.0,
        exponent: 0,
    };

    pub fn new(value: f64) -> Self {
        Self::from_parts(value, 0)
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    /// Builds a number from a raw mantissa/exponent pair, normalizing it.
    pub fn from_parts(mantissa: f64, exponent: i64) -> Self {
        let mut n = BigNumber { mantissa, exponent };
        n.normalize();
        n
    }

    fn normalize(&mut self) {
        if self.mantissa == 0.0 || !self.mantissa.is_finite() {
            self.mantissa = 0.0;
            self.exponent = 0;
            return;
        }
        while self.mantissa.abs() >= 10.0 {
            self.mantissa /= 10.0;
            self.exponent += 1;
        }
        while self.mantissa.abs() < 1.0 {
            self.mantissa *= 10.0;
            self.exponent -= 1;
        }
    }

    pub fn mantissa(&self) -> f64 {
        self.mantissa
    }

    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0.0
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0.0
    }

    /// Converts to f64, saturating when the exponent is out of range.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        if self.exponent > 307 {
            return if self.mantissa > 0.0 {
                f64::MAX
            } else {
                f64::MIN
            };
        }
        if self.exponent < -307 {
            return 0.0;
        }
        self.mantissa * 10f64.powi(self.exponent as i32)
    }

    /// Base-10 logarithm; meaningful only for positive values.
    pub fn log10(&self) -> f64 {
        if self.mantissa <= 0.0 {
            return f64::NEG_INFINITY;
        }
        self.exponent as f64 + self.mantissa.log10()
    }

    pub fn add(&self, other: BigNumber) -> BigNumber {
        if self.is_zero() {
            return other;
        }
        if other.is_zero() {
            return *self;
        }
        // Align the smaller-exponent operand; beyond ~15 orders of magnitude
        // the smaller value vanishes in f64 anyway.
        let (hi, lo) = if self.exponent >= other.exponent {
            (*self, other)
        } else {
            (other, *self)
        };
        let shift = hi.exponent - lo.exponent;
        if shift > 18 {
            return hi;
        }
        let aligned = lo.mantissa / 10f64.powi(shift as i32);
        BigNumber::from_parts(hi.mantissa + aligned, hi.exponent)
    }

    pub fn sub(&self, other: BigNumber) -> BigNumber {
        self.add(other.neg())
    }

    pub fn neg(&self) -> BigNumber {
        BigNumber {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }

    pub fn mul_f64(&self, factor: f64) -> BigNumber {
        BigNumber::from_parts(self.mantissa * factor, self.exponent)
    }

    /// Clamps negative values to exact zero.
    pub fn max_zero(&self) -> BigNumber {
        if self.is_negative() {
            BigNumber::ZERO
        } else {
            *self
        }
    }

    pub fn compare(&self, other: BigNumber) -> Ordering {
        let self_sign = sign_of(self.mantissa);
        let other_sign = sign_of(other.mantissa);
        if self_sign != other_sign {
            return self_sign.cmp(&other_sign);
        }
        if self_sign == 0 {
            return Ordering::Equal;
        }
        // Same nonzero sign: a larger exponent means a larger magnitude,
        // which for negatives means a smaller value.
        match self.exponent.cmp(&other.exponent) {
            Ordering::Equal => self
                .mantissa
                .partial_cmp(&other.mantissa)
                .unwrap_or(Ordering::Equal),
            ord => {
                if self_sign > 0 {
                    ord
                } else {
                    ord.reverse()
                }
            }
        }
    }

    /// Compact human-readable form: plain digits below 1000, suffixed
    /// thousands up to the suffix table, e-notation beyond.
    pub fn format_short(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let value = self.to_f64();
        if self.exponent < 3 {
            if value == value.trunc() && value.abs() < 1000.0 {
                return format!("{}", value as i64);
            }
            return format!("{:.2}", value);
        }
        let group = (self.exponent / 3) as usize;
        if group <= SHORT_SUFFIXES.len() {
            let scaled = self.mantissa * 10f64.powi((self.exponent % 3) as i32);
            return format!("{:.2}{}", scaled, SHORT_SUFFIXES[group - 1]);
        }
        format!("{:.2}e{}", self.mantissa, self.exponent)
    }
}

fn sign_of(mantissa: f64) -> i8 {
    if mantissa > 0.0 {
        1
    } else if mantissa < 0.0 {
        -1
    } else {
        0
    }
}

impl PartialEq for BigNumber {
    fn eq(&self, other: &Self) -> bool {
        self.compare(*other) == Ordering::Equal
    }
}

impl PartialOrd for BigNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(*other))
    }
}

impl Default for BigNumber {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_short())
    }
}

impl From<f64> for BigNumber {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}
