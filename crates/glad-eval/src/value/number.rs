//! Numeric semantics.
//!
//! Integers promote to floats on overflow, `/` always yields a float, and
//! `//` and `%` follow floor semantics (the remainder takes the divisor's
//! sign). Bitwise operators truncate to integers and mask to 32 bits.

use crate::error::{OpError, OpResult};
use glad_types::ErrorKind;
use std::cmp::Ordering;
use std::fmt;

/// Largest exponent `**` accepts.
pub const MAX_EXPONENT: f64 = 10_000.0;

const MASK_32: i64 = 0xFFFF_FFFF;

/// An integer or float.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Truncate toward zero, saturating at the `i64` range.
    pub fn truncate(self) -> i64 {
        match self {
            Number::Int(i) => i,
            Number::Float(f) => f.trunc() as i64,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    pub fn is_truthy(self) -> bool {
        !self.is_zero()
    }

    /// An integral float as an `i64`, if it fits exactly.
    pub fn as_exact_int(self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(i),
            Number::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(f as i64),
            Number::Float(_) => None,
        }
    }

    // ── Arithmetic ────────────────────────────────────────────────────────

    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_add(b)
                .map_or(Number::Float(a as f64 + b as f64), Number::Int),
            (a, b) => Number::Float(a.as_f64() + b.as_f64()),
        }
    }

    pub fn sub(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_sub(b)
                .map_or(Number::Float(a as f64 - b as f64), Number::Int),
            (a, b) => Number::Float(a.as_f64() - b.as_f64()),
        }
    }

    pub fn mul(self, other: Number) -> Number {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a
                .checked_mul(b)
                .map_or(Number::Float(a as f64 * b as f64), Number::Int),
            (a, b) => Number::Float(a.as_f64() * b.as_f64()),
        }
    }

    pub fn div(self, other: Number) -> OpResult<Number> {
        if other.is_zero() {
            return Err(OpError::division_by_zero());
        }
        Ok(Number::Float(self.as_f64() / other.as_f64()))
    }

    pub fn floor_div(self, other: Number) -> OpResult<Number> {
        if other.is_zero() {
            return Err(OpError::division_by_zero());
        }
        Ok(match (self, other) {
            (Number::Int(a), Number::Int(b)) => match a.checked_div(b) {
                Some(q) if a % b != 0 && ((a < 0) != (b < 0)) => Number::Int(q - 1),
                Some(q) => Number::Int(q),
                None => Number::Float((a as f64 / b as f64).floor()),
            },
            (a, b) => Number::Float((a.as_f64() / b.as_f64()).floor()),
        })
    }

    pub fn rem(self, other: Number) -> OpResult<Number> {
        if other.is_zero() {
            return Err(OpError::division_by_zero());
        }
        Ok(match (self, other) {
            (Number::Int(a), Number::Int(b)) => {
                let r = a.checked_rem(b).unwrap_or(0);
                if r != 0 && ((r < 0) != (b < 0)) {
                    Number::Int(r + b)
                } else {
                    Number::Int(r)
                }
            }
            (a, b) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                let r = a % b;
                if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                    Number::Float(r + b)
                } else {
                    Number::Float(r)
                }
            }
        })
    }

    pub fn pow(self, exponent: Number) -> OpResult<Number> {
        if exponent.as_f64() > MAX_EXPONENT {
            return Err(OpError::math_domain("Exponent too large (limit: 10000)"));
        }
        if let (Number::Int(base), Number::Int(exp)) = (self, exponent) {
            if exp >= 0 {
                if let Some(v) = base.checked_pow(exp as u32) {
                    return Ok(Number::Int(v));
                }
            }
        }
        let (base, exp) = (self.as_f64(), exponent.as_f64());
        if base == 0.0 && exp < 0.0 {
            return Err(OpError::new(
                ErrorKind::DivisionByZero,
                "0.0 cannot be raised to a negative power",
            ));
        }
        if base < 0.0 && exp.fract() != 0.0 {
            return Err(OpError::math_domain("Math domain error: result is complex"));
        }
        let result = base.powf(exp);
        if result.is_nan() {
            return Err(OpError::math_domain("Math domain error: result is NaN"));
        }
        if result.is_infinite() && base.is_finite() && exp.is_finite() {
            return Err(OpError::math_domain("Math domain error: result is too large"));
        }
        Ok(Number::Float(result))
    }

    pub fn neg(self) -> Number {
        match self {
            Number::Int(i) => i.checked_neg().map_or(Number::Float(-(i as f64)), Number::Int),
            Number::Float(f) => Number::Float(-f),
        }
    }

    // ── Comparison ────────────────────────────────────────────────────────

    pub fn num_eq(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }

    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    // ── Bitwise ───────────────────────────────────────────────────────────

    pub fn bit_and(self, other: Number) -> Number {
        Number::Int((self.truncate() & other.truncate()) & MASK_32)
    }

    pub fn bit_or(self, other: Number) -> Number {
        Number::Int((self.truncate() | other.truncate()) & MASK_32)
    }

    pub fn bit_xor(self, other: Number) -> Number {
        Number::Int((self.truncate() ^ other.truncate()) & MASK_32)
    }

    pub fn bit_not(self) -> Number {
        Number::Int(!self.truncate() & MASK_32)
    }

    pub fn shl(self, count: Number) -> OpResult<Number> {
        let n = shift_count(count)?;
        if n >= 32 {
            return Ok(Number::Int(0));
        }
        Ok(Number::Int(self.truncate().wrapping_shl(n) & MASK_32))
    }

    /// Arithmetic shift of the whole value. Unlike the other bitwise
    /// operators the result is not masked, so negative numbers stay negative.
    pub fn shr(self, count: Number) -> OpResult<Number> {
        let n = shift_count(count)?;
        Ok(Number::Int(self.truncate() >> n.min(63)))
    }
}

fn shift_count(count: Number) -> OpResult<u32> {
    let n = count.truncate();
    if n < 0 {
        return Err(OpError::new(ErrorKind::IllegalOperation, "Negative shift count"));
    }
    Ok(n.min(u32::MAX as i64) as u32)
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.num_eq(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{i}"),
            Number::Float(x) => fmt_float(x, f),
        }
    }
}

/// Floats always show a fractional part or an exponent, so `2.0` never
/// prints as `2`.
fn fmt_float(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("nan");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "inf" } else { "-inf" });
    }
    let abs = x.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{x:e}");
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        let sign = if exp < 0 { '-' } else { '+' };
        return write!(f, "{mantissa}e{sign}{:02}", exp.abs());
    }
    if x.fract() == 0.0 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}
