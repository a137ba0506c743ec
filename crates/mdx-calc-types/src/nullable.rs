//! Null-sentinel numeric domain
//!
//! Hot numeric paths pass raw `f64`/`i32` values. Absence is encoded in-band:
//! - doubles use a reserved NaN bit pattern, [`DOUBLE_NULL`], distinct from ordinary NaN
//! - integers use [`INTEGER_NULL`] (`i32::MIN`)
//!
//! Nothing outside this module should depend on the encodings; use the helpers
//! here (or convert to `Value`, which maps sentinels to `Value::Null`).

use std::cmp::Ordering;

const DOUBLE_NULL_BITS: u64 = 0x7ff8_0000_dead_beef;

/// The null double. Never compare against it with `==`, use [`is_null`].
pub const DOUBLE_NULL: f64 = f64::from_bits(DOUBLE_NULL_BITS);

/// The null integer
pub const INTEGER_NULL: i32 = i32::MIN;

/// Check if a double is the null sentinel
#[inline]
pub fn is_null(value: f64) -> bool {
    value.to_bits() == DOUBLE_NULL_BITS
}

/// Check if a double is an ordinary NaN (not the null sentinel)
#[inline]
pub fn is_nan(value: f64) -> bool {
    value.is_nan() && !is_null(value)
}

/// Check if a double is null or NaN; both yield null results in arithmetic
#[inline]
pub fn is_null_or_nan(value: f64) -> bool {
    value.is_nan()
}

/// Check if an integer is the null sentinel
#[inline]
pub fn is_null_integer(value: i32) -> bool {
    value == INTEGER_NULL
}

/// Encode an optional double
#[inline]
pub fn from_option(value: Option<f64>) -> f64 {
    value.unwrap_or(DOUBLE_NULL)
}

/// Decode a double, mapping the null sentinel to `None` (NaN stays `Some`)
#[inline]
pub fn to_option(value: f64) -> Option<f64> {
    if is_null(value) { None } else { Some(value) }
}

/// Encode an optional integer
#[inline]
pub fn from_option_integer(value: Option<i32>) -> i32 {
    value.unwrap_or(INTEGER_NULL)
}

/// Decode an integer, mapping the null sentinel to `None`
#[inline]
pub fn to_option_integer(value: i32) -> Option<i32> {
    if is_null_integer(value) { None } else { Some(value) }
}

/// Convert an integer to a double, preserving null
#[inline]
pub fn integer_to_double(value: i32) -> f64 {
    if is_null_integer(value) { DOUBLE_NULL } else { f64::from(value) }
}

/// Convert a double to an integer by truncation; null and NaN become null
///
/// Out-of-range values saturate to `i32::MAX` or `i32::MIN + 1`, so only a
/// null or NaN input yields [`INTEGER_NULL`].
#[inline]
pub fn double_to_integer(value: f64) -> i32 {
    if value.is_nan() {
        INTEGER_NULL
    } else {
        (value as i32).max(INTEGER_NULL + 1)
    }
}

/// Convert a double to a three-valued boolean; null and NaN become null
#[inline]
pub fn double_to_boolean(value: f64) -> Option<bool> {
    if value.is_nan() { None } else { Some(value != 0.0) }
}

/// Apply a binary arithmetic operation with null propagation
///
/// If either operand is null or NaN the result is [`DOUBLE_NULL`].
#[inline]
pub fn arithmetic(left: f64, right: f64, op: impl FnOnce(f64, f64) -> f64) -> f64 {
    if is_null_or_nan(left) || is_null_or_nan(right) {
        DOUBLE_NULL
    } else {
        op(left, right)
    }
}

/// Rank of a double in the total order
fn rank(value: f64) -> u8 {
    if is_null(value) {
        1
    } else if value.is_nan() {
        3
    } else if value == f64::NEG_INFINITY {
        0
    } else if value == f64::INFINITY {
        4
    } else {
        2
    }
}

/// Total order over doubles including the null sentinel
///
/// From least to greatest:
/// `-inf < null < finite numbers (natural order) < NaN < +inf`.
/// Two nulls compare equal, as do two NaNs, which makes this a total order,
/// unlike IEEE comparison.
pub fn compare(left: f64, right: f64) -> Ordering {
    let (left_rank, right_rank) = (rank(left), rank(right));
    if left_rank != right_rank {
        return left_rank.cmp(&right_rank);
    }
    if left_rank == 2 {
        // Finite values; -0.0 and 0.0 compare equal
        left.partial_cmp(&right).unwrap_or(Ordering::Equal)
    } else {
        Ordering::Equal
    }
}
