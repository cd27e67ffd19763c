//! Conversion of raw cell input into quantities.
//!
//! Every raw cell value passes through `CoercionPolicy::coerce`. The lenient policy
//! never fails: anything that is not a usable number becomes 0. The strict policy
//! reports the same inputs as `Error::InvalidCell`, and the matrix store and the
//! derivation code are unaware of which one is active.

use crate::error::{Error, Result};
use crate::Quantity;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CoercionPolicy {
    Lenient,
    Strict,
}

impl Default for CoercionPolicy {
    fn default() -> Self {
        CoercionPolicy::Lenient
    }
}

impl CoercionPolicy {
    pub fn coerce(self, raw: &str) -> Result<Quantity> {
        let n = parse_number(raw);
        match self {
            CoercionPolicy::Lenient => Ok(match n {
                // `as` saturates, so huge inputs clamp instead of wrapping
                Some(n) if n > 0.0 => n.trunc() as Quantity,
                _ => 0,
            }),
            CoercionPolicy::Strict => match n {
                Some(n)
                    if n.is_finite()
                        && n >= 0.0
                        && n.fract() == 0.0
                        && n <= Quantity::MAX as f64 =>
                {
                    Ok(n as Quantity)
                }
                _ => Err(Error::InvalidCell {
                    raw: raw.to_string(),
                }),
            },
        }
    }
}

impl CoercionPolicy {
    /// Applies the same rules to a value that is already a number, such as a cell read
    /// from a scenario file: negatives become 0, or are rejected under `Strict`.
    pub fn coerce_value(self, value: Quantity) -> Result<Quantity> {
        match self {
            _ if value >= 0 => Ok(value),
            CoercionPolicy::Lenient => Ok(0),
            CoercionPolicy::Strict => Err(Error::InvalidCell {
                raw: value.to_string(),
            }),
        }
    }
}

/// Parses text the way a browser number input converts its value: surrounding
/// whitespace is ignored, the empty string is zero, and `0x`/`0o`/`0b` prefixes select
/// a radix. Returns `None` for anything that is not a number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Some(0.0);
    }
    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    for &(prefix, radix) in &[("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }
    // str::parse also accepts "inf" and "nan" spellings; only exponents may be letters.
    if s.bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return None;
    }
    s.parse::<f64>().ok()
}

// Accumulates in f64 so values past u64::MAX grow toward infinity instead of failing.
fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let mut n = 0.0f64;
    for c in digits.chars() {
        n = n * f64::from(radix) + f64::from(c.to_digit(radix)?);
    }
    Some(n)
}
