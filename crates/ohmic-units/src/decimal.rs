//! Decimal text for exact rationals
//!
//! Parsing accepts the literal forms the surface language uses for
//! magnitudes (`12`, `-0.5`, `4.7e3`, `.25`, `1_000`). Rendering is exact for
//! terminating fractions and rounds half away from zero at a fixed number of
//! fractional digits otherwise.

use crate::error::QuantityError;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// `base^exponent` for a rational base and signed exponent.
///
/// A negative exponent inverts the base, so `base` must be non-zero then.
pub fn rational_pow(base: &BigRational, exponent: i32) -> BigRational {
    let mut result = BigRational::one();
    for _ in 0..exponent.unsigned_abs() {
        result = &result * base;
    }
    if exponent < 0 {
        result.recip()
    } else {
        result
    }
}

/// `10^exponent` as an exact rational.
pub fn pow10(exponent: i32) -> BigRational {
    let magnitude = BigRational::from_integer(BigInt::from(10).pow(exponent.unsigned_abs()));
    if exponent < 0 {
        magnitude.recip()
    } else {
        magnitude
    }
}

/// Largest written exponent (`e±N`) a decimal literal may carry.
pub const MAX_DECIMAL_EXPONENT: i32 = 4096;

/// Parse a decimal literal into an exact rational.
///
/// Exponents beyond [`MAX_DECIMAL_EXPONENT`] in either direction are
/// rejected as invalid numbers.
pub fn parse_decimal(text: &str) -> Result<BigRational, QuantityError> {
    let invalid = || QuantityError::InvalidNumber(text.to_string());
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();

    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };

    let (mantissa, exponent) = match unsigned.find(|c| c == 'e' || c == 'E') {
        Some(at) => {
            let exponent: i32 = unsigned[at + 1..].parse().map_err(|_| invalid())?;
            if exponent.unsigned_abs() > MAX_DECIMAL_EXPONENT.unsigned_abs() {
                return Err(invalid());
            }
            (&unsigned[..at], exponent)
        }
        None => (unsigned, 0),
    };

    let (int_digits, frac_digits) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int_digits.is_empty() && frac_digits.is_empty())
        || !all_digits(int_digits)
        || !all_digits(frac_digits)
    {
        return Err(invalid());
    }

    let digits = format!("{}{}", int_digits, frac_digits);
    let numer: BigInt = digits.parse().map_err(|_| invalid())?;
    let frac_len = i32::try_from(frac_digits.len()).map_err(|_| invalid())?;

    let shift = exponent.checked_sub(frac_len).ok_or_else(invalid)?;
    let mut value = BigRational::from_integer(numer) * pow10(shift);
    if negative {
        value = -value;
    }
    Ok(value)
}

/// Render a rational as decimal text with at most `max_fraction_digits`
/// fractional digits.
///
/// Trailing zeros are trimmed; a value that rounds to zero prints as `0`.
pub fn format_decimal(value: &BigRational, max_fraction_digits: usize) -> String {
    let ten = BigRational::from_integer(BigInt::from(10));
    let abs = value.abs();
    let mut int_part = abs.trunc().to_integer();
    let mut rest = abs.fract();

    let mut digits: Vec<u8> = Vec::new();
    while digits.len() < max_fraction_digits && !rest.is_zero() {
        rest = &rest * &ten;
        let digit = rest.trunc().to_integer().to_u8().unwrap_or(0);
        digits.push(digit);
        rest = rest.fract();
    }

    let half = BigRational::new(BigInt::one(), BigInt::from(2));
    if rest >= half {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            int_part += BigInt::one();
        }
    }

    while digits.last() == Some(&0) {
        digits.pop();
    }

    let is_zero = int_part.is_zero() && digits.is_empty();
    let mut out = String::new();
    if value.is_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&int_part.to_string());
    if !digits.is_empty() {
        out.push('.');
        out.extend(digits.iter().map(|d| char::from(b'0' + d)));
    }
    out
}
