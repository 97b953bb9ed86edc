//! Exact quantities
//!
//! A [`Quantity`] is an immutable magnitude (`BigRational`) tagged with a
//! [`Unit`]. Arithmetic follows the unit algebra:
//!
//! | Operation | Requirement | Result unit |
//! |-----------|-------------|-------------|
//! | `add` / `subtract` | same dimensionality | left operand's unit |
//! | `multiply` | exponents stay in range | product unit |
//! | `divide` | non-zero divisor, exponents in range | quotient unit |
//! | `==` / `compare` | same dimensionality | (base-normalized) |
//!
//! Dimension checks for `add`/`subtract` belong to the caller; the type
//! kernel only dispatches them after confirming both sides agree.
//!
//! # Examples
//!
//! ```rust
//! # use ohmic_units::quantity::Quantity;
//! let current = Quantity::parse("3 A").unwrap();
//! let resistance = Quantity::parse("2 ohm").unwrap();
//! assert_eq!(current.multiply(&resistance).unwrap(), Quantity::parse("6 V").unwrap());
//! assert_eq!(Quantity::parse("100 cm").unwrap(), Quantity::parse("1 m").unwrap());
//! ```

use crate::catalog::UnitCatalog;
use crate::decimal::{format_decimal, parse_decimal};
use crate::dimension::Dimensionality;
use crate::error::QuantityError;
use crate::unit::Unit;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use std::cmp::Ordering;
use std::fmt;

/// Fractional digits used by `Display` for non-terminating magnitudes.
const DISPLAY_DIGITS: usize = 12;

/// Magnitude with a unit.
#[derive(Debug, Clone)]
pub struct Quantity {
    magnitude: BigRational,
    unit: Unit,
}

impl Quantity {
    /// Create a quantity. `None` means dimensionless.
    pub fn new(magnitude: BigRational, unit: Option<Unit>) -> Self {
        Self {
            magnitude,
            unit: unit.unwrap_or_default(),
        }
    }

    /// Quantity in `unit`.
    pub fn with_unit(magnitude: BigRational, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// Dimensionless quantity.
    pub fn dimensionless(magnitude: BigRational) -> Self {
        Self::new(magnitude, None)
    }

    /// Integer magnitude in `unit`.
    pub fn from_integer(value: i64, unit: Unit) -> Self {
        Self::with_unit(BigRational::from_integer(BigInt::from(value)), unit)
    }

    pub fn magnitude(&self) -> &BigRational {
        &self.magnitude
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn dims(&self) -> &Dimensionality {
        self.unit.dims()
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    /// Magnitude expressed in the coherent SI unit.
    pub fn to_base(&self) -> BigRational {
        &self.magnitude * self.unit.scale()
    }

    /// Express this quantity in another unit of the same dimensionality.
    pub fn convert_to(&self, target: &Unit) -> Result<Quantity, QuantityError> {
        if self.dims() != target.dims() {
            return Err(QuantityError::DimensionMismatch {
                from: self.dims().to_string(),
                to: target.dims().to_string(),
            });
        }
        Ok(Quantity::with_unit(
            &self.magnitude * self.unit.conversion_factor(target),
            target.clone(),
        ))
    }

    // ============================================================================
    // Arithmetic
    // ============================================================================

    /// Sum, in `self`'s unit.
    pub fn add(&self, other: &Quantity) -> Quantity {
        debug_assert_eq!(self.dims(), other.dims(), "add requires equal dimensions");
        Quantity::with_unit(
            &self.magnitude + other.rescaled_to(&self.unit),
            self.unit.clone(),
        )
    }

    /// Difference, in `self`'s unit.
    pub fn subtract(&self, other: &Quantity) -> Quantity {
        debug_assert_eq!(
            self.dims(),
            other.dims(),
            "subtract requires equal dimensions"
        );
        Quantity::with_unit(
            &self.magnitude - other.rescaled_to(&self.unit),
            self.unit.clone(),
        )
    }

    /// Product; dimensions and scales compose.
    pub fn multiply(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        let unit = self
            .unit
            .multiply(&other.unit)
            .ok_or(QuantityError::DimensionOverflow)?;
        Ok(Quantity::with_unit(&self.magnitude * &other.magnitude, unit))
    }

    /// Quotient; fails on a zero divisor.
    pub fn divide(&self, other: &Quantity) -> Result<Quantity, QuantityError> {
        if other.is_zero() {
            return Err(QuantityError::DivisionByZero);
        }
        let unit = self
            .unit
            .divide(&other.unit)
            .ok_or(QuantityError::DimensionOverflow)?;
        Ok(Quantity::with_unit(&self.magnitude / &other.magnitude, unit))
    }

    /// `1 / self`; fails on zero.
    pub fn reciprocal(&self) -> Result<Quantity, QuantityError> {
        if self.is_zero() {
            return Err(QuantityError::DivisionByZero);
        }
        let unit = self
            .unit
            .reciprocal()
            .ok_or(QuantityError::DimensionOverflow)?;
        Ok(Quantity::with_unit(self.magnitude.recip(), unit))
    }

    pub fn negate(&self) -> Quantity {
        Quantity::with_unit(-&self.magnitude, self.unit.clone())
    }

    pub fn abs(&self) -> Quantity {
        if self.magnitude < BigRational::zero() {
            self.negate()
        } else {
            self.clone()
        }
    }

    /// Ordering of two quantities after base normalization.
    ///
    /// `None` when the dimensionalities differ.
    pub fn compare(&self, other: &Quantity) -> Option<Ordering> {
        if self.dims() != other.dims() {
            return None;
        }
        Some(self.to_base().cmp(&other.to_base()))
    }

    fn rescaled_to(&self, target: &Unit) -> BigRational {
        &self.magnitude * self.unit.conversion_factor(target)
    }

    // ============================================================================
    // Text
    // ============================================================================

    /// Parse a magnitude literal such as `4.7e3`.
    pub fn parse_magnitude(text: &str) -> Result<BigRational, QuantityError> {
        parse_decimal(text)
    }

    /// Parse `"<magnitude> [unit expression]"` against the standard catalog.
    pub fn parse(text: &str) -> Result<Quantity, QuantityError> {
        Self::parse_with(text, UnitCatalog::standard())
    }

    /// Parse against a specific catalog.
    pub fn parse_with(text: &str, catalog: &UnitCatalog) -> Result<Quantity, QuantityError> {
        let text = text.trim();
        let split = magnitude_len(text);
        let (magnitude, unit) = text.split_at(split);
        let magnitude = parse_decimal(magnitude)?;
        let unit = if unit.trim().is_empty() {
            Unit::dimensionless()
        } else {
            catalog.parse(unit)?
        };
        Ok(Quantity::with_unit(magnitude, unit))
    }

    /// Magnitude as decimal text, rounding non-terminating fractions to
    /// `digits` fractional digits.
    pub fn to_decimal_string(&self, digits: usize) -> String {
        format_decimal(&self.magnitude, digits)
    }
}

/// Byte length of the leading magnitude literal in `text`.
fn magnitude_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut end = 0;
    while end < bytes.len() {
        let b = bytes[end];
        let exponent_sign = (b == b'-' || b == b'+')
            && end > 0
            && matches!(bytes[end - 1], b'e' | b'E');
        let exponent_mark = (b == b'e' || b == b'E')
            && bytes
                .get(end + 1)
                .is_some_and(|next| next.is_ascii_digit() || *next == b'-' || *next == b'+');
        if b.is_ascii_digit()
            || b == b'.'
            || b == b'_'
            || (end == 0 && (b == b'-' || b == b'+'))
            || exponent_sign
            || exponent_mark
        {
            end += 1;
        } else {
            break;
        }
    }
    end
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.dims() == other.dims() && self.to_base() == other.to_base()
    }
}

impl Eq for Quantity {}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.to_decimal_string(DISPLAY_DIGITS);
        let unit = self.unit.to_string();
        if unit.is_empty() {
            write!(f, "{}", magnitude)
        } else {
            write!(f, "{} {}", magnitude, unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str) -> Quantity {
        Quantity::parse(text).unwrap()
    }

    #[test]
    fn test_parse() {
        let r = q("4.7 kohm");
        assert_eq!(r.magnitude(), &parse_decimal("4.7").unwrap());
        assert_eq!(r.unit().symbol(), "kohm");
        assert_eq!(r.to_base(), parse_decimal("4700").unwrap());

        let c = q("2.2e-6F");
        assert_eq!(*c.dims(), Dimensionality::CAPACITANCE);
        assert!(q("42").unit().is_dimensionless());
        assert!(matches!(
            Quantity::parse("1.5 kohmz"),
            Err(QuantityError::Unit(_))
        ));
        assert!(matches!(
            Quantity::parse("abc V"),
            Err(QuantityError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_parse_extreme_exponents() {
        assert_eq!(
            Quantity::parse("1.5e-2147483648 V"),
            Err(QuantityError::InvalidNumber("1.5e-2147483648".to_string()))
        );
        assert!(matches!(
            Quantity::parse("1e999999999 ohm"),
            Err(QuantityError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_base_normalized_equality() {
        assert_eq!(q("100 cm"), q("1 m"));
        assert_eq!(q("1000 mA"), q("1 A"));
        assert_ne!(q("1 V"), q("1 A"));
        assert_ne!(q("1 kV"), q("1 V"));
    }

    #[test]
    fn test_add_rescales_to_left_unit() {
        let sum = q("1 kohm").add(&q("500 ohm"));
        assert_eq!(sum.unit().symbol(), "kohm");
        assert_eq!(sum.magnitude(), &parse_decimal("1.5").unwrap());

        let diff = q("1 m").subtract(&q("25 cm"));
        assert_eq!(diff, q("0.75 m"));
    }

    #[test]
    fn test_ohms_law() {
        assert_eq!(q("3 A").multiply(&q("2 ohm")).unwrap(), q("6 V"));
        assert_eq!(q("3 V").divide(&q("2 ohm")).unwrap(), q("1.5 A"));
        assert_eq!(q("5 V").divide(&q("1 kohm")).unwrap(), q("5 mA"));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            q("1 V").divide(&q("0 ohm")),
            Err(QuantityError::DivisionByZero)
        );
        assert_eq!(q("0 ohm").reciprocal(), Err(QuantityError::DivisionByZero));
    }

    #[test]
    fn test_dimension_overflow() {
        let big = q("1 m^100");
        assert_eq!(big.multiply(&big), Err(QuantityError::DimensionOverflow));
        let small = q("1 m^-100");
        assert_eq!(big.divide(&small), Err(QuantityError::DimensionOverflow));
        assert_eq!(big.multiply(&small).unwrap(), q("1"));
    }

    #[test]
    fn test_reciprocal_and_negate() {
        let g = q("4 ohm").reciprocal().unwrap();
        assert_eq!(*g.dims(), Dimensionality::CONDUCTANCE);
        assert_eq!(g, q("0.25 S"));
        assert_eq!(q("3 V").negate(), q("-3 V"));
        assert_eq!(q("-3 V").abs(), q("3 V"));
    }

    #[test]
    fn test_compare() {
        assert_eq!(q("1 km").compare(&q("999 m")), Some(Ordering::Greater));
        assert_eq!(q("1 mil").compare(&q("1 in")), Some(Ordering::Less));
        assert_eq!(q("60 s").compare(&q("1 min")), Some(Ordering::Equal));
        assert_eq!(q("1 s").compare(&q("1 m")), None);
    }

    #[test]
    fn test_convert_to() {
        let catalog = UnitCatalog::standard();
        let inches = q("1000 mil")
            .convert_to(catalog.by_name("in").unwrap())
            .unwrap();
        assert_eq!(inches.magnitude(), &parse_decimal("1").unwrap());
        assert!(q("1 V").convert_to(catalog.by_name("A").unwrap()).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(q("4.7 kohm").to_string(), "4.7 kohm");
        assert_eq!(q("12").to_string(), "12");
        let third = q("1 V").divide(&q("3")).unwrap();
        assert_eq!(third.to_decimal_string(3), "0.333");
        assert_eq!(third.to_string(), "0.333333333333 V");
    }
}
