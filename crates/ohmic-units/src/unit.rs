//! Scaled units
//!
//! A [`Unit`] pairs a [`Dimensionality`] with an exact scale factor relative
//! to the coherent SI unit of that dimensionality, plus a display symbol:
//!
//! - ohm (`ohm`): scale = 1
//! - kilohm (`kohm`): scale = 1000
//! - centimeter (`cm`): scale = 1/100
//! - mil (`mil`): scale = 254/10_000_000
//!
//! Scales are `BigRational`, so conversions between units never lose
//! precision. The symbol is presentation only and does not take part in
//! equality.

use crate::decimal::rational_pow;
use crate::dimension::Dimensionality;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A physical unit: dimensionality, scale and display symbol.
#[derive(Debug, Clone)]
pub struct Unit {
    symbol: String,
    dims: Dimensionality,
    /// Scale factor relative to the coherent SI unit (1 = base)
    scale: BigRational,
}

impl Unit {
    /// Create a unit from its parts.
    ///
    /// The scale must be strictly positive.
    pub fn new(symbol: impl Into<String>, dims: Dimensionality, scale: BigRational) -> Self {
        debug_assert!(scale.is_positive(), "unit scale must be positive");
        Self {
            symbol: symbol.into(),
            dims,
            scale,
        }
    }

    /// Coherent unit (scale 1) for a dimensionality.
    pub fn coherent(symbol: impl Into<String>, dims: Dimensionality) -> Self {
        Self::new(symbol, dims, BigRational::one())
    }

    /// Unit whose scale is the ratio `numer / denom`.
    pub fn ratio(symbol: impl Into<String>, dims: Dimensionality, numer: i64, denom: i64) -> Self {
        Self::new(
            symbol,
            dims,
            BigRational::new(BigInt::from(numer), BigInt::from(denom)),
        )
    }

    /// The dimensionless unit with scale 1 and an empty symbol.
    pub fn dimensionless() -> Self {
        Self::coherent("", Dimensionality::DIMENSIONLESS)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dims(&self) -> &Dimensionality {
        &self.dims
    }

    pub fn scale(&self) -> &BigRational {
        &self.scale
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dims.is_dimensionless()
    }

    /// Same unit under a different display symbol.
    pub fn with_symbol(&self, symbol: impl Into<String>) -> Unit {
        Unit {
            symbol: symbol.into(),
            ..self.clone()
        }
    }

    /// Factor that converts a magnitude in `self` into a magnitude in `target`.
    pub fn conversion_factor(&self, target: &Unit) -> BigRational {
        &self.scale / &target.scale
    }

    // ============================================================================
    // Unit algebra
    // ============================================================================

    /// Multiply units: exponents add, scales multiply.
    ///
    /// `None` when a dimension exponent overflows.
    pub fn multiply(&self, other: &Unit) -> Option<Unit> {
        let symbol = match (self.symbol.is_empty(), other.symbol.is_empty()) {
            (true, _) => other.symbol.clone(),
            (_, true) => self.symbol.clone(),
            _ => format!("{}·{}", group(&self.symbol, &['/']), other.symbol),
        };
        let dims = self.dims.multiply(&other.dims)?;
        Some(Unit::new(symbol, dims, &self.scale * &other.scale))
    }

    /// Invert a unit: exponents negate, scale inverts.
    pub fn reciprocal(&self) -> Option<Unit> {
        let symbol = if self.symbol.is_empty() {
            String::new()
        } else {
            format!("1/{}", group(&self.symbol, &['·', '/']))
        };
        let dims = self.dims.reciprocal()?;
        Some(Unit::new(symbol, dims, self.scale.recip()))
    }

    /// Divide units.
    pub fn divide(&self, other: &Unit) -> Option<Unit> {
        let symbol = match (self.symbol.is_empty(), other.symbol.is_empty()) {
            (_, true) => self.symbol.clone(),
            (true, false) => format!("1/{}", group(&other.symbol, &['·', '/'])),
            _ => format!("{}/{}", self.symbol, group(&other.symbol, &['·', '/'])),
        };
        let dims = self.dims.divide(&other.dims)?;
        Some(Unit::new(symbol, dims, &self.scale / &other.scale))
    }

    /// Raise a unit to an integer power.
    pub fn pow(&self, exponent: i8) -> Option<Unit> {
        match exponent {
            0 => Some(Unit::dimensionless()),
            1 => Some(self.clone()),
            _ => {
                let symbol = if self.symbol.is_empty() {
                    String::new()
                } else {
                    format!("{}^{}", group(&self.symbol, &['·', '/', '^']), exponent)
                };
                let dims = self.dims.pow(exponent)?;
                Some(Unit::new(
                    symbol,
                    dims,
                    rational_pow(&self.scale, i32::from(exponent)),
                ))
            }
        }
    }
}

/// Parenthesize a compound symbol when it contains any of `separators`.
fn group(symbol: &str, separators: &[char]) -> String {
    if symbol.contains(separators) {
        format!("({})", symbol)
    } else {
        symbol.to_string()
    }
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims && self.scale == other.scale
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dims.hash(state);
        self.scale.hash(state);
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::dimensionless()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.symbol.is_empty() || self.is_dimensionless() {
            return write!(f, "{}", self.symbol);
        }
        if self.scale.is_one() {
            write!(f, "{}", self.dims)
        } else {
            write!(f, "{}·{}", self.scale, self.dims)
        }
    }
}
