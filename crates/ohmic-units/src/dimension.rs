//! Dimensional exponents over the base physical dimensions
//!
//! A [`Dimensionality`] records one integer exponent per [`BaseDimension`].
//! It is the type-level part of a unit: two quantities may be added only when
//! their dimensionalities are equal, while multiplication and division
//! compose the exponents. Composition is checked: an exponent outside the
//! `i8` range yields `None` rather than wrapping.
//!
//! # Examples
//!
//! ```rust
//! # use ohmic_units::dimension::*;
//! let velocity = Dimensionality::LENGTH.divide(&Dimensionality::TIME).unwrap();
//! assert_eq!(velocity.length, 1);
//! assert_eq!(velocity.time, -1);
//! assert_eq!(Dimensionality::VOLTAGE.to_string(), "kg·m^2·s^-3·A^-1");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the base physical dimensions tracked by the unit system.
///
/// The declaration order is the tie-break order used when rendering a
/// [`Dimensionality`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseDimension {
    /// Base unit: kilogram (kg)
    Mass,
    /// Base unit: meter (m)
    Length,
    /// Base unit: radian (rad)
    Angle,
    /// Base unit: second (s)
    Time,
    /// Base unit: ampere (A)
    ElectricCurrent,
    /// Base unit: candela (cd)
    LuminousIntensity,
}

impl BaseDimension {
    /// All base dimensions in rendering order.
    pub const ALL: [BaseDimension; 6] = [
        BaseDimension::Mass,
        BaseDimension::Length,
        BaseDimension::Angle,
        BaseDimension::Time,
        BaseDimension::ElectricCurrent,
        BaseDimension::LuminousIntensity,
    ];

    /// Symbol of the canonical base unit for this dimension.
    pub const fn symbol(self) -> &'static str {
        match self {
            BaseDimension::Mass => "kg",
            BaseDimension::Length => "m",
            BaseDimension::Angle => "rad",
            BaseDimension::Time => "s",
            BaseDimension::ElectricCurrent => "A",
            BaseDimension::LuminousIntensity => "cd",
        }
    }
}

/// Exponents over the base dimensions.
///
/// Equality and hashing are structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensionality {
    /// Mass exponent (kg)
    pub mass: i8,
    /// Length exponent (m)
    pub length: i8,
    /// Angle exponent (rad), tracked separately from the dimensionless ratio
    pub angle: i8,
    /// Time exponent (s)
    pub time: i8,
    /// Electric current exponent (A)
    pub current: i8,
    /// Luminous intensity exponent (cd)
    pub luminous: i8,
}

impl Dimensionality {
    /// All exponents zero.
    pub const DIMENSIONLESS: Dimensionality = Dimensionality {
        mass: 0,
        length: 0,
        angle: 0,
        time: 0,
        current: 0,
        luminous: 0,
    };

    pub const MASS: Dimensionality = Dimensionality {
        mass: 1,
        ..Self::DIMENSIONLESS
    };

    pub const LENGTH: Dimensionality = Dimensionality {
        length: 1,
        ..Self::DIMENSIONLESS
    };

    pub const ANGLE: Dimensionality = Dimensionality {
        angle: 1,
        ..Self::DIMENSIONLESS
    };

    pub const TIME: Dimensionality = Dimensionality {
        time: 1,
        ..Self::DIMENSIONLESS
    };

    pub const CURRENT: Dimensionality = Dimensionality {
        current: 1,
        ..Self::DIMENSIONLESS
    };

    pub const LUMINOUS: Dimensionality = Dimensionality {
        luminous: 1,
        ..Self::DIMENSIONLESS
    };

    /// Hertz: s^-1
    pub const FREQUENCY: Dimensionality = Dimensionality {
        time: -1,
        ..Self::DIMENSIONLESS
    };

    /// Coulomb: s·A
    pub const CHARGE: Dimensionality = Dimensionality {
        time: 1,
        current: 1,
        ..Self::DIMENSIONLESS
    };

    /// Newton: kg·m·s^-2
    pub const FORCE: Dimensionality = Dimensionality {
        mass: 1,
        length: 1,
        time: -2,
        ..Self::DIMENSIONLESS
    };

    /// Joule: kg·m^2·s^-2
    pub const ENERGY: Dimensionality = Dimensionality {
        mass: 1,
        length: 2,
        time: -2,
        ..Self::DIMENSIONLESS
    };

    /// Watt: kg·m^2·s^-3
    pub const POWER: Dimensionality = Dimensionality {
        mass: 1,
        length: 2,
        time: -3,
        ..Self::DIMENSIONLESS
    };

    /// Volt: kg·m^2·s^-3·A^-1
    pub const VOLTAGE: Dimensionality = Dimensionality {
        mass: 1,
        length: 2,
        time: -3,
        current: -1,
        ..Self::DIMENSIONLESS
    };

    /// Ohm: kg·m^2·s^-3·A^-2
    pub const RESISTANCE: Dimensionality = Dimensionality {
        mass: 1,
        length: 2,
        time: -3,
        current: -2,
        ..Self::DIMENSIONLESS
    };

    /// Siemens: s^3·A^2·kg^-1·m^-2
    pub const CONDUCTANCE: Dimensionality = Dimensionality {
        mass: -1,
        length: -2,
        time: 3,
        current: 2,
        ..Self::DIMENSIONLESS
    };

    /// Farad: s^4·A^2·kg^-1·m^-2
    pub const CAPACITANCE: Dimensionality = Dimensionality {
        mass: -1,
        length: -2,
        time: 4,
        current: 2,
        ..Self::DIMENSIONLESS
    };

    /// Henry: kg·m^2·s^-2·A^-2
    pub const INDUCTANCE: Dimensionality = Dimensionality {
        mass: 1,
        length: 2,
        time: -2,
        current: -2,
        ..Self::DIMENSIONLESS
    };

    /// Dimensionality with a single base exponent set.
    pub fn of(base: BaseDimension, exponent: i8) -> Dimensionality {
        let mut dims = Self::DIMENSIONLESS;
        *dims.exponent_mut(base) = exponent;
        dims
    }

    /// Exponent for one base dimension.
    pub const fn exponent(&self, base: BaseDimension) -> i8 {
        match base {
            BaseDimension::Mass => self.mass,
            BaseDimension::Length => self.length,
            BaseDimension::Angle => self.angle,
            BaseDimension::Time => self.time,
            BaseDimension::ElectricCurrent => self.current,
            BaseDimension::LuminousIntensity => self.luminous,
        }
    }

    fn exponent_mut(&mut self, base: BaseDimension) -> &mut i8 {
        match base {
            BaseDimension::Mass => &mut self.mass,
            BaseDimension::Length => &mut self.length,
            BaseDimension::Angle => &mut self.angle,
            BaseDimension::Time => &mut self.time,
            BaseDimension::ElectricCurrent => &mut self.current,
            BaseDimension::LuminousIntensity => &mut self.luminous,
        }
    }

    /// Check if all exponents are zero.
    pub fn is_dimensionless(&self) -> bool {
        *self == Self::DIMENSIONLESS
    }

    /// Multiply dimensions (add exponents).
    ///
    /// `None` when an exponent leaves the `i8` range.
    pub fn multiply(&self, other: &Dimensionality) -> Option<Dimensionality> {
        self.zip_with(other, i8::checked_add)
    }

    /// Negate every exponent. `None` when an exponent is `i8::MIN`.
    pub fn reciprocal(&self) -> Option<Dimensionality> {
        self.pow(-1)
    }

    /// Divide dimensions (subtract exponents).
    pub fn divide(&self, other: &Dimensionality) -> Option<Dimensionality> {
        self.zip_with(other, i8::checked_sub)
    }

    /// Raise dimensions to an integer power (scale exponents).
    pub fn pow(&self, exponent: i8) -> Option<Dimensionality> {
        self.map(|e| e.checked_mul(exponent))
    }

    fn map(&self, f: impl Fn(i8) -> Option<i8>) -> Option<Dimensionality> {
        let mut out = Self::DIMENSIONLESS;
        for base in BaseDimension::ALL {
            *out.exponent_mut(base) = f(self.exponent(base))?;
        }
        Some(out)
    }

    fn zip_with(
        &self,
        other: &Dimensionality,
        f: impl Fn(i8, i8) -> Option<i8>,
    ) -> Option<Dimensionality> {
        let mut out = Self::DIMENSIONLESS;
        for base in BaseDimension::ALL {
            *out.exponent_mut(base) = f(self.exponent(base), other.exponent(base))?;
        }
        Some(out)
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }

        let positive = BaseDimension::ALL
            .iter()
            .filter(|base| self.exponent(**base) > 0);
        let negative = BaseDimension::ALL
            .iter()
            .filter(|base| self.exponent(**base) < 0);

        let parts: Vec<String> = positive
            .chain(negative)
            .map(|base| format_dim(base.symbol(), self.exponent(*base)))
            .collect();

        write!(f, "{}", parts.join("·"))
    }
}

fn format_dim(symbol: &str, exponent: i8) -> String {
    match exponent {
        1 => symbol.to_string(),
        exp => format!("{}^{}", symbol, exp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensionless() {
        assert!(Dimensionality::DIMENSIONLESS.is_dimensionless());
        assert!(Dimensionality::default().is_dimensionless());
        assert!(!Dimensionality::TIME.is_dimensionless());
    }

    #[test]
    fn test_multiply_and_divide() {
        let power = Dimensionality::VOLTAGE.multiply(&Dimensionality::CURRENT);
        assert_eq!(power, Some(Dimensionality::POWER));

        let resistance = Dimensionality::VOLTAGE
            .divide(&Dimensionality::CURRENT)
            .unwrap();
        assert_eq!(resistance, Dimensionality::RESISTANCE);
        assert_eq!(resistance.reciprocal(), Some(Dimensionality::CONDUCTANCE));
    }

    #[test]
    fn test_time_constant() {
        // tau = R * C has the dimension of time
        let tau = Dimensionality::RESISTANCE.multiply(&Dimensionality::CAPACITANCE);
        assert_eq!(tau, Some(Dimensionality::TIME));
    }

    #[test]
    fn test_pow() {
        let area = Dimensionality::LENGTH.pow(2).unwrap();
        assert_eq!(area.length, 2);
        assert_eq!(
            Dimensionality::FREQUENCY.pow(0),
            Some(Dimensionality::DIMENSIONLESS)
        );
    }

    #[test]
    fn test_exponent_overflow_is_none() {
        let big = Dimensionality::of(BaseDimension::Length, 100);
        assert_eq!(big.multiply(&big), None);
        assert_eq!(big.divide(&big.pow(-1).unwrap()), None);
        assert_eq!(big.pow(2), None);

        let lowest = Dimensionality::of(BaseDimension::Time, i8::MIN);
        assert_eq!(lowest.reciprocal(), None);
        assert_eq!(
            Dimensionality::of(BaseDimension::Time, i8::MAX).reciprocal(),
            Some(Dimensionality::of(BaseDimension::Time, -i8::MAX))
        );
    }

    #[test]
    fn test_exponent_lookup() {
        let dims = Dimensionality::of(BaseDimension::LuminousIntensity, 3);
        assert_eq!(dims.exponent(BaseDimension::LuminousIntensity), 3);
        assert_eq!(dims.exponent(BaseDimension::Mass), 0);
        assert_eq!(dims.luminous, 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(Dimensionality::DIMENSIONLESS.to_string(), "1");
        assert_eq!(Dimensionality::LENGTH.to_string(), "m");
        assert_eq!(Dimensionality::VOLTAGE.to_string(), "kg·m^2·s^-3·A^-1");
        // positive exponents come first even when the base sorts later
        assert_eq!(Dimensionality::CAPACITANCE.to_string(), "s^4·A^2·kg^-1·m^-2");
        assert_eq!(Dimensionality::FREQUENCY.to_string(), "s^-1");
    }
}
