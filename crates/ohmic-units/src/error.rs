//! Errors raised by unit lookup and quantity arithmetic.
//!
//! Both enums describe recoverable conditions. Callers that evaluate user
//! programs turn them into diagnostics; nothing here aborts the process.

use thiserror::Error;

/// Failure to resolve a unit name or unit expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitParseError {
    /// The expression was empty or only whitespace.
    #[error("empty unit expression")]
    Empty,

    /// A name does not exist in the catalog.
    ///
    /// `suggestions` holds the closest known names, best first.
    #[error("unknown unit '{name}'{}", did_you_mean(.suggestions))]
    UnknownUnit {
        name: String,
        suggestions: Vec<String>,
    },

    /// A character that cannot start or continue a unit expression.
    #[error("unexpected '{found}' at offset {offset} in unit expression")]
    UnexpectedChar { found: char, offset: usize },

    /// The expression ended where a unit name or exponent was required.
    #[error("unit expression ended unexpectedly")]
    UnexpectedEnd,

    /// An exponent after `^` was not a small signed integer.
    #[error("invalid exponent '{0}'")]
    InvalidExponent(String),

    /// A product or quotient of units whose dimension exponents overflow.
    #[error("unit expression exceeds the dimension exponent range")]
    ExponentOverflow,
}

/// Failure in quantity construction or arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    /// Division (or reciprocal) of a zero magnitude.
    #[error("division by zero")]
    DivisionByZero,

    /// A product or quotient whose dimension exponents leave the `i8` range.
    #[error("dimension exponent out of range")]
    DimensionOverflow,

    /// Conversion between units of different dimensionality.
    #[error("cannot convert {from} to {to}")]
    DimensionMismatch { from: String, to: String },

    /// A magnitude literal could not be parsed.
    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    /// The unit part of a quantity literal failed to resolve.
    #[error(transparent)]
    Unit(#[from] UnitParseError),
}

fn did_you_mean(suggestions: &[String]) -> String {
    match suggestions {
        [] => String::new(),
        [only] => format!(", did you mean '{}'?", only),
        many => format!(
            ", did you mean one of {}?",
            many.iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
