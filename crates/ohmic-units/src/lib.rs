// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Physical units for the ohmic circuit language
//!
//! This crate owns everything numeric below the type kernel:
//!
//! - [`dimension`] - exponent vectors over the base dimensions
//! - [`unit`] - dimensionality + exact scale + display symbol
//! - [`catalog`] - the standard named-unit table and unit-expression parser
//! - [`quantity`] - exact magnitudes with units and their arithmetic
//!
//! ```text
//! Dimensionality ──► Unit ──► UnitCatalog
//!                      │
//!                      └────► Quantity
//! ```
//!
//! Magnitudes and scales are `BigRational`, so `100 cm == 1 m` holds exactly.

pub mod catalog;
pub mod decimal;
pub mod dimension;
pub mod error;
pub mod quantity;
pub mod unit;

pub use catalog::UnitCatalog;
pub use dimension::{BaseDimension, Dimensionality};
pub use error::{QuantityError, UnitParseError};
pub use quantity::Quantity;
pub use unit::Unit;

/// Re-exported so downstream crates name the same rational type.
pub use num_rational::BigRational;
