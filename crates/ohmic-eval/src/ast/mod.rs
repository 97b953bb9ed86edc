//! Expression and statement trees
//!
//! The compiler that lowers surface syntax builds these trees against a
//! populated [`Scope`](crate::scope::Scope). Once built they are immutable
//! and can be evaluated against any number of contexts.
//!
//! # Pipeline Position
//!
//! ```text
//! Parse → Lower → Schedule → Execute
//!           ^^^^^
//!      trees built here
//! ```

mod expr;
mod stmt;

pub use expr::{Arg, Expr, ExprKind};
pub use stmt::Stmt;
