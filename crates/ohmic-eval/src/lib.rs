// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Semantic core of the ohmic circuit language
//!
//! Everything between a lowered syntax tree and a host-visible result:
//!
//! - [`types`] / [`capability`] / [`model`] - the type kernel
//! - [`value`] / [`ops`] - three-valued runtime values and their operators
//! - [`scope`] / [`context`] - compile-time names and runtime bindings
//! - [`ast`] / [`eval`] - expression trees and the evaluator
//! - [`schedule`] / [`template`] - statement ordering and reusable blocks
//! - [`builtins`] - the sealed global scope and context
//!
//! # Pipeline
//!
//! ```text
//! Stmt list ──► schedule ──► StmtBlock ──► execute(Context) ──► Value
//!                  │                           │
//!                  └──── Diagnostic ◄──────────┘
//! ```
//!
//! Every value is Known, Unknown (type only) or Placeholder (an error was
//! already reported). Operations propagate the weaker state instead of
//! failing, so one mistake yields one diagnostic.
//!
//! # Examples
//!
//! ```
//! use ohmic_eval::{evaluate, global_context, global_scope, BinaryOp, Expr, Span, Value};
//!
//! let scope = global_scope().new_child();
//! let ctx = global_context().new_child();
//! let v = scope.declare("v");
//! ctx.define(&v, Value::parse_quantity("5 V").unwrap());
//!
//! let expr = Expr::binary(
//!     BinaryOp::Div,
//!     Expr::symbol(v, Span::new(0, 0, 1, 1)),
//!     Expr::literal(Value::parse_quantity("1 kohm").unwrap(), Span::new(0, 4, 10, 1)),
//! );
//! let (current, diagnostics) = evaluate(&expr, &ctx);
//! assert!(diagnostics.is_empty());
//! assert_eq!(current, Value::parse_quantity("5 mA").unwrap());
//! ```

pub mod ast;
pub mod builtins;
pub mod capability;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod error;
pub mod eval;
pub mod model;
pub mod ops;
pub mod schedule;
pub mod scope;
pub mod span;
pub mod template;
pub mod types;
pub mod unwrap;
pub mod value;

pub use ast::{Arg, Expr, ExprKind, Stmt};
pub use builtins::{global_context, global_scope};
pub use config::EvalConfig;
pub use context::Context;
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use error::{ConfigError, ContextError, ScopeError};
pub use eval::{evaluate, evaluate_with};
pub use model::{ModelBehavior, ModelRef, ModelType};
pub use ops::{BinaryOp, OpError, UnaryOp};
pub use schedule::{schedule, StmtBlock};
pub use scope::{Scope, Symbol};
pub use span::Span;
pub use template::{Template, TemplateParam};
pub use types::{Param, ParamType, ReturnType, Signature, Type};
pub use unwrap::{unwrap, Native};
pub use value::{FunctionRef, Payload, Value};
