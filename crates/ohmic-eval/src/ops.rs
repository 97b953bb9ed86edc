//! Operator dispatch over capabilities.
//!
//! Every operator first checks the operand types against a capability, so a
//! type error is reported whether or not the operand values are known. Only
//! then are payloads combined; when a payload is missing the result is an
//! Unknown of the result type. A Placeholder operand short-circuits to a
//! Placeholder without an error.

use crate::types::Type;
use crate::value::{Payload, Value};
use ohmic_units::QuantityError;
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }

    /// Verb used in "cannot ..." messages.
    pub fn verb(self) -> &'static str {
        match self {
            UnaryOp::Neg => "negate",
            UnaryOp::Not => "apply NOT to",
        }
    }

    /// Result after a type error.
    pub fn fallback(self) -> Value {
        match self {
            UnaryOp::Neg => Value::Placeholder,
            UnaryOp::Not => Value::unknown(Type::Bool),
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// Verb used in "cannot ..." messages.
    pub fn verb(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "subtract",
            BinaryOp::Mul => "multiply",
            BinaryOp::Div => "divide",
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => "compare",
            BinaryOp::And => "apply AND to",
            BinaryOp::Or => "apply OR to",
        }
    }

    /// Result after a type error: Placeholder for arithmetic and
    /// concatenation, an unknown Bool for logic and comparisons.
    pub fn fallback(self) -> Value {
        match self {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => Value::Placeholder,
            _ => Value::unknown(Type::Bool),
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Operator failure. The evaluator turns these into diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    #[error("cannot {verb} {lhs} and {rhs}")]
    InvalidOperands {
        verb: &'static str,
        lhs: String,
        rhs: String,
    },

    #[error("cannot {verb} {operand}")]
    InvalidOperand { verb: &'static str, operand: String },

    #[error("division by zero")]
    DivisionByZero,

    /// A product or quotient whose dimension exponents leave the `i8` range.
    #[error("cannot {verb} {lhs} and {rhs}: dimension exponent out of range")]
    DimensionOverflow {
        verb: &'static str,
        lhs: String,
        rhs: String,
    },
}

fn invalid_operands(op: BinaryOp, lhs: &Type, rhs: &Type) -> OpError {
    OpError::InvalidOperands {
        verb: op.verb(),
        lhs: lhs.to_string(),
        rhs: rhs.to_string(),
    }
}

fn dimension_overflow(op: BinaryOp, lhs: &Type, rhs: &Type) -> OpError {
    OpError::DimensionOverflow {
        verb: op.verb(),
        lhs: lhs.to_string(),
        rhs: rhs.to_string(),
    }
}

/// Apply a prefix operator.
pub fn apply_unary(op: UnaryOp, operand: &Value) -> Result<Value, OpError> {
    let Some(ty) = operand.ty() else {
        return Ok(Value::Placeholder);
    };
    match op {
        UnaryOp::Neg => {
            let arithmetic = ty.arithmetic().ok_or_else(|| OpError::InvalidOperand {
                verb: op.verb(),
                operand: ty.to_string(),
            })?;
            let result_ty = arithmetic.negated_type();
            Ok(match operand.payload() {
                Some(payload) => Value::Known {
                    ty: result_ty,
                    payload: arithmetic.negate(payload),
                },
                None => Value::Unknown(result_ty),
            })
        }
        UnaryOp::Not => {
            if !ty.is_bool() {
                return Err(OpError::InvalidOperand {
                    verb: op.verb(),
                    operand: ty.to_string(),
                });
            }
            Ok(match operand.as_bool() {
                Some(value) => Value::bool(!value),
                None => Value::unknown(Type::Bool),
            })
        }
    }
}

/// Apply an infix operator.
pub fn apply_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, OpError> {
    let (Some(lhs_ty), Some(rhs_ty)) = (lhs.ty(), rhs.ty()) else {
        return Ok(Value::Placeholder);
    };
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            arithmetic(op, lhs, rhs, lhs_ty, rhs_ty)
        }
        BinaryOp::Eq => Ok(lhs.equal(rhs)),
        BinaryOp::Ne => {
            let equal = lhs.equal(rhs);
            Ok(match equal.as_bool() {
                Some(value) => Value::bool(!value),
                None => equal,
            })
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let arithmetic = lhs_ty
                .arithmetic()
                .filter(|arithmetic| arithmetic.can_sum(rhs_ty))
                .ok_or_else(|| invalid_operands(op, lhs_ty, rhs_ty))?;
            Ok(match (lhs.payload(), rhs.payload()) {
                (Some(a), Some(b)) => {
                    let ordering = arithmetic.compare(a, b);
                    Value::bool(match op {
                        BinaryOp::Lt => ordering == Ordering::Less,
                        BinaryOp::Le => ordering != Ordering::Greater,
                        BinaryOp::Gt => ordering == Ordering::Greater,
                        _ => ordering != Ordering::Less,
                    })
                }
                _ => Value::unknown(Type::Bool),
            })
        }
        BinaryOp::And | BinaryOp::Or => {
            if !lhs_ty.is_bool() || !rhs_ty.is_bool() {
                return Err(invalid_operands(op, lhs_ty, rhs_ty));
            }
            Ok(logical(op, lhs.as_bool(), rhs.as_bool()))
        }
    }
}

/// Strict logic: an unknown side always makes the result unknown.
fn logical(op: BinaryOp, lhs: Option<bool>, rhs: Option<bool>) -> Value {
    match (lhs, rhs) {
        (Some(a), Some(b)) if op == BinaryOp::Or => Value::bool(a || b),
        (Some(a), Some(b)) => Value::bool(a && b),
        _ => Value::unknown(Type::Bool),
    }
}

fn arithmetic(
    op: BinaryOp,
    lhs: &Value,
    rhs: &Value,
    lhs_ty: &Type,
    rhs_ty: &Type,
) -> Result<Value, OpError> {
    if op == BinaryOp::Add {
        if let Some(concat) = lhs_ty.concat().filter(|concat| concat.can_concat(rhs_ty)) {
            return combine(lhs, rhs, Type::String, |a, b| Ok(concat.concat(a, b)));
        }
    }
    let Some(arithmetic) = lhs_ty.arithmetic() else {
        return Err(invalid_operands(op, lhs_ty, rhs_ty));
    };
    match op {
        BinaryOp::Add | BinaryOp::Sub => {
            if !arithmetic.can_sum(rhs_ty) {
                return Err(invalid_operands(op, lhs_ty, rhs_ty));
            }
            let ty = arithmetic.sum_type(rhs_ty);
            combine(lhs, rhs, ty, |a, b| {
                Ok(if op == BinaryOp::Add {
                    arithmetic.add(a, b)
                } else {
                    arithmetic.subtract(a, b)
                })
            })
        }
        BinaryOp::Mul => {
            if !arithmetic.can_product(rhs_ty) {
                return Err(invalid_operands(op, lhs_ty, rhs_ty));
            }
            let ty = arithmetic
                .product_type(rhs_ty)
                .ok_or_else(|| dimension_overflow(op, lhs_ty, rhs_ty))?;
            combine(lhs, rhs, ty, |a, b| {
                arithmetic
                    .multiply(a, b)
                    .map_err(|err| quantity_error(op, lhs_ty, rhs_ty, err))
            })
        }
        _ => {
            if !arithmetic.can_product(rhs_ty) {
                return Err(invalid_operands(op, lhs_ty, rhs_ty));
            }
            let ty = arithmetic
                .quotient_type(rhs_ty)
                .ok_or_else(|| dimension_overflow(op, lhs_ty, rhs_ty))?;
            combine(lhs, rhs, ty, |a, b| {
                arithmetic
                    .divide(a, b)
                    .map_err(|err| quantity_error(op, lhs_ty, rhs_ty, err))
            })
        }
    }
}

fn quantity_error(op: BinaryOp, lhs: &Type, rhs: &Type, err: QuantityError) -> OpError {
    match err {
        QuantityError::DivisionByZero => OpError::DivisionByZero,
        QuantityError::DimensionOverflow => dimension_overflow(op, lhs, rhs),
        other => OpError::InvalidOperand {
            verb: op.verb(),
            operand: other.to_string(),
        },
    }
}

fn combine(
    lhs: &Value,
    rhs: &Value,
    ty: Type,
    f: impl FnOnce(&Payload, &Payload) -> Result<Payload, OpError>,
) -> Result<Value, OpError> {
    match (lhs.payload(), rhs.payload()) {
        (Some(a), Some(b)) => Ok(Value::Known {
            ty,
            payload: f(a, b)?,
        }),
        _ => Ok(Value::Unknown(ty)),
    }
}
