//! Capability contracts.
//!
//! A capability is an optional behavior that only some type variants
//! implement. The dispatcher asks [`Type`] for the capability, checks the
//! matching `can_*` predicate against the other operand's type, and only
//! then touches payloads. Payload methods therefore assume the shapes their
//! predicates promised; any other shape is an internal invariant violation
//! and panics.

use crate::model::{ModelRef, ModelType};
use crate::types::{FunctionType, NumberType, ObjectType, Signature, Type};
use crate::value::{Payload, Value};
use ohmic_units::{Quantity, QuantityError};
use std::cmp::Ordering;
use std::sync::Arc;

/// Numeric operators. Implemented by Number.
pub trait Arithmetic {
    /// `+`/`-`/ordering are defined against `other`.
    fn can_sum(&self, other: &Type) -> bool;
    /// `*`/`/` are defined against `other`.
    fn can_product(&self, other: &Type) -> bool;

    fn sum_type(&self, other: &Type) -> Type;
    /// `None` when the product's dimension exponents overflow.
    fn product_type(&self, other: &Type) -> Option<Type>;
    fn quotient_type(&self, other: &Type) -> Option<Type>;
    fn negated_type(&self) -> Type;

    fn add(&self, lhs: &Payload, rhs: &Payload) -> Payload;
    fn subtract(&self, lhs: &Payload, rhs: &Payload) -> Payload;
    fn multiply(&self, lhs: &Payload, rhs: &Payload) -> Result<Payload, QuantityError>;
    fn divide(&self, lhs: &Payload, rhs: &Payload) -> Result<Payload, QuantityError>;
    fn negate(&self, operand: &Payload) -> Payload;
    fn compare(&self, lhs: &Payload, rhs: &Payload) -> Ordering;
}

/// `+` on strings. Implemented by String.
pub trait Concat {
    fn can_concat(&self, other: &Type) -> bool;
    fn concat(&self, lhs: &Payload, rhs: &Payload) -> Payload;
}

/// Named attribute access. Implemented by Object and Model.
pub trait Attributes {
    fn attr_type(&self, name: &str) -> Option<Type>;
    fn attr(&self, target: &Payload, name: &str) -> Option<Value>;
    fn attr_names(&self) -> Vec<String>;
}

/// Invocation. Implemented by Function and by callable Models.
pub trait Callable {
    fn signature(&self) -> &Signature;
    /// Invoke with fully bound, fully known arguments in parameter order.
    fn call(&self, callee: &Payload, args: &[Value]) -> Result<Value, String>;
}

/// Keyed element access. Implemented by Object.
pub trait Indexable {
    fn can_index(&self, key: &Type) -> bool;
    /// Element type for a known key, or for an unknown key (`None`) when
    /// every element shares one type.
    fn index_type(&self, key: Option<&Payload>) -> Option<Type>;
    fn index(&self, target: &Payload, key: &Payload) -> Option<Value>;
}

// ============================================================================
// Number
// ============================================================================

fn number_of(ty: &Type) -> &NumberType {
    match ty {
        Type::Number(number) => number,
        other => panic!("arithmetic dispatched against non-number type {}", other),
    }
}

fn quantity_of(payload: &Payload) -> &Quantity {
    match payload {
        Payload::Quantity(quantity) => quantity,
        other => panic!("expected a quantity payload, found {}", other.kind_name()),
    }
}

impl Arithmetic for NumberType {
    fn can_sum(&self, other: &Type) -> bool {
        matches!(other, Type::Number(number) if number.dims == self.dims)
    }

    fn can_product(&self, other: &Type) -> bool {
        other.is_number()
    }

    fn sum_type(&self, _other: &Type) -> Type {
        Type::Number(*self)
    }

    fn product_type(&self, other: &Type) -> Option<Type> {
        self.dims.multiply(&number_of(other).dims).map(Type::number)
    }

    fn quotient_type(&self, other: &Type) -> Option<Type> {
        self.dims.divide(&number_of(other).dims).map(Type::number)
    }

    fn negated_type(&self) -> Type {
        Type::Number(*self)
    }

    fn add(&self, lhs: &Payload, rhs: &Payload) -> Payload {
        Payload::Quantity(quantity_of(lhs).add(quantity_of(rhs)))
    }

    fn subtract(&self, lhs: &Payload, rhs: &Payload) -> Payload {
        Payload::Quantity(quantity_of(lhs).subtract(quantity_of(rhs)))
    }

    fn multiply(&self, lhs: &Payload, rhs: &Payload) -> Result<Payload, QuantityError> {
        quantity_of(lhs)
            .multiply(quantity_of(rhs))
            .map(Payload::Quantity)
    }

    fn divide(&self, lhs: &Payload, rhs: &Payload) -> Result<Payload, QuantityError> {
        quantity_of(lhs)
            .divide(quantity_of(rhs))
            .map(Payload::Quantity)
    }

    fn negate(&self, operand: &Payload) -> Payload {
        Payload::Quantity(quantity_of(operand).negate())
    }

    fn compare(&self, lhs: &Payload, rhs: &Payload) -> Ordering {
        let (lhs, rhs) = (quantity_of(lhs), quantity_of(rhs));
        lhs.compare(rhs).unwrap_or_else(|| {
            panic!(
                "ordering dispatched across dimensions {} and {}",
                lhs.dims(),
                rhs.dims()
            )
        })
    }
}

// ============================================================================
// String
// ============================================================================

/// Concatenation capability of the String type.
pub struct StringConcat;

fn str_of(payload: &Payload) -> &str {
    match payload {
        Payload::String(text) => text.as_ref(),
        other => panic!("expected a string payload, found {}", other.kind_name()),
    }
}

impl Concat for StringConcat {
    fn can_concat(&self, other: &Type) -> bool {
        other.is_string()
    }

    fn concat(&self, lhs: &Payload, rhs: &Payload) -> Payload {
        let mut joined = String::from(str_of(lhs));
        joined.push_str(str_of(rhs));
        Payload::String(Arc::from(joined))
    }
}

// ============================================================================
// Object
// ============================================================================

fn fields_of(payload: &Payload) -> &indexmap::IndexMap<String, Value> {
    match payload {
        Payload::Object(fields) => fields.as_ref(),
        other => panic!("expected an object payload, found {}", other.kind_name()),
    }
}

impl Attributes for ObjectType {
    fn attr_type(&self, name: &str) -> Option<Type> {
        self.get(name).cloned()
    }

    fn attr(&self, target: &Payload, name: &str) -> Option<Value> {
        fields_of(target).get(name).cloned()
    }

    fn attr_names(&self) -> Vec<String> {
        self.attrs().map(|(name, _)| name.to_string()).collect()
    }
}

impl Indexable for ObjectType {
    fn can_index(&self, key: &Type) -> bool {
        key.is_string()
    }

    fn index_type(&self, key: Option<&Payload>) -> Option<Type> {
        match key {
            Some(key) => self.get(str_of(key)).cloned(),
            None => self.uniform_attr_type().cloned(),
        }
    }

    fn index(&self, target: &Payload, key: &Payload) -> Option<Value> {
        fields_of(target).get(str_of(key)).cloned()
    }
}

// ============================================================================
// Function
// ============================================================================

impl Callable for FunctionType {
    fn signature(&self) -> &Signature {
        FunctionType::signature(self)
    }

    fn call(&self, callee: &Payload, args: &[Value]) -> Result<Value, String> {
        match callee {
            Payload::Function(function) => function.call(args),
            other => panic!("expected a function payload, found {}", other.kind_name()),
        }
    }
}

// ============================================================================
// Model
// ============================================================================

fn model_of(payload: &Payload) -> &ModelRef {
    match payload {
        Payload::Model(model) => model,
        other => panic!("expected a model payload, found {}", other.kind_name()),
    }
}

impl Attributes for ModelType {
    fn attr_type(&self, name: &str) -> Option<Type> {
        self.behavior().attr_type(name)
    }

    fn attr(&self, target: &Payload, name: &str) -> Option<Value> {
        self.behavior().attr(model_of(target), name)
    }

    fn attr_names(&self) -> Vec<String> {
        self.behavior().attr_names()
    }
}

impl Callable for crate::model::ModelCallable {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn call(&self, callee: &Payload, args: &[Value]) -> Result<Value, String> {
        self.behavior.call(model_of(callee), args)
    }
}
