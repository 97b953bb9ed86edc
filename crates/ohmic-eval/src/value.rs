//! Values and three-valued semantics
//!
//! A [`Value`] is one of:
//!
//! | Variant | Type | Payload | Meaning |
//! |---------|------|---------|---------|
//! | `Known` | ✓ | ✓ | an ordinary value |
//! | `Unknown` | ✓ | ✗ | the type is fixed but the value is not yet available |
//! | `Placeholder` | ✗ | ✗ | error recovery; absorbs every operation |
//!
//! `Unknown` lets a template be evaluated abstractly to discover its result
//! type. `Placeholder` stands in for anything that already produced a
//! diagnostic, so one mistake is reported once rather than at every use.
//!
//! # Examples
//!
//! ```
//! # use ohmic_eval::value::*;
//! # use ohmic_eval::types::Type;
//! let yes = Value::bool(true);
//! let maybe = Value::unknown(Type::Bool);
//! assert_eq!(yes.equal(&maybe), Value::unknown(Type::Bool));
//! assert!(Value::placeholder().equal(&yes).is_placeholder());
//! ```

use crate::model::{ModelRef, ModelType};
use crate::types::{Signature, Type};
use indexmap::IndexMap;
use ohmic_units::{Quantity, QuantityError};
use std::fmt;
use std::sync::Arc;

/// Fractional digits `Display` uses for non-terminating magnitudes.
const DEFAULT_DISPLAY_DIGITS: usize = 12;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Known { ty: Type, payload: Payload },
    Unknown(Type),
    Placeholder,
}

/// Data carried by a known value.
#[derive(Debug, Clone)]
pub enum Payload {
    Bool(bool),
    String(Arc<str>),
    Quantity(Quantity),
    Object(Arc<IndexMap<String, Value>>),
    Function(FunctionRef),
    Type(Arc<Type>),
    Model(ModelRef),
}

type Callback = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

/// Shared handle to a host callback.
#[derive(Clone)]
pub struct FunctionRef(Arc<Callback>);

impl FunctionRef {
    pub fn new(callback: impl Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        (self.0)(args)
    }

    /// Same underlying callback.
    pub fn ptr_eq(&self, other: &FunctionRef) -> bool {
        Arc::as_ptr(&self.0) as *const () == Arc::as_ptr(&other.0) as *const ()
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionRef({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

impl Payload {
    /// Variant name, for invariant-violation messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Payload::Bool(_) => "bool",
            Payload::String(_) => "string",
            Payload::Quantity(_) => "quantity",
            Payload::Object(_) => "object",
            Payload::Function(_) => "function",
            Payload::Type(_) => "type",
            Payload::Model(_) => "model",
        }
    }
}

impl Value {
    // ============================================================================
    // Construction
    // ============================================================================

    pub fn bool(value: bool) -> Self {
        Value::Known {
            ty: Type::Bool,
            payload: Payload::Bool(value),
        }
    }

    pub fn string(value: impl Into<Arc<str>>) -> Self {
        Value::Known {
            ty: Type::String,
            payload: Payload::String(value.into()),
        }
    }

    pub fn quantity(quantity: Quantity) -> Self {
        Value::Known {
            ty: Type::number(*quantity.dims()),
            payload: Payload::Quantity(quantity),
        }
    }

    /// Parse a quantity literal such as `4.7 kohm`.
    pub fn parse_quantity(text: &str) -> Result<Self, QuantityError> {
        Quantity::parse(text).map(Value::quantity)
    }

    /// Build an object. A Placeholder attribute makes the whole object a
    /// Placeholder; Unknown attributes are kept.
    pub fn object(attrs: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut fields = IndexMap::new();
        let mut types = Vec::new();
        for (name, value) in attrs {
            let Some(ty) = value.ty() else {
                return Value::Placeholder;
            };
            types.push((name.clone(), ty.clone()));
            fields.insert(name, value);
        }
        Value::Known {
            ty: Type::object(types),
            payload: Payload::Object(Arc::new(fields)),
        }
    }

    pub fn function(
        signature: Signature,
        callback: impl Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        Value::Known {
            ty: Type::function(signature),
            payload: Payload::Function(FunctionRef::new(callback)),
        }
    }

    /// A type used as a value (`Voltage`, `Bool`).
    pub fn type_value(ty: Type) -> Self {
        Value::Known {
            ty: Type::TypeType,
            payload: Payload::Type(Arc::new(ty)),
        }
    }

    pub fn model(ty: ModelType, object: ModelRef) -> Self {
        Value::Known {
            ty: Type::Model(ty),
            payload: Payload::Model(object),
        }
    }

    pub fn unknown(ty: Type) -> Self {
        Value::Unknown(ty)
    }

    pub fn placeholder() -> Self {
        Value::Placeholder
    }

    // ============================================================================
    // Inspection
    // ============================================================================

    /// Type, unless this is a Placeholder.
    pub fn ty(&self) -> Option<&Type> {
        match self {
            Value::Known { ty, .. } | Value::Unknown(ty) => Some(ty),
            Value::Placeholder => None,
        }
    }

    /// Payload, if known.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Value::Known { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Value::Known { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown(_))
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Value::Placeholder)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.payload() {
            Some(Payload::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.payload() {
            Some(Payload::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self.payload() {
            Some(Payload::Quantity(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self.payload() {
            Some(Payload::Type(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self.payload() {
            Some(Payload::Object(fields)) => Some(fields),
            _ => None,
        }
    }

    // ============================================================================
    // Equality
    // ============================================================================

    /// Language-level equality.
    ///
    /// Placeholder on either side gives Placeholder. Differing types are a
    /// definite `false`. Same types with an Unknown side give
    /// `Unknown(Bool)`. Objects compare attribute by attribute: a definite
    /// mismatch anywhere wins, otherwise any Unknown attribute makes the
    /// answer Unknown.
    pub fn equal(&self, other: &Value) -> Value {
        let (Some(lhs_ty), Some(rhs_ty)) = (self.ty(), other.ty()) else {
            return Value::Placeholder;
        };
        if lhs_ty != rhs_ty {
            return Value::bool(false);
        }
        match (self.payload(), other.payload()) {
            (Some(Payload::Object(lhs)), Some(Payload::Object(rhs))) => object_equal(lhs, rhs),
            (Some(lhs), Some(rhs)) => Value::bool(payload_same(lhs, rhs)),
            _ => Value::unknown(Type::Bool),
        }
    }

    /// Host-level identity of two values; always decidable.
    ///
    /// Unknown-ness is part of the comparison: `Unknown(Bool)` is the same
    /// as `Unknown(Bool)` but not as `true`.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Placeholder, Value::Placeholder) => true,
            (Value::Unknown(lhs), Value::Unknown(rhs)) => lhs == rhs,
            (
                Value::Known {
                    ty: lhs_ty,
                    payload: lhs,
                },
                Value::Known {
                    ty: rhs_ty,
                    payload: rhs,
                },
            ) => lhs_ty == rhs_ty && payload_same(lhs, rhs),
            _ => false,
        }
    }

    // ============================================================================
    // Rendering
    // ============================================================================

    /// Human-readable text with `digits` fractional digits for
    /// non-terminating magnitudes.
    pub fn render(&self, digits: usize) -> String {
        match self {
            Value::Placeholder => "<placeholder>".to_string(),
            Value::Unknown(ty) => format!("<unknown {}>", ty),
            Value::Known { ty, payload } => match payload {
                Payload::Bool(value) => value.to_string(),
                Payload::String(value) => format!("{:?}", value),
                Payload::Quantity(quantity) => {
                    let magnitude = quantity.to_decimal_string(digits);
                    match quantity.unit().to_string() {
                        unit if unit.is_empty() => magnitude,
                        unit => format!("{} {}", magnitude, unit),
                    }
                }
                Payload::Object(fields) => {
                    let attrs: Vec<String> = fields
                        .iter()
                        .map(|(name, value)| format!("{}: {}", name, value.render(digits)))
                        .collect();
                    format!("{{{}}}", attrs.join(", "))
                }
                Payload::Function(_) => format!("<{}>", ty),
                Payload::Type(inner) => inner.to_string(),
                Payload::Model(_) => format!("<{}>", ty),
            },
        }
    }
}

fn object_equal(lhs: &IndexMap<String, Value>, rhs: &IndexMap<String, Value>) -> Value {
    let mut undecided = false;
    for (name, lhs_value) in lhs {
        let Some(rhs_value) = rhs.get(name) else {
            return Value::bool(false);
        };
        match lhs_value.equal(rhs_value).as_bool() {
            Some(false) => return Value::bool(false),
            Some(true) => {}
            None => undecided = true,
        }
    }
    if undecided {
        Value::unknown(Type::Bool)
    } else {
        Value::bool(true)
    }
}

fn payload_same(lhs: &Payload, rhs: &Payload) -> bool {
    match (lhs, rhs) {
        (Payload::Bool(a), Payload::Bool(b)) => a == b,
        (Payload::String(a), Payload::String(b)) => a == b,
        (Payload::Quantity(a), Payload::Quantity(b)) => a == b,
        (Payload::Object(a), Payload::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(name, value)| b.get(name).is_some_and(|other| value.same(other)))
        }
        (Payload::Function(a), Payload::Function(b)) => a.ptr_eq(b),
        (Payload::Type(a), Payload::Type(b)) => a == b,
        (Payload::Model(a), Payload::Model(b)) => a.ptr_eq(b),
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::bool(value)
    }
}

impl From<Quantity> for Value {
    fn from(quantity: Quantity) -> Self {
        Value::quantity(quantity)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(DEFAULT_DISPLAY_DIGITS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Param, ParamType, ReturnType};
    use ohmic_units::Dimensionality;

    fn q(text: &str) -> Value {
        Value::parse_quantity(text).unwrap()
    }

    fn obj(attrs: Vec<(&str, Value)>) -> Value {
        Value::object(
            attrs
                .into_iter()
                .map(|(name, value)| (name.to_string(), value)),
        )
    }

    #[test]
    fn test_quantity_type_tracks_dimension() {
        let v = q("4.7 kohm");
        assert_eq!(v.ty(), Some(&Type::number(Dimensionality::RESISTANCE)));
        assert_eq!(q("1 ohm").ty(), v.ty());
    }

    #[test]
    fn test_equal_placeholder_absorbs() {
        assert!(Value::placeholder().equal(&q("1 V")).is_placeholder());
        assert!(q("1 V").equal(&Value::placeholder()).is_placeholder());
    }

    #[test]
    fn test_equal_type_mismatch_is_false() {
        assert_eq!(q("1 V").equal(&q("1 A")), Value::bool(false));
        assert_eq!(
            Value::unknown(Type::String).equal(&Value::bool(true)),
            Value::bool(false)
        );
    }

    #[test]
    fn test_equal_unknown_same_type() {
        assert_eq!(
            Value::unknown(Type::dimensionless()).equal(&q("3")),
            Value::unknown(Type::Bool)
        );
    }

    #[test]
    fn test_equal_quantities_by_base_value() {
        assert_eq!(q("100 cm").equal(&q("1 m")), Value::bool(true));
        assert_eq!(q("1 kV").equal(&q("1 V")), Value::bool(false));
    }

    #[test]
    fn test_equal_objects() {
        let unknown_bool = obj(vec![("foo", Value::unknown(Type::Bool))]);
        let known_bool = obj(vec![("foo", Value::bool(true))]);
        assert_eq!(unknown_bool.equal(&known_bool), Value::unknown(Type::Bool));

        let unknown_string = obj(vec![("foo", Value::unknown(Type::String))]);
        assert_eq!(unknown_string.equal(&known_bool), Value::bool(false));

        // a definite mismatch wins over an undecided attribute
        let left = obj(vec![("a", Value::unknown(Type::Bool)), ("b", Value::bool(true))]);
        let right = obj(vec![("a", Value::bool(true)), ("b", Value::bool(false))]);
        assert_eq!(left.equal(&right), Value::bool(false));

        let reordered = obj(vec![("b", Value::bool(true)), ("a", Value::bool(false))]);
        let original = obj(vec![("a", Value::bool(false)), ("b", Value::bool(true))]);
        assert_eq!(original.equal(&reordered), Value::bool(true));
    }

    #[test]
    fn test_object_with_placeholder_is_placeholder() {
        let broken = obj(vec![("ok", Value::bool(true)), ("bad", Value::placeholder())]);
        assert!(broken.is_placeholder());
    }

    #[test]
    fn test_functions_compare_by_identity() {
        let signature = Signature::new(
            vec![Param::new("x", ParamType::Any)],
            ReturnType::Fixed(Type::Bool),
        );
        let f = Value::function(signature.clone(), |_| Ok(Value::bool(true)));
        let g = Value::function(signature, |_| Ok(Value::bool(true)));
        assert_eq!(f.equal(&f.clone()), Value::bool(true));
        assert_eq!(f.equal(&g), Value::bool(false));
    }

    #[test]
    fn test_same_distinguishes_unknown() {
        assert!(Value::unknown(Type::Bool).same(&Value::unknown(Type::Bool)));
        assert!(!Value::unknown(Type::Bool).same(&Value::bool(true)));
        assert!(Value::placeholder().same(&Value::placeholder()));
        assert!(q("3 A").same(&q("3000 mA")));
    }

    #[test]
    fn test_render() {
        assert_eq!(q("4.7 kohm").to_string(), "4.7 kohm");
        assert_eq!(Value::string("r1").to_string(), "\"r1\"");
        assert_eq!(Value::unknown(Type::Bool).to_string(), "<unknown Bool>");
        assert_eq!(
            Value::type_value(Type::number(Dimensionality::VOLTAGE)).to_string(),
            "Voltage"
        );
        let third = Value::quantity(
            q("1 V")
                .as_quantity()
                .unwrap()
                .divide(q("3").as_quantity().unwrap())
                .unwrap(),
        );
        assert_eq!(third.render(2), "0.33 V");
        assert_eq!(
            obj(vec![("ok", Value::bool(true))]).to_string(),
            "{ok: true}"
        );
    }
}
