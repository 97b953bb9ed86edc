//! Conversion of evaluated values into host-native data.

use crate::model::ModelRef;
use crate::types::Type;
use crate::value::{FunctionRef, Payload, Value};
use indexmap::IndexMap;
use ohmic_units::Quantity;

/// A fully-known value, stripped of its language type.
#[derive(Debug, Clone)]
pub enum Native {
    Bool(bool),
    String(String),
    Quantity(Quantity),
    /// Attributes in definition order; `None` where an attribute is not
    /// fully known.
    Object(IndexMap<String, Option<Native>>),
    Function(FunctionRef),
    Model(ModelRef),
    Type(Type),
}

impl Native {
    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Native::Quantity(quantity) => Some(quantity),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Option<Native>>> {
        match self {
            Native::Object(attrs) => Some(attrs),
            _ => None,
        }
    }
}

/// Host view of `value`, or `None` when it is Unknown or Placeholder.
pub fn unwrap(value: &Value) -> Option<Native> {
    let native = match value.payload()? {
        Payload::Bool(value) => Native::Bool(*value),
        Payload::String(value) => Native::String(value.to_string()),
        Payload::Quantity(quantity) => Native::Quantity(quantity.clone()),
        Payload::Object(attrs) => Native::Object(
            attrs
                .iter()
                .map(|(name, attr)| (name.clone(), unwrap(attr)))
                .collect(),
        ),
        Payload::Function(function) => Native::Function(function.clone()),
        Payload::Type(ty) => Native::Type(Type::clone(ty)),
        Payload::Model(object) => Native::Model(object.clone()),
    };
    Some(native)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Param, ParamType, ReturnType, Signature};
    use ohmic_units::Dimensionality;

    #[test]
    fn test_unknown_and_placeholder_unwrap_to_none() {
        assert!(unwrap(&Value::placeholder()).is_none());
        assert!(unwrap(&Value::unknown(Type::Bool)).is_none());
    }

    #[test]
    fn test_scalars() {
        assert!(matches!(unwrap(&Value::bool(true)), Some(Native::Bool(true))));
        assert!(matches!(
            unwrap(&Value::string("r1")),
            Some(Native::String(s)) if s == "r1"
        ));
        let native = unwrap(&Value::parse_quantity("4.7 kohm").unwrap()).unwrap();
        assert_eq!(
            native.as_quantity(),
            Some(&Quantity::parse("4700 ohm").unwrap())
        );
    }

    #[test]
    fn test_object_keeps_partial_attributes() {
        let value = Value::object([
            ("gain".to_string(), Value::parse_quantity("10").unwrap()),
            (
                "vout".to_string(),
                Value::unknown(Type::number(Dimensionality::VOLTAGE)),
            ),
        ]);
        let native = unwrap(&value).unwrap();
        let attrs = native.as_object().unwrap();
        assert!(attrs["gain"].is_some());
        assert!(attrs["vout"].is_none());
        assert_eq!(attrs.keys().collect::<Vec<_>>(), ["gain", "vout"]);
    }

    #[test]
    fn test_function_stays_invocable() {
        let signature = Signature::new(
            vec![Param::new("x", ParamType::Exact(Type::Bool))],
            ReturnType::Fixed(Type::Bool),
        );
        let not = Value::function(signature, |args| {
            Ok(Value::bool(!args[0].as_bool().unwrap_or(false)))
        });
        let Some(Native::Function(function)) = unwrap(&not) else {
            panic!("expected a function");
        };
        assert_eq!(function.call(&[Value::bool(true)]), Ok(Value::bool(false)));
    }

    #[test]
    fn test_type_value() {
        let value = Value::type_value(Type::number(Dimensionality::CURRENT));
        assert!(matches!(
            unwrap(&value),
            Some(Native::Type(ty)) if ty == Type::number(Dimensionality::CURRENT)
        ));
    }
}
