//! Type system for the ohmic value kernel
//!
//! The type set is closed:
//! - **Bool**, **String** - scalars
//! - **Number** - a quantity of one [`Dimensionality`]; the unit scale is a
//!   value-level detail, so `1 kohm` and `1 ohm` share a type
//! - **Object** - named attributes, compared structurally and order-insensitively
//! - **Function** - a [`Signature`]
//! - **TypeType** - the type of type values such as `Voltage`
//! - **Model** - nominal wrapper around an externally defined object
//!
//! Behavior is not attached to the variants directly. Operators ask a type
//! for a capability (`arithmetic()`, `concat()`, `attributes()`,
//! `callable()`, `indexable()`) and dispatch through the returned trait
//! object; see [`crate::capability`].
//!
//! # Examples
//!
//! ```
//! # use ohmic_eval::types::*;
//! # use ohmic_units::Dimensionality;
//! let volts = Type::number(Dimensionality::VOLTAGE);
//! assert!(volts.arithmetic().is_some());
//! assert!(volts.concat().is_none());
//! assert_eq!(volts.to_string(), "Voltage");
//! ```

use crate::capability::{Arithmetic, Attributes, Callable, Concat, Indexable, StringConcat};
use crate::model::ModelType;
use crate::value::Value;
use indexmap::IndexMap;
use ohmic_units::Dimensionality;
use std::fmt;
use std::sync::Arc;

/// Dimensions that have a builtin type name.
pub const NAMED_DIMENSIONS: &[(&str, Dimensionality)] = &[
    ("Voltage", Dimensionality::VOLTAGE),
    ("Current", Dimensionality::CURRENT),
    ("Resistance", Dimensionality::RESISTANCE),
    ("Capacitance", Dimensionality::CAPACITANCE),
    ("Inductance", Dimensionality::INDUCTANCE),
    ("Power", Dimensionality::POWER),
    ("Frequency", Dimensionality::FREQUENCY),
    ("Time", Dimensionality::TIME),
    ("Length", Dimensionality::LENGTH),
    ("Charge", Dimensionality::CHARGE),
    ("Conductance", Dimensionality::CONDUCTANCE),
];

/// A value's type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Bool,
    String,
    Number(NumberType),
    Object(ObjectType),
    Function(FunctionType),
    /// The type of types
    TypeType,
    Model(ModelType),
}

/// Numeric type: a dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberType {
    pub dims: Dimensionality,
}

/// Object type: attribute name → attribute type.
///
/// Equality ignores attribute order.
#[derive(Debug, Clone, Default)]
pub struct ObjectType {
    attrs: IndexMap<String, Type>,
}

/// Function type: a shared signature.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    signature: Arc<Signature>,
}

/// Parameters and return type of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub returns: ReturnType,
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: ParamType,
    /// Used when the caller omits the argument
    pub default: Option<Value>,
}

/// Constraint on an argument's type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamType {
    /// Any type
    Any,
    /// Any Number, whatever its dimensionality
    AnyNumber,
    /// Exactly this type
    Exact(Type),
    /// Same type as the argument bound to the parameter at this index
    SameAs(usize),
}

/// How a call's result type is determined.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnType {
    Fixed(Type),
    /// Same type as the argument bound to the parameter at this index
    SameAs(usize),
}

impl Type {
    pub fn number(dims: Dimensionality) -> Self {
        Type::Number(NumberType { dims })
    }

    pub fn dimensionless() -> Self {
        Type::number(Dimensionality::DIMENSIONLESS)
    }

    pub fn object(attrs: impl IntoIterator<Item = (String, Type)>) -> Self {
        Type::Object(ObjectType::new(attrs))
    }

    pub fn function(signature: Signature) -> Self {
        Type::Function(FunctionType::new(signature))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Bool)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::String)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Type::Number(_))
    }

    pub fn as_number(&self) -> Option<&NumberType> {
        match self {
            Type::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Type::Object(object) => Some(object),
            _ => None,
        }
    }

    // ============================================================================
    // Capabilities
    // ============================================================================

    /// `+ - * /`, negation and ordering. Numbers only.
    pub fn arithmetic(&self) -> Option<&dyn Arithmetic> {
        match self {
            Type::Number(number) => Some(number),
            _ => None,
        }
    }

    /// String concatenation through `+`.
    pub fn concat(&self) -> Option<&dyn Concat> {
        match self {
            Type::String => Some(&StringConcat),
            _ => None,
        }
    }

    /// `target.name` access.
    pub fn attributes(&self) -> Option<&dyn Attributes> {
        match self {
            Type::Object(object) => Some(object),
            Type::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Call with arguments.
    pub fn callable(&self) -> Option<&dyn Callable> {
        match self {
            Type::Function(function) => Some(function),
            Type::Model(model) => model.callable(),
            _ => None,
        }
    }

    /// `target[key]` access.
    pub fn indexable(&self) -> Option<&dyn Indexable> {
        match self {
            Type::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl NumberType {
    pub fn new(dims: Dimensionality) -> Self {
        Self { dims }
    }

    /// Builtin name for this dimensionality, if it has one.
    pub fn named(&self) -> Option<&'static str> {
        if self.dims.is_dimensionless() {
            return Some("Number");
        }
        NAMED_DIMENSIONS
            .iter()
            .find(|(_, dims)| *dims == self.dims)
            .map(|(name, _)| *name)
    }
}

impl ObjectType {
    pub fn new(attrs: impl IntoIterator<Item = (String, Type)>) -> Self {
        Self {
            attrs: attrs.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.attrs.get(name)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.attrs.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// The single type shared by every attribute, if there is one.
    pub fn uniform_attr_type(&self) -> Option<&Type> {
        let mut types = self.attrs.values();
        let first = types.next()?;
        types.all(|ty| ty == first).then_some(first)
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.attrs.len() == other.attrs.len()
            && self
                .attrs
                .iter()
                .all(|(name, ty)| other.attrs.get(name) == Some(ty))
    }
}

impl FunctionType {
    pub fn new(signature: Signature) -> Self {
        Self {
            signature: Arc::new(signature),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl Signature {
    pub fn new(params: Vec<Param>, returns: ReturnType) -> Self {
        Self { params, returns }
    }

    /// Position of the parameter called `name`.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|param| param.name == name)
    }

    /// Check an argument type against parameter `index`.
    ///
    /// `bound` holds the types of the other arguments, by parameter
    /// position, where they are known; a `SameAs` constraint against an
    /// unbound parameter accepts anything.
    pub fn accepts(&self, index: usize, ty: &Type, bound: &[Option<Type>]) -> bool {
        match &self.params[index].ty {
            ParamType::Any => true,
            ParamType::AnyNumber => ty.is_number(),
            ParamType::Exact(expected) => expected == ty,
            ParamType::SameAs(other) => match bound.get(*other) {
                Some(Some(expected)) => expected == ty,
                _ => true,
            },
        }
    }

    /// Result type given the types of the bound arguments.
    pub fn return_type(&self, args: &[Type]) -> Type {
        match &self.returns {
            ReturnType::Fixed(ty) => ty.clone(),
            ReturnType::SameAs(index) => args[*index].clone(),
        }
    }

    /// Readable constraint of parameter `index`, e.g. `Number<*>` or
    /// `typeof(a)`.
    pub fn describe_param(&self, index: usize) -> String {
        self.describe_constraint(&self.params[index].ty)
    }

    fn describe_constraint(&self, param: &ParamType) -> String {
        match param {
            ParamType::Any => "Any".to_string(),
            ParamType::AnyNumber => "Number<*>".to_string(),
            ParamType::Exact(ty) => ty.to_string(),
            ParamType::SameAs(index) => format!("typeof({})", self.params[*index].name),
        }
    }
}

impl Param {
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "Bool"),
            Type::String => write!(f, "String"),
            Type::Number(number) => write!(f, "{}", number),
            Type::Object(object) => write!(f, "{}", object),
            Type::Function(function) => write!(f, "{}", function.signature),
            Type::TypeType => write!(f, "Type"),
            Type::Model(model) => write!(f, "{}", model.name()),
        }
    }
}

impl fmt::Display for NumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.named() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "Number[{}]", self.dims),
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attrs: Vec<String> = self
            .attrs
            .iter()
            .map(|(name, ty)| format!("{}: {}", name, ty))
            .collect();
        write!(f, "{{{}}}", attrs.join(", "))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|param| format!("{}: {}", param.name, self.describe_constraint(&param.ty)))
            .collect();
        let returns = match &self.returns {
            ReturnType::Fixed(ty) => ty.to_string(),
            ReturnType::SameAs(index) => format!("typeof({})", self.params[*index].name),
        };
        write!(f, "fn({}) -> {}", params.join(", "), returns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_names() {
        assert_eq!(Type::dimensionless().to_string(), "Number");
        assert_eq!(Type::number(Dimensionality::RESISTANCE).to_string(), "Resistance");
        assert_eq!(
            Type::number(Dimensionality::ENERGY).to_string(),
            "Number[kg·m^2·s^-2]"
        );
    }

    #[test]
    fn test_object_equality_ignores_order() {
        let a = Type::object([
            ("r".to_string(), Type::number(Dimensionality::RESISTANCE)),
            ("label".to_string(), Type::String),
        ]);
        let b = Type::object([
            ("label".to_string(), Type::String),
            ("r".to_string(), Type::number(Dimensionality::RESISTANCE)),
        ]);
        assert_eq!(a, b);

        let c = Type::object([("label".to_string(), Type::String)]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_capabilities() {
        let number = Type::dimensionless();
        assert!(number.arithmetic().is_some());
        assert!(number.attributes().is_none());

        assert!(Type::String.concat().is_some());
        assert!(Type::String.arithmetic().is_none());

        let object = Type::object([("x".to_string(), Type::Bool)]);
        assert!(object.attributes().is_some());
        assert!(object.indexable().is_some());
        assert!(object.callable().is_none());

        assert!(Type::Bool.arithmetic().is_none());
        assert!(Type::TypeType.callable().is_none());
    }

    #[test]
    fn test_uniform_attr_type() {
        let uniform = ObjectType::new([
            ("a".to_string(), Type::Bool),
            ("b".to_string(), Type::Bool),
        ]);
        assert_eq!(uniform.uniform_attr_type(), Some(&Type::Bool));

        let mixed = ObjectType::new([
            ("a".to_string(), Type::Bool),
            ("b".to_string(), Type::String),
        ]);
        assert_eq!(mixed.uniform_attr_type(), None);
        assert_eq!(ObjectType::default().uniform_attr_type(), None);
    }

    #[test]
    fn test_signature_checks() {
        let signature = Signature::new(
            vec![
                Param::new("a", ParamType::AnyNumber),
                Param::new("b", ParamType::SameAs(0)),
            ],
            ReturnType::SameAs(0),
        );
        let volts = Type::number(Dimensionality::VOLTAGE);
        let amps = Type::number(Dimensionality::CURRENT);

        assert!(signature.accepts(0, &volts, &[]));
        assert!(!signature.accepts(0, &Type::String, &[]));
        assert!(signature.accepts(1, &volts, &[Some(volts.clone()), None]));
        assert!(!signature.accepts(1, &amps, &[Some(volts.clone()), None]));
        assert!(signature.accepts(1, &amps, &[None, None]));
        assert_eq!(signature.return_type(&[volts.clone(), volts.clone()]), volts);
        assert_eq!(signature.param_index("b"), Some(1));
        assert_eq!(
            signature.to_string(),
            "fn(a: Number<*>, b: typeof(a)) -> typeof(a)"
        );
    }
}
