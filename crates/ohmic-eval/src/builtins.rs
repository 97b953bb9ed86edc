//! Builtin names: the global scope and context
//!
//! Both are process-wide singletons, built on first access and sealed:
//! `declare`/`define` on them always fail. Every user scope and context
//! descends from them.
//!
//! # Built-in Names
//!
//! - **Types** - `Bool`, `String`, `Number` and the named dimensions
//!   (`Voltage`, `Current`, `Resistance`, ...)
//! - **Functions** - `abs`, `min`, `max`, `parallel`
//!
//! # Examples
//!
//! ```
//! # use ohmic_eval::builtins::{global_context, global_scope};
//! let volts = global_scope().get("Voltage").unwrap();
//! let value = global_context().value(&volts).unwrap();
//! assert_eq!(value.to_string(), "Voltage");
//! ```

use crate::context::Context;
use crate::scope::Scope;
use crate::types::{Param, ParamType, ReturnType, Signature, Type, NAMED_DIMENSIONS};
use crate::value::Value;
use num_rational::BigRational;
use num_traits::Zero;
use ohmic_units::{Quantity, QuantityError};
use std::cmp::Ordering;
use std::sync::OnceLock;

struct Globals {
    scope: Scope,
    context: Context,
}

static GLOBALS: OnceLock<Globals> = OnceLock::new();

/// The sealed root scope.
pub fn global_scope() -> &'static Scope {
    &globals().scope
}

/// The sealed root context, binding every name in [`global_scope`].
pub fn global_context() -> &'static Context {
    &globals().context
}

fn globals() -> &'static Globals {
    GLOBALS.get_or_init(initialize)
}

fn initialize() -> Globals {
    let mut builtins: Vec<(&str, Value)> = vec![
        ("Bool", Value::type_value(Type::Bool)),
        ("String", Value::type_value(Type::String)),
        ("Number", Value::type_value(Type::dimensionless())),
    ];
    builtins.extend(
        NAMED_DIMENSIONS
            .iter()
            .map(|(name, dims)| (*name, Value::type_value(Type::number(*dims)))),
    );
    builtins.push(("abs", unary_number(|x| Ok(x.abs()))));
    builtins.push(("min", pick(Ordering::Less)));
    builtins.push(("max", pick(Ordering::Greater)));
    builtins.push(("parallel", same_dims_pair(parallel)));

    let (scope, symbols) = Scope::sealed_root(builtins.iter().map(|(name, _)| *name));
    let context = Context::sealed_root(
        symbols
            .into_iter()
            .zip(builtins.into_iter().map(|(_, value)| value)),
    );
    Globals { scope, context }
}

// ============================================================================
// Functions
// ============================================================================

fn quantity_arg(args: &[Value], index: usize) -> Result<&Quantity, String> {
    args.get(index)
        .and_then(Value::as_quantity)
        .ok_or_else(|| format!("argument {} is not a known number", index + 1))
}

/// `fn(x: Number<*>) -> typeof(x)`
fn unary_number(f: fn(&Quantity) -> Result<Quantity, QuantityError>) -> Value {
    let signature = Signature::new(
        vec![Param::new("x", ParamType::AnyNumber)],
        ReturnType::SameAs(0),
    );
    Value::function(signature, move |args| {
        let x = quantity_arg(args, 0)?;
        f(x).map(Value::quantity).map_err(|err| err.to_string())
    })
}

/// `fn(a: Number<*>, b: typeof(a)) -> typeof(a)`
fn same_dims_pair(f: fn(&Quantity, &Quantity) -> Result<Quantity, QuantityError>) -> Value {
    let signature = Signature::new(
        vec![
            Param::new("a", ParamType::AnyNumber),
            Param::new("b", ParamType::SameAs(0)),
        ],
        ReturnType::SameAs(0),
    );
    Value::function(signature, move |args| {
        let a = quantity_arg(args, 0)?;
        let b = quantity_arg(args, 1)?;
        f(a, b).map(Value::quantity).map_err(|err| err.to_string())
    })
}

/// `min`/`max`: the argument ordered `wanted` against the other; `a` on ties.
fn pick(wanted: Ordering) -> Value {
    let signature = Signature::new(
        vec![
            Param::new("a", ParamType::AnyNumber),
            Param::new("b", ParamType::SameAs(0)),
        ],
        ReturnType::SameAs(0),
    );
    Value::function(signature, move |args| {
        let a = quantity_arg(args, 0)?;
        let b = quantity_arg(args, 1)?;
        match b.compare(a) {
            Some(ordering) if ordering == wanted => Ok(args[1].clone()),
            Some(_) => Ok(args[0].clone()),
            None => Err(format!("cannot compare {} and {}", a.dims(), b.dims())),
        }
    })
}

/// Parallel combination `1 / (1/a + 1/b)`, in `a`'s unit. A zero operand
/// shorts the pair.
fn parallel(a: &Quantity, b: &Quantity) -> Result<Quantity, QuantityError> {
    if a.is_zero() || b.is_zero() {
        return Ok(Quantity::with_unit(BigRational::zero(), a.unit().clone()));
    }
    let conductance = a.reciprocal()?.add(&b.reciprocal()?);
    conductance.reciprocal()?.convert_to(a.unit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Arg, Expr};
    use crate::diagnostic::DiagnosticKind;
    use crate::eval::evaluate;
    use crate::span::Span;
    use ohmic_units::Dimensionality;

    fn q(text: &str) -> Value {
        Value::parse_quantity(text).unwrap()
    }

    fn call(name: &str, args: &[Value]) -> (Value, Vec<crate::diagnostic::Diagnostic>) {
        let callee = global_scope().get(name).unwrap();
        let expr = Expr::call(
            Expr::symbol(callee, Span::zero(0)),
            args.iter()
                .map(|value| Arg::positional(Expr::literal(value.clone(), Span::zero(0))))
                .collect(),
            Span::zero(0),
        );
        evaluate(&expr, global_context())
    }

    #[test]
    fn test_type_names() {
        for (name, dims) in NAMED_DIMENSIONS {
            let symbol = global_scope().get(name).unwrap();
            let value = global_context().value(&symbol).unwrap();
            assert_eq!(value.as_type(), Some(&Type::number(*dims)));
        }
        let number = global_scope().get("Number").unwrap();
        assert_eq!(
            global_context().value(&number).unwrap().as_type(),
            Some(&Type::dimensionless())
        );
    }

    #[test]
    #[should_panic(expected = "cannot declare 'x' in the global scope")]
    fn test_global_scope_is_sealed() {
        global_scope().declare("x");
    }

    #[test]
    #[should_panic(expected = "cannot define 'abs' in the global context")]
    fn test_global_context_is_sealed() {
        let abs = global_scope().get("abs").unwrap();
        global_context().define(&abs, Value::bool(true));
    }

    #[test]
    fn test_abs() {
        assert_eq!(call("abs", &[q("-3 mA")]).0, q("3 mA"));
    }

    #[test]
    fn test_min_max() {
        assert_eq!(call("min", &[q("1 kohm"), q("900 ohm")]).0, q("900 ohm"));
        assert_eq!(call("max", &[q("1 kohm"), q("900 ohm")]).0, q("1 kohm"));

        let (value, diagnostics) = call("min", &[q("1 V"), q("1 A")]);
        assert!(value.is_placeholder());
        assert_eq!(diagnostics[0].kind, DiagnosticKind::ArgumentType);
    }

    #[test]
    fn test_parallel() {
        let (value, diagnostics) = call("parallel", &[q("2 kohm"), q("2000 ohm")]);
        assert!(diagnostics.is_empty());
        assert_eq!(value, q("1 kohm"));
        assert_eq!(value.as_quantity().unwrap().unit().symbol(), "kohm");

        assert_eq!(call("parallel", &[q("10 ohm"), q("0 ohm")]).0, q("0 ohm"));

        let (value, diagnostics) = call("parallel", &[q("1 ohm"), q("-1 ohm")]);
        assert!(value.is_placeholder());
        assert_eq!(diagnostics[0].kind, DiagnosticKind::CallFailed);
    }

    #[test]
    fn test_unknown_argument_keeps_type() {
        let unknown = Value::unknown(Type::number(Dimensionality::RESISTANCE));
        let (value, diagnostics) = call("parallel", &[q("1 kohm"), unknown.clone()]);
        assert!(diagnostics.is_empty());
        assert_eq!(value, unknown);
    }
}
