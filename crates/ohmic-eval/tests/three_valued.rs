//! Unknown and Placeholder propagation through every operator.

use ohmic_eval::ops::{apply_binary, apply_unary};
use ohmic_eval::{BinaryOp, Type, UnaryOp, Value};
use ohmic_units::Dimensionality;

fn q(text: &str) -> Value {
    Value::parse_quantity(text).unwrap()
}

/// Operator, a known operand for each side, and the natural result type.
fn known_cases() -> Vec<(BinaryOp, Value, Value, Type)> {
    let volts = Type::number(Dimensionality::VOLTAGE);
    vec![
        (BinaryOp::Add, q("1 V"), q("2 V"), volts.clone()),
        (BinaryOp::Sub, q("1 V"), q("2 V"), volts.clone()),
        (
            BinaryOp::Mul,
            q("1 A"),
            q("2 ohm"),
            Type::number(Dimensionality::VOLTAGE),
        ),
        (
            BinaryOp::Div,
            q("1 V"),
            q("2 ohm"),
            Type::number(Dimensionality::CURRENT),
        ),
        (BinaryOp::Add, Value::string("R"), Value::string("1"), Type::String),
        (BinaryOp::Eq, q("1 V"), q("2 V"), Type::Bool),
        (BinaryOp::Ne, Value::bool(true), Value::bool(false), Type::Bool),
        (BinaryOp::Lt, q("1 V"), q("2 V"), Type::Bool),
        (BinaryOp::Ge, q("1 V"), q("2 V"), Type::Bool),
        (BinaryOp::And, Value::bool(false), Value::bool(true), Type::Bool),
        (BinaryOp::Or, Value::bool(true), Value::bool(false), Type::Bool),
    ]
}

fn unknown_like(value: &Value) -> Value {
    Value::unknown(value.ty().unwrap().clone())
}

#[test]
fn unknown_operand_gives_unknown_of_result_type() {
    for (op, lhs, rhs, result) in known_cases() {
        let left = apply_binary(op, &unknown_like(&lhs), &rhs).unwrap();
        let right = apply_binary(op, &lhs, &unknown_like(&rhs)).unwrap();
        assert_eq!(left, Value::unknown(result.clone()), "{:?} with unknown lhs", op);
        assert_eq!(right, Value::unknown(result), "{:?} with unknown rhs", op);
    }
}

#[test]
fn placeholder_operand_gives_placeholder() {
    for (op, lhs, rhs, _) in known_cases() {
        assert!(apply_binary(op, &Value::placeholder(), &rhs).unwrap().is_placeholder());
        assert!(apply_binary(op, &lhs, &Value::placeholder()).unwrap().is_placeholder());
    }
    // even where the known side could never be a valid operand
    assert!(apply_binary(BinaryOp::And, &q("1 V"), &Value::placeholder())
        .unwrap()
        .is_placeholder());
    assert!(apply_unary(UnaryOp::Neg, &Value::placeholder())
        .unwrap()
        .is_placeholder());
    assert!(apply_unary(UnaryOp::Not, &Value::placeholder())
        .unwrap()
        .is_placeholder());
}

#[test]
fn unary_unknowns() {
    let current = Type::number(Dimensionality::CURRENT);
    assert_eq!(
        apply_unary(UnaryOp::Neg, &Value::unknown(current.clone())).unwrap(),
        Value::unknown(current)
    );
    assert_eq!(
        apply_unary(UnaryOp::Not, &Value::unknown(Type::Bool)).unwrap(),
        Value::unknown(Type::Bool)
    );
}

#[test]
fn object_equality_with_unknown_attribute() {
    let unknown_bool = Value::object([("foo".to_string(), Value::unknown(Type::Bool))]);
    let known_bool = Value::object([("foo".to_string(), Value::bool(true))]);
    assert_eq!(unknown_bool.equal(&known_bool), Value::unknown(Type::Bool));

    let unknown_string = Value::object([("foo".to_string(), Value::unknown(Type::String))]);
    assert_eq!(unknown_string.equal(&known_bool).as_bool(), Some(false));
}

#[test]
fn object_equality_definite_mismatch_wins() {
    let lhs = Value::object([
        ("a".to_string(), Value::unknown(Type::Bool)),
        ("b".to_string(), Value::bool(true)),
    ]);
    let rhs = Value::object([
        ("a".to_string(), Value::bool(true)),
        ("b".to_string(), Value::bool(false)),
    ]);
    assert_eq!(lhs.equal(&rhs).as_bool(), Some(false));
}

#[test]
fn equality_across_types_is_false() {
    assert_eq!(q("1 V").equal(&q("1 A")).as_bool(), Some(false));
    assert_eq!(
        Value::unknown(Type::String).equal(&Value::bool(true)).as_bool(),
        Some(false)
    );
}
