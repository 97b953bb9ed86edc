//! Algebraic properties of quantity arithmetic across the standard catalog.

use ohmic_units::{Dimensionality, Quantity, UnitCatalog};
use std::cmp::Ordering;

const SAMPLE_UNITS: &[&str] = &[
    "V", "mV", "kohm", "Ω", "uF", "nH", "W", "MHz", "mA", "cm", "mil", "ms", "1",
];

fn q(text: &str) -> Quantity {
    Quantity::parse(text).unwrap()
}

fn samples() -> Vec<Quantity> {
    let catalog = UnitCatalog::standard();
    SAMPLE_UNITS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let unit = catalog.by_name(name).unwrap().clone();
            Quantity::from_integer(i as i64 + 2, unit)
        })
        .collect()
}

#[test]
fn product_dimension_is_sum_of_dimensions() {
    for a in samples() {
        for b in samples() {
            let product = a.multiply(&b).unwrap();
            assert_eq!(Some(*product.dims()), a.dims().multiply(b.dims()));
        }
    }
}

#[test]
fn quotient_dimension_is_difference_of_dimensions() {
    for a in samples() {
        for b in samples() {
            let quotient = a.divide(&b).unwrap();
            assert_eq!(Some(*quotient.dims()), a.dims().divide(b.dims()));
        }
    }
}

#[test]
fn sum_keeps_shared_dimension() {
    for a in samples() {
        for b in samples().into_iter().filter(|b| b.dims() == a.dims()) {
            let sum = a.add(&b);
            assert_eq!(sum.dims(), a.dims());
            assert_eq!(sum.to_base(), a.to_base() + b.to_base());
        }
    }
}

#[test]
fn product_with_reciprocal_is_dimensionless_one() {
    for a in samples() {
        let one = a.multiply(&a.reciprocal().unwrap()).unwrap();
        assert!(one.dims().is_dimensionless());
        assert_eq!(one, q("1"));
    }
}

#[test]
fn equality_is_base_normalized() {
    assert_eq!(q("100 cm"), q("1 m"));
    assert_eq!(q("0.001 kohm"), q("1 Ω"));
    assert_eq!(q("1000 mil"), q("1 in"));
    assert_eq!(q("1 h"), q("60 min"));
}

#[test]
fn ohms_law_round_trip() {
    let v = q("3 A").multiply(&q("2 ohm")).unwrap();
    assert_eq!(*v.dims(), Dimensionality::VOLTAGE);
    assert_eq!(v, q("6 V"));

    let i = q("3 V").divide(&q("2 ohm")).unwrap();
    assert_eq!(*i.dims(), Dimensionality::CURRENT);
    assert_eq!(i, q("1.5 A"));
}

#[test]
fn rc_time_constant() {
    let tau = q("10 kohm").multiply(&q("100 nF")).unwrap();
    assert_eq!(*tau.dims(), Dimensionality::TIME);
    assert_eq!(tau.compare(&q("1 ms")), Some(Ordering::Equal));
}
