use newton::core::dimension::{Dimension, canonical_unit, dimension_of};

fn samples() -> Vec<Dimension> {
    ["1", "L", "M", "T-1", "L M T-2", "L2 M T-2", "L-3 M", "I T", "L2 M T-3 I-1", "Θ", "N"]
        .into_iter()
        .map(Dimension::parse)
        .collect()
}

#[test]
fn test_multiply_by_unit_ratio_is_identity() {
    for d in samples() {
        for d2 in samples() {
            assert_eq!(d.multiply(&d2.divide(&d2)), d);
            assert_eq!(d.multiply(&d2).divide(&d2), d);
        }
    }
}

#[test]
fn test_parse_format_round_trip() {
    for d in samples() {
        assert_eq!(Dimension::parse(&d.to_string()), d);
    }
    assert_eq!(Dimension::DIMENSIONLESS.to_string(), "1");
}

#[test]
fn test_consistency_is_an_equivalence() {
    let all = samples();
    for a in &all {
        assert!(a.consistent(a));
        for b in &all {
            assert_eq!(a.consistent(b), b.consistent(a));
            for c in &all {
                if a.consistent(b) && b.consistent(c) {
                    assert!(a.consistent(c));
                }
            }
        }
    }
}

#[test]
fn test_derived_units_agree() {
    let force = dimension_of("N").unwrap();
    assert!(force.consistent(&dimension_of("kg*m/s^2").unwrap()));
    assert!(dimension_of("J").unwrap().consistent(&(force * Dimension::LENGTH)));
    assert!(dimension_of("W").unwrap().consistent(&dimension_of("J/s").unwrap()));
    assert_eq!(canonical_unit(&force), Some("N"));
    assert_eq!(dimension_of("furlong"), None);
}
