//! Unit-symbol lookup.
//!
//! A small, read-only table from common unit symbols to dimensions, built
//! once on first use. Compound units (`kg*m/s^2`, `N·m`, `m/s2`) are
//! evaluated factor by factor.

use super::Dimension;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static UNITS: LazyLock<BTreeMap<&'static str, Dimension>> = LazyLock::new(|| {
    let d = Dimension::parse;
    let entries: &[(&str, Dimension)] = &[
        ("", Dimension::DIMENSIONLESS),
        ("1", Dimension::DIMENSIONLESS),
        ("rad", Dimension::DIMENSIONLESS),
        ("deg", Dimension::DIMENSIONLESS),
        ("°", Dimension::DIMENSIONLESS),
        ("sr", Dimension::DIMENSIONLESS),
        ("dB", Dimension::DIMENSIONLESS),
        // base units
        ("m", Dimension::LENGTH),
        ("cm", Dimension::LENGTH),
        ("mm", Dimension::LENGTH),
        ("km", Dimension::LENGTH),
        ("nm", Dimension::LENGTH),
        ("kg", Dimension::MASS),
        ("g", Dimension::MASS),
        ("s", Dimension::TIME),
        ("ms", Dimension::TIME),
        ("min", Dimension::TIME),
        ("h", Dimension::TIME),
        ("A", Dimension::CURRENT),
        ("K", Dimension::TEMPERATURE),
        ("°C", Dimension::TEMPERATURE),
        ("degC", Dimension::TEMPERATURE),
        ("mol", Dimension::AMOUNT),
        ("cd", Dimension::LUMINOSITY),
        // derived units
        ("Hz", d("T-1")),
        ("N", d("M L T-2")),
        ("J", d("M L2 T-2")),
        ("eV", d("M L2 T-2")),
        ("W", d("M L2 T-3")),
        ("Pa", d("M L-1 T-2")),
        ("atm", d("M L-1 T-2")),
        ("C", d("T I")),
        ("V", d("M L2 T-3 I-1")),
        ("Ω", d("M L2 T-3 I-2")),
        ("ohm", d("M L2 T-3 I-2")),
        ("F", d("M-1 L-2 T4 I2")),
        ("H", d("M L2 T-2 I-2")),
        ("T", d("M T-2 I-1")),
        ("Wb", d("M L2 T-2 I-1")),
        ("L", d("L3")),
        ("mL", d("L3")),
    ];
    entries.iter().copied().collect()
});

/// Canonical unit names keyed by dimension, used for display and warnings.
static CANONICAL: LazyLock<BTreeMap<[i8; 7], &'static str>> = LazyLock::new(|| {
    [
        ("1", "1"),
        ("m", "m"),
        ("kg", "kg"),
        ("s", "s"),
        ("A", "A"),
        ("K", "K"),
        ("mol", "mol"),
        ("cd", "cd"),
        ("Hz", "Hz"),
        ("N", "N"),
        ("J", "J"),
        ("W", "W"),
        ("Pa", "Pa"),
        ("C", "C"),
        ("V", "V"),
        ("Ω", "Ω"),
        ("F", "F"),
        ("H", "H"),
        ("T", "T"),
        ("L", "m^3"),
    ]
    .into_iter()
    .filter_map(|(symbol, name)| UNITS.get(symbol).map(|d| (d.exponents(), name)))
    .collect()
});

/// Dimension of a (possibly compound) unit string.
///
/// Returns `None` when any factor is not a known unit.
pub fn dimension_of(unit: &str) -> Option<Dimension> {
    let unit = unit.trim();
    if let Some(d) = UNITS.get(unit) {
        return Some(*d);
    }

    let mut parts = unit.split('/');
    let numerator = product_of(parts.next()?)?;
    parts.try_fold(numerator, |acc, denominator| {
        product_of(denominator).map(|d| acc / d)
    })
}

/// Canonical unit symbol for a dimension, if it has one.
pub fn canonical_unit(dimension: &Dimension) -> Option<&'static str> {
    CANONICAL.get(&dimension.exponents()).copied()
}

fn product_of(term: &str) -> Option<Dimension> {
    term.split(['*', '·', ' ', '.'])
        .filter(|f| !f.is_empty())
        .try_fold(Dimension::DIMENSIONLESS, |acc, factor| {
            factor_dimension(factor).map(|d| acc * d)
        })
}

fn factor_dimension(factor: &str) -> Option<Dimension> {
    if let Some(d) = UNITS.get(factor) {
        return Some(*d);
    }

    // Split a trailing exponent: `s^2`, `s2`, `m^-1`, `m-1`.
    let split = factor
        .char_indices()
        .find(|(_, c)| *c == '^' || *c == '-' || c.is_ascii_digit())
        .map(|(i, _)| i)?;
    let (symbol, exponent) = factor.split_at(split);
    let exponent: i8 = exponent.trim_start_matches('^').parse().ok()?;
    UNITS.get(symbol).map(|d| d.pow(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_units() {
        assert_eq!(dimension_of("m"), Some(Dimension::LENGTH));
        assert_eq!(dimension_of("N"), Some(Dimension::parse("M L T-2")));
        assert_eq!(dimension_of("rad"), Some(Dimension::DIMENSIONLESS));
    }

    #[test]
    fn test_compound_units() {
        assert_eq!(dimension_of("m/s"), Some(Dimension::parse("L T-1")));
        assert_eq!(dimension_of("m/s^2"), Some(Dimension::parse("L T-2")));
        assert_eq!(dimension_of("m/s2"), Some(Dimension::parse("L T-2")));
        assert_eq!(dimension_of("kg*m/s^2"), dimension_of("N"));
        assert_eq!(dimension_of("N·m"), dimension_of("J"));
        assert_eq!(dimension_of("N/m"), Some(Dimension::parse("M T-2")));
        assert_eq!(dimension_of("kg/m^3"), Some(Dimension::parse("M L-3")));
        assert_eq!(dimension_of("J/(kg"), None);
    }

    #[test]
    fn test_unknown_units() {
        assert_eq!(dimension_of("furlong"), None);
        assert_eq!(dimension_of("m/fortnight"), None);
    }

    #[test]
    fn test_canonical_unit() {
        assert_eq!(canonical_unit(&Dimension::parse("M L T-2")), Some("N"));
        assert_eq!(canonical_unit(&Dimension::parse("L3")), Some("m^3"));
        assert_eq!(canonical_unit(&Dimension::parse("L5")), None);
    }
}
