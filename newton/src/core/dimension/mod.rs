//! Dimensional analysis over the seven SI base dimensions.
//!
//! A [`Dimension`] is a vector of signed exponents. Multiplying two
//! quantities adds their exponents, dividing subtracts them, and two
//! quantities are commensurable exactly when their vectors are equal.
//!
//! The textual form is a list of `<base><exponent>` tokens using the bases
//! `L M T I Θ N J`, e.g. `"M L T-2"` for force. Parsing is tolerant: unknown
//! bases are skipped so partially specified problems still yield a vector.
//!
//! ```rust
//! # use newton::core::dimension::Dimension;
//! let force = Dimension::parse("M L T-2");
//! let accel = Dimension::LENGTH / Dimension::TIME.pow(2);
//! assert!(force.consistent(&(Dimension::MASS * accel)));
//! assert_eq!(force.to_string(), "L M T-2");
//! ```

pub mod units;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Div, Mul};

pub use units::{canonical_unit, dimension_of};

/// SI base-dimension exponents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct Dimension {
    /// Length (L), metre.
    pub length: i8,
    /// Mass (M), kilogram.
    pub mass: i8,
    /// Time (T), second.
    pub time: i8,
    /// Electric current (I), ampere.
    pub current: i8,
    /// Thermodynamic temperature (Θ), kelvin.
    pub temperature: i8,
    /// Amount of substance (N), mole.
    pub amount: i8,
    /// Luminous intensity (J), candela.
    pub luminosity: i8,
}

/// Base symbols in canonical order.
const BASES: [char; 7] = ['L', 'M', 'T', 'I', 'Θ', 'N', 'J'];

impl Dimension {
    pub const DIMENSIONLESS: Dimension = Dimension {
        length: 0,
        mass: 0,
        time: 0,
        current: 0,
        temperature: 0,
        amount: 0,
        luminosity: 0,
    };

    pub const LENGTH: Dimension = Dimension {
        length: 1,
        ..Self::DIMENSIONLESS
    };

    pub const MASS: Dimension = Dimension {
        mass: 1,
        ..Self::DIMENSIONLESS
    };

    pub const TIME: Dimension = Dimension {
        time: 1,
        ..Self::DIMENSIONLESS
    };

    pub const CURRENT: Dimension = Dimension {
        current: 1,
        ..Self::DIMENSIONLESS
    };

    pub const TEMPERATURE: Dimension = Dimension {
        temperature: 1,
        ..Self::DIMENSIONLESS
    };

    pub const AMOUNT: Dimension = Dimension {
        amount: 1,
        ..Self::DIMENSIONLESS
    };

    pub const LUMINOSITY: Dimension = Dimension {
        luminosity: 1,
        ..Self::DIMENSIONLESS
    };

    pub const fn from_exponents(exponents: [i8; 7]) -> Self {
        Self {
            length: exponents[0],
            mass: exponents[1],
            time: exponents[2],
            current: exponents[3],
            temperature: exponents[4],
            amount: exponents[5],
            luminosity: exponents[6],
        }
    }

    pub const fn exponents(&self) -> [i8; 7] {
        [
            self.length,
            self.mass,
            self.time,
            self.current,
            self.temperature,
            self.amount,
            self.luminosity,
        ]
    }

    /// Parse a dimension string such as `"M L T-2"`, `"L^2 T^-1"` or `"LT-2"`.
    ///
    /// Unknown bases (and any exponent attached to them) are ignored.
    /// Repeated bases accumulate, so `"L L"` is `L2`.
    pub fn parse(input: &str) -> Self {
        let mut exponents = [0i8; 7];
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            let slot = match c {
                'θ' => Some(4),
                _ => BASES.iter().position(|&b| b == c),
            };

            if slot.is_none() && !c.is_alphabetic() {
                // separators, stray digits and signs
                continue;
            }

            // Exponent: optional '^', optional sign, digits.
            if chars.peek() == Some(&'^') {
                chars.next();
            }
            let mut negative = false;
            match chars.peek() {
                Some('-') | Some('−') => {
                    negative = true;
                    chars.next();
                }
                Some('+') => {
                    chars.next();
                }
                _ => {}
            }
            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }
            let magnitude: i32 = if digits.is_empty() {
                1
            } else {
                digits.parse().unwrap_or(i32::from(i8::MAX))
            };
            let exponent = if negative { -magnitude } else { magnitude };

            if let Some(slot) = slot {
                let sum = i32::from(exponents[slot]) + exponent;
                exponents[slot] = sum.clamp(i32::from(i8::MIN), i32::from(i8::MAX)) as i8;
            }
        }

        Self::from_exponents(exponents)
    }

    pub fn is_dimensionless(&self) -> bool {
        *self == Self::DIMENSIONLESS
    }

    /// Dimension of the product of two quantities (exponents add).
    pub fn multiply(&self, other: &Dimension) -> Dimension {
        self.zip_with(other, |a, b| a.saturating_add(b))
    }

    /// Dimension of the quotient of two quantities (exponents subtract).
    pub fn divide(&self, other: &Dimension) -> Dimension {
        self.zip_with(other, |a, b| a.saturating_sub(b))
    }

    /// Raise to an integer power (exponents scale).
    pub fn pow(&self, exponent: i8) -> Dimension {
        let e = self.exponents().map(|a| a.saturating_mul(exponent));
        Self::from_exponents(e)
    }

    /// Whether two quantities with these dimensions are commensurable.
    pub fn consistent(&self, other: &Dimension) -> bool {
        self == other
    }

    fn zip_with(&self, other: &Dimension, f: impl Fn(i8, i8) -> i8) -> Dimension {
        let a = self.exponents();
        let b = other.exponents();
        Self::from_exponents(std::array::from_fn(|i| f(a[i], b[i])))
    }
}

impl Mul for Dimension {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

impl Div for Dimension {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        self.divide(&rhs)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }

        let parts: Vec<String> = BASES
            .iter()
            .zip(self.exponents())
            .filter(|(_, e)| *e != 0)
            .map(|(base, e)| match e {
                1 => base.to_string(),
                e => format!("{base}{e}"),
            })
            .collect();

        write!(f, "{}", parts.join(" "))
    }
}

impl From<Dimension> for String {
    fn from(d: Dimension) -> Self {
        d.to_string()
    }
}

impl From<String> for Dimension {
    fn from(s: String) -> Self {
        Dimension::parse(&s)
    }
}

impl From<&str> for Dimension {
    fn from(s: &str) -> Self {
        Dimension::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_tokens() {
        let force = Dimension::parse("M L T-2");
        assert_eq!(force.mass, 1);
        assert_eq!(force.length, 1);
        assert_eq!(force.time, -2);
        assert_eq!(force.current, 0);
    }

    #[test]
    fn test_parse_compact_and_caret_forms() {
        assert_eq!(Dimension::parse("LT-2"), Dimension::parse("L T^-2"));
        assert_eq!(Dimension::parse("L^2 M T^-3 I^-1").current, -1);
        assert_eq!(Dimension::parse("Θ").temperature, 1);
        assert_eq!(Dimension::parse("θ+2").temperature, 2);
    }

    #[test]
    fn test_unknown_bases_are_ignored() {
        let d = Dimension::parse("L X3 T-1 Q");
        assert_eq!(d, Dimension::LENGTH / Dimension::TIME);
    }

    #[test]
    fn test_repeated_bases_accumulate() {
        assert_eq!(Dimension::parse("L L T-1 T-1"), Dimension::parse("L2 T-2"));
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["1", "L", "L M T-2", "L2 M T-3 I-1", "Θ-1 N", "J"] {
            let d = Dimension::parse(s);
            assert_eq!(d.to_string(), s);
            assert_eq!(Dimension::parse(&d.to_string()), d);
        }
    }

    #[test]
    fn test_multiply_divide_inverse() {
        let energy = Dimension::parse("M L2 T-2");
        let time = Dimension::TIME;
        assert_eq!((energy * time) / time, energy);
        assert_eq!(energy.divide(&energy), Dimension::DIMENSIONLESS);
    }

    #[test]
    fn test_pow() {
        assert_eq!(Dimension::LENGTH.pow(3), Dimension::parse("L3"));
        assert_eq!(Dimension::TIME.pow(-1), Dimension::parse("T-1"));
    }

    #[test]
    fn test_serde_uses_string_form() {
        let d = Dimension::parse("M L T-2");
        let s = ron::to_string(&d).unwrap();
        assert_eq!(s, "\"L M T-2\"");
        let back: Dimension = ron::from_str(&s).unwrap();
        assert_eq!(back, d);
    }
}
