use crate::core::dimension::{self, Dimension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value with its unit and dimension. `value == None` marks an unknown.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Quantity {
    pub value: Option<f64>,
    pub unit: String,
    pub dimension: Dimension,
}

impl Quantity {
    /// Build a quantity, deriving the dimension from the unit registry.
    /// Unknown units yield a dimensionless quantity.
    pub fn new(value: Option<f64>, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        let dimension = dimension::dimension_of(&unit).unwrap_or_default();
        Self {
            value,
            unit,
            dimension,
        }
    }

    pub fn known(value: f64, unit: impl Into<String>) -> Self {
        Self::new(Some(value), unit)
    }

    pub fn unknown(unit: impl Into<String>) -> Self {
        Self::new(None, unit)
    }

    pub fn is_known(&self) -> bool {
        self.value.is_some_and(f64::is_finite)
    }
}

/// How a parameter entered the system.
///
/// The derived `Ord` is the merge priority:
/// `Unknown < Derived < Constant < Given`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Unknown,
    Derived,
    Constant,
    Given,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub symbol: String,
    pub quantity: Quantity,
    pub role: Role,
    pub dependencies: Vec<String>,
    pub description: String,
}

impl Parameter {
    pub fn new(symbol: impl Into<String>, quantity: Quantity, role: Role) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            role,
            dependencies: Vec::new(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_dependencies<S: Into<String>>(mut self, deps: impl IntoIterator<Item = S>) -> Self {
        self.dependencies = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn value(&self) -> Option<f64> {
        self.quantity.value.filter(|v| v.is_finite())
    }

    /// Whether `self` should replace `current` when both describe one symbol.
    fn outranks(&self, current: &Parameter) -> bool {
        match self.role.cmp(&current.role) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => current.value().is_none() && self.value().is_some(),
        }
    }
}

/// Merge parameter lists into one record per symbol.
///
/// The highest [`Role`] wins. On equal roles a record with a value replaces
/// one without; otherwise the first record seen is kept. Output is sorted by
/// symbol.
pub fn merge_parameters(params: impl IntoIterator<Item = Parameter>) -> Vec<Parameter> {
    params
        .into_iter()
        .fold(BTreeMap::<String, Parameter>::new(), |mut merged, param| {
            match merged.get(&param.symbol) {
                Some(current) if !param.outranks(current) => {}
                _ => {
                    merged.insert(param.symbol.clone(), param);
                }
            }
            merged
        })
        .into_values()
        .collect()
}

/// Lookup table over a merged parameter list.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable<'a> {
    by_symbol: BTreeMap<&'a str, &'a Parameter>,
}

impl<'a> ParameterTable<'a> {
    pub fn new(params: &'a [Parameter]) -> Self {
        Self {
            by_symbol: params.iter().map(|p| (p.symbol.as_str(), p)).collect(),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&'a Parameter> {
        self.by_symbol.get(symbol).copied()
    }

    pub fn value(&self, symbol: &str) -> Option<f64> {
        self.get(symbol).and_then(Parameter::value)
    }

    /// First known value among several spellings of one quantity.
    pub fn value_any(&self, symbols: &[&str]) -> Option<f64> {
        symbols.iter().find_map(|s| self.value(s))
    }

    /// Angle value in radians; degrees are converted when the unit says so.
    pub fn angle(&self, symbols: &[&str]) -> Option<f64> {
        symbols.iter().find_map(|s| {
            let p = self.get(s)?;
            let v = p.value()?;
            match p.quantity.unit.as_str() {
                "deg" | "°" | "degree" | "degrees" => Some(v.to_radians()),
                _ => Some(v),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(symbol: &str, value: Option<f64>, role: Role) -> Parameter {
        Parameter::new(symbol, Quantity::new(value, "m"), role)
    }

    #[test]
    fn test_role_total_order() {
        assert!(Role::Given > Role::Constant);
        assert!(Role::Constant > Role::Derived);
        assert!(Role::Derived > Role::Unknown);
    }

    #[test]
    fn test_given_wins_regardless_of_order() {
        let given = param("h", Some(10.0), Role::Given);
        let derived = param("h", Some(3.0), Role::Derived);
        let constant = param("h", Some(1.0), Role::Constant);

        let a = merge_parameters([derived.clone(), given.clone(), constant.clone()]);
        let b = merge_parameters([given.clone(), constant, derived]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].role, Role::Given);
        assert_eq!(a[0].value(), Some(10.0));
    }

    #[test]
    fn test_equal_roles_prefer_known_value() {
        let merged = merge_parameters([
            param("v", None, Role::Unknown),
            param("v", Some(2.0), Role::Unknown),
            param("v", Some(5.0), Role::Unknown),
        ]);
        assert_eq!(merged[0].value(), Some(2.0));
    }

    #[test]
    fn test_merge_sorts_by_symbol() {
        let merged = merge_parameters([
            param("x", None, Role::Unknown),
            param("a", None, Role::Unknown),
            param("m", None, Role::Unknown),
        ]);
        let symbols: Vec<_> = merged.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, ["a", "m", "x"]);
    }

    #[test]
    fn test_angle_conversion() {
        let params = vec![Parameter::new("theta", Quantity::known(90.0, "deg"), Role::Given)];
        let table = ParameterTable::new(&params);
        let angle = table.angle(&["theta"]).unwrap();
        assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
