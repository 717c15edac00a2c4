//! Parameter validation
//!
//! Validation runs whenever a parameter value changes, independently of body
//! resolution. Errors are keyed by parameter key; any error blocks a run from
//! starting.

use crate::scenario::{ParameterDeclaration, ParameterKind, Scenario};
use std::collections::BTreeMap;
use std::fmt;

/// Resolved parameter values, keyed by parameter key
pub type ParameterValues = BTreeMap<String, String>;

/// Validation failures, keyed by parameter key
pub type ValidationErrors = BTreeMap<String, String>;

/// A single parameter validation failure
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// Value is empty or missing
    Required,
    /// Numeric parameter holds something that is not a finite number
    NotANumber,
    /// Numeric value below the declared minimum
    BelowMin {
        /// Declared minimum
        min: f64,
    },
    /// Numeric value above the declared maximum
    AboveMax {
        /// Declared maximum
        max: f64,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::Required => write!(f, "Value is required"),
            ParameterError::NotANumber => write!(f, "Must be a number"),
            ParameterError::BelowMin { min } => write!(f, "Must be at least {min}"),
            ParameterError::AboveMax { max } => write!(f, "Must be at most {max}"),
        }
    }
}

/// Parse a numeric parameter value, rejecting NaN and infinities
pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Validate one value against its declaration
pub fn validate_value(
    decl: &ParameterDeclaration,
    value: Option<&str>,
) -> Result<(), ParameterError> {
    let value = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Err(ParameterError::Required),
    };

    match decl.kind {
        ParameterKind::Number => {
            let number = parse_number(value).ok_or(ParameterError::NotANumber)?;
            if let Some(min) = decl.min {
                if number < min {
                    return Err(ParameterError::BelowMin { min });
                }
            }
            if let Some(max) = decl.max {
                if number > max {
                    return Err(ParameterError::AboveMax { max });
                }
            }
            Ok(())
        }
        ParameterKind::String | ParameterKind::Enum => Ok(()),
    }
}

/// Validate every declared parameter of a scenario
pub fn validate_parameters(scenario: &Scenario, values: &ParameterValues) -> ValidationErrors {
    scenario
        .parameters
        .iter()
        .filter_map(|decl| {
            validate_value(decl, values.get(&decl.key).map(String::as_str))
                .err()
                .map(|err| (decl.key.clone(), err.to_string()))
        })
        .collect()
}

/// Parameter values seeded from each declaration's default
pub fn default_values(scenario: &Scenario) -> ParameterValues {
    scenario
        .parameters
        .iter()
        .map(|decl| (decl.key.clone(), decl.default_value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(min: Option<f64>, max: Option<f64>) -> ParameterDeclaration {
        ParameterDeclaration {
            key: "NEWVAL".to_string(),
            label: "New value".to_string(),
            default_value: "100".to_string(),
            kind: ParameterKind::Number,
            min,
            max,
            options: None,
        }
    }

    fn scenario_with(decls: Vec<ParameterDeclaration>) -> Scenario {
        Scenario {
            id: "s".to_string(),
            title: "t".to_string(),
            standard: "E30".to_string(),
            description: String::new(),
            parameters: decls,
            steps: Vec::new(),
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let decl = numeric(Some(0.0), Some(9999.0));
        assert!(validate_value(&decl, Some("0")).is_ok());
        assert!(validate_value(&decl, Some("9999")).is_ok());
        assert_eq!(
            validate_value(&decl, Some("-1")),
            Err(ParameterError::BelowMin { min: 0.0 })
        );
        assert_eq!(
            validate_value(&decl, Some("10000")),
            Err(ParameterError::AboveMax { max: 9999.0 })
        );
    }

    #[test]
    fn test_zero_counts_as_present() {
        let decl = numeric(None, None);
        assert!(validate_value(&decl, Some("0")).is_ok());
        assert_eq!(validate_value(&decl, Some("")), Err(ParameterError::Required));
        assert_eq!(validate_value(&decl, Some("  ")), Err(ParameterError::Required));
        assert_eq!(validate_value(&decl, None), Err(ParameterError::Required));
    }

    #[test]
    fn test_non_numeric_rejected() {
        let decl = numeric(None, None);
        assert_eq!(
            validate_value(&decl, Some("abc")),
            Err(ParameterError::NotANumber)
        );
        assert_eq!(
            validate_value(&decl, Some("inf")),
            Err(ParameterError::NotANumber)
        );
    }

    #[test]
    fn test_error_map_is_keyed_by_parameter() {
        let scenario = scenario_with(vec![numeric(Some(0.0), Some(9999.0))]);
        let mut values = default_values(&scenario);
        assert!(validate_parameters(&scenario, &values).is_empty());

        values.insert("NEWVAL".to_string(), "-1".to_string());
        let errors = validate_parameters(&scenario, &values);
        assert_eq!(errors.get("NEWVAL").map(String::as_str), Some("Must be at least 0"));
    }

    #[test]
    fn test_enum_value_outside_options_is_accepted() {
        let decl = ParameterDeclaration {
            key: "MODE".to_string(),
            label: "Mode".to_string(),
            default_value: "ONLINE".to_string(),
            kind: ParameterKind::Enum,
            min: None,
            max: None,
            options: Some(vec!["ONLINE".to_string(), "OFFLINE".to_string()]),
        };
        assert!(validate_value(&decl, Some("OFFLINE")).is_ok());
        assert!(validate_value(&decl, Some("LOCAL")).is_ok());
        assert_eq!(validate_value(&decl, Some("")), Err(ParameterError::Required));
    }

    #[test]
    fn test_string_only_needs_a_value() {
        let decl = ParameterDeclaration {
            kind: ParameterKind::String,
            ..numeric(None, None)
        };
        assert!(validate_value(&decl, Some("anything")).is_ok());
        assert_eq!(validate_value(&decl, Some("")), Err(ParameterError::Required));
    }
}
