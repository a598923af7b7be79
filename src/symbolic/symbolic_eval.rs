//! Public evaluation boundary of the expression engine.
//!
//! Raw user text arrives with Unicode math notation (θ, π, √) and implicit
//! multiplication ("3θ"); [`canonicalize`] rewrites it into the grammar the
//! parser understands. [`evaluate_expression`] then evaluates over a caller
//! scope augmented with the constants `pi`, `e` and a defaulted `theta`, and
//! wraps any failure in [`InvalidExpression`] carrying the original text.
//! [`extract_variables`] feeds the slider binder and must never hard-fail:
//! when parsing breaks it degrades to a regex scan for single-letter symbols.

use crate::symbolic::symbolic_engine::Expr;
use regex::Regex;
use std::collections::HashMap;
use std::f64::consts::{E, PI};
use std::fmt;
use std::sync::LazyLock;

/// Symbols that never become free variables: constants and function names.
pub const RESERVED_SYMBOLS: [&str; 10] = [
    "pi", "e", "sin", "cos", "tan", "log", "ln", "sqrt", "abs", "exp",
];

/// Failure of an evaluate-on-demand query. The message format is part of the
/// external interface and must stay `"Invalid expression: <text>"`.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidExpression {
    pub text: String,
}

impl fmt::Display for InvalidExpression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid expression: {}", self.text)
    }
}

impl std::error::Error for InvalidExpression {}

static IMPLICIT_MUL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)(?:([eE][+-]?\d)|([a-zA-Z(]))").expect("static pattern"));

/// Rewrites user notation into the parser grammar: Unicode constants and the
/// radical sign become names, and a digit directly followed by a letter or an
/// opening bracket gets an explicit `*` ("3theta" -> "3*theta"). Scientific
/// literals ("1e-5") are left untouched.
pub fn canonicalize(expr: &str) -> String {
    let replaced = expr
        .replace('θ', "theta")
        .replace('π', "pi")
        .replace('√', "sqrt");
    IMPLICIT_MUL
        .replace_all(&replaced, |caps: &regex::Captures| {
            if caps.get(2).is_some() {
                caps[0].to_string()
            } else {
                format!("{}*{}", &caps[1], &caps[3])
            }
        })
        .into_owned()
}

/// Builds the effective scope for one evaluation: caller variables plus the
/// injected constants. `theta` defaults to the caller's `theta` (or `θ`)
/// entry, else 0 - the polar sampler relies on this default.
fn augmented_scope(variables: &HashMap<String, f64>) -> HashMap<String, f64> {
    let mut scope = variables.clone();
    let theta = variables
        .get("theta")
        .or_else(|| variables.get("θ"))
        .copied()
        .unwrap_or(0.0);
    scope.insert("theta".to_string(), theta);
    scope.insert("pi".to_string(), PI);
    scope.insert("e".to_string(), E);
    scope
}

/// Evaluates a raw expression string over a variable->value scope.
///
/// Deterministic: the same text and scope always produce the same IEEE-754
/// double. Parse failures and unknown symbols surface as
/// [`InvalidExpression`]; domain errors flow through as NaN/inf for the
/// caller to filter.
pub fn evaluate_expression(
    expr: &str,
    variables: &HashMap<String, f64>,
) -> Result<f64, InvalidExpression> {
    let canonical = canonicalize(expr);
    let scope = augmented_scope(variables);
    Expr::parse_expression(&canonical)
        .and_then(|parsed| parsed.eval_with_scope(&scope))
        .map_err(|_| InvalidExpression {
            text: expr.to_string(),
        })
}

/// Parses an expression once and compiles it into a closure over the named
/// free variables, with all other symbols bound from `variables` plus the
/// injected constants. The samplers use this to avoid re-walking the tree at
/// every sample point.
pub fn compile_expression(
    expr: &str,
    free_vars: &[&str],
    variables: &HashMap<String, f64>,
) -> Result<Box<dyn Fn(&[f64]) -> f64 + Send + Sync>, InvalidExpression> {
    let canonical = canonicalize(expr);
    let scope = augmented_scope(variables);
    Expr::parse_expression(&canonical)
        .and_then(|parsed| parsed.lambdify_scoped(free_vars, &scope))
        .map_err(|_| InvalidExpression {
            text: expr.to_string(),
        })
}

static SINGLE_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([a-zA-Z])\b").expect("static pattern"));

/// Extracts the free variable names of an expression, excluding the reserved
/// constants and function names.
///
/// Degrades gracefully: if the text does not parse, falls back to a regex
/// scan for single-letter tokens so the slider binder still gets a
/// best-effort list. Output is sorted and deduplicated.
pub fn extract_variables(expr: &str) -> Vec<String> {
    let canonical = canonicalize(expr);
    let mut vars = match Expr::parse_expression(&canonical) {
        Ok(parsed) => parsed.all_arguments_are_variables(),
        Err(_) => SINGLE_LETTER
            .find_iter(&canonical)
            .map(|m| m.as_str().to_string())
            .collect(),
    };
    vars.retain(|v| !RESERVED_SYMBOLS.contains(&v.as_str()));
    vars.sort();
    vars.dedup();
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_evaluate_constant_scope() {
        let v = evaluate_expression("sin(pi/2)", &HashMap::new()).unwrap();
        assert_relative_eq!(v, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_evaluate_eulers_number() {
        let v = evaluate_expression("ln(e)", &HashMap::new()).unwrap();
        assert_relative_eq!(v, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_theta_defaults_to_zero() {
        let v = evaluate_expression("cos(theta)", &HashMap::new()).unwrap();
        assert_eq!(v, 1.0);
    }

    #[test]
    fn test_unicode_theta_and_implicit_multiplication() {
        let mut scope = HashMap::new();
        scope.insert("theta".to_string(), std::f64::consts::PI / 6.0);
        // sin(3θ) = sin(pi/2) = 1
        let v = evaluate_expression("sin(3θ)", &scope).unwrap();
        assert_relative_eq!(v, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_scientific_notation_is_not_implicit_multiplication() {
        // "1e-5" is a literal, not 1 * e - 5
        assert_eq!(canonicalize("1e-5"), "1e-5");
        let v = evaluate_expression("1e-5", &HashMap::new()).unwrap();
        assert_relative_eq!(v, 1.0e-5, epsilon = 1e-18);
        let v = evaluate_expression("2E+3 + x", &HashMap::from([("x".to_string(), 1.0)]))
            .unwrap();
        assert_eq!(v, 2001.0);
        // a sign after a spelled-out e stays an operator
        let v = evaluate_expression("2*e-5", &HashMap::new()).unwrap();
        assert_relative_eq!(v, 2.0 * std::f64::consts::E - 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_radical_sign() {
        let v = evaluate_expression("√(9)", &HashMap::new()).unwrap();
        assert_eq!(v, 3.0);
    }

    #[test]
    fn test_invalid_expression_message() {
        let err = evaluate_expression("x +* 2", &HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid expression: x +* 2");
    }

    #[test]
    fn test_unknown_symbol_is_invalid() {
        assert!(evaluate_expression("q + 1", &HashMap::new()).is_err());
    }

    #[test]
    fn test_extract_variables() {
        assert_eq!(extract_variables("a*sin(b*x+c)"), vec!["a", "b", "c", "x"]);
    }

    #[test]
    fn test_extract_variables_excludes_reserved() {
        assert_eq!(extract_variables("e*sin(pi*x)"), vec!["x"]);
    }

    #[test]
    fn test_extract_variables_fallback_on_parse_error() {
        // unbalanced bracket defeats the parser; regex fallback still finds a, x
        assert_eq!(extract_variables("a*sin(x"), vec!["a", "x"]);
    }

    #[test]
    fn test_compile_expression() {
        let mut params = HashMap::new();
        params.insert("a".to_string(), 2.0);
        let f = compile_expression("a*x^2", &["x"], &params).unwrap();
        assert_eq!(f(&[3.0]), 18.0);
    }
}
