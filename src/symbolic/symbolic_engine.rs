//! # Symbolic Engine Module
//!
//! Core symbolic expression type for the equano engine. The parser produces
//! `Expr` trees from user-entered text; the samplers and the isosurface
//! extractor evaluate those trees over variable->value scopes.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! The core symbolic expression type supporting:
//! - **Variables**: `Var(String)` - symbolic variables like "x", "theta", "a"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sqrt`, `abs`, `sin`, `cos`, `tg`
//!
//! ### Key Methods
//! - `parse_expression()` - build a tree from a string
//! - `eval_with_scope()` - evaluate to f64 over a HashMap scope
//! - `all_arguments_are_variables()` - collect symbol names
//!
//! Evaluation is deterministic: the same tree evaluated over the same scope
//! yields a bit-identical IEEE-754 double, which the regression tests rely on.
//! Domain errors (ln of a negative number, division by zero) are not errors at
//! this layer; they produce NaN/inf which the samplers filter per point. The
//! only hard evaluation failure is a symbol missing from the scope.

#![allow(non_camel_case_types)]

use std::collections::HashMap;
use std::fmt;

/// Core symbolic expression enum representing mathematical expressions as an
/// abstract syntax tree. Uses Box<Expr> for recursive structures, allowing
/// arbitrarily deep expression trees.
///
/// # Examples
/// ```rust, ignore
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "theta", "a")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Square root: sqrt(x)
    sqrt(Box<Expr>),
    /// Absolute value: abs(x)
    abs(Box<Expr>),
    /// Sine function: sin(x)
    sin(Box<Expr>),
    /// Cosine function: cos(x)
    cos(Box<Expr>),
    /// Tangent function: tan(x) - uses mathematical notation 'tg'
    tg(Box<Expr>),
}

/// Display implementation for pretty printing symbolic expressions.
///
/// Converts expressions to human-readable mathematical notation with
/// parentheses for proper precedence.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sqrt(expr) => write!(f, "sqrt({})", expr),
            Expr::abs(expr) => write!(f, "abs({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Collects every variable name appearing in the expression tree.
    ///
    /// # Returns
    /// Sorted, deduplicated vector of variable names
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut vars = Vec::new();

        match self {
            Expr::Var(name) => {
                vars.push(name.clone());
            }
            Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                vars.extend(lhs.all_arguments_are_variables());
                vars.extend(rhs.all_arguments_are_variables());
            }
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sqrt(expr)
            | Expr::abs(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr) => {
                vars.extend(expr.all_arguments_are_variables());
            }
        }

        vars.sort();
        vars.dedup();
        vars
    } // end of all_arguments_are_variables

    /// Checks whether the expression references the given variable.
    pub fn contains_variable(&self, var_name: &str) -> bool {
        self.all_arguments_are_variables()
            .iter()
            .any(|v| v == var_name)
    }

    /// Evaluates the expression over a variable->value scope.
    ///
    /// A symbol missing from the scope is the only error; IEEE-754 handles
    /// the rest (0/0 is NaN, ln(-1) is NaN, 1/0 is inf) and callers filter
    /// non-finite samples.
    pub fn eval_with_scope(&self, scope: &HashMap<String, f64>) -> Result<f64, String> {
        match self {
            Expr::Var(name) => scope
                .get(name)
                .copied()
                .ok_or_else(|| format!("undefined symbol: {}", name)),
            Expr::Const(val) => Ok(*val),
            Expr::Add(lhs, rhs) => Ok(lhs.eval_with_scope(scope)? + rhs.eval_with_scope(scope)?),
            Expr::Sub(lhs, rhs) => Ok(lhs.eval_with_scope(scope)? - rhs.eval_with_scope(scope)?),
            Expr::Mul(lhs, rhs) => Ok(lhs.eval_with_scope(scope)? * rhs.eval_with_scope(scope)?),
            Expr::Div(lhs, rhs) => Ok(lhs.eval_with_scope(scope)? / rhs.eval_with_scope(scope)?),
            Expr::Pow(base, exp) => {
                Ok(base.eval_with_scope(scope)?.powf(exp.eval_with_scope(scope)?))
            }
            Expr::Exp(expr) => Ok(expr.eval_with_scope(scope)?.exp()),
            Expr::Ln(expr) => Ok(expr.eval_with_scope(scope)?.ln()),
            Expr::sqrt(expr) => Ok(expr.eval_with_scope(scope)?.sqrt()),
            Expr::abs(expr) => Ok(expr.eval_with_scope(scope)?.abs()),
            Expr::sin(expr) => Ok(expr.eval_with_scope(scope)?.sin()),
            Expr::cos(expr) => Ok(expr.eval_with_scope(scope)?.cos()),
            Expr::tg(expr) => Ok(expr.eval_with_scope(scope)?.tan()),
        }
    } // end of eval_with_scope

    /// Converts the expression into an executable closure over a fixed scope
    /// of parameter values, with the named loop variables left free.
    ///
    /// This is the sampler workhorse: the tree walk and the scope merge are
    /// paid once per curve, then the closure is called per sample point with
    /// only the loop-variable values changing.
    ///
    /// # Arguments
    /// * `free_vars` - names of the per-point variables, in call order
    /// * `params` - fixed parameter values (slider scope plus constants)
    ///
    /// # Returns
    /// Err if the expression references a symbol that is neither a free
    /// variable nor a parameter; otherwise a closure from free-variable
    /// values to f64.
    pub fn lambdify_scoped(
        &self,
        free_vars: &[&str],
        params: &HashMap<String, f64>,
    ) -> Result<Box<dyn Fn(&[f64]) -> f64 + Send + Sync>, String> {
        match self {
            Expr::Var(name) => {
                if let Some(index) = free_vars.iter().position(|v| v == name) {
                    Ok(Box::new(move |args| args[index]))
                } else if let Some(val) = params.get(name).copied() {
                    Ok(Box::new(move |_| val))
                } else {
                    Err(format!("undefined symbol: {}", name))
                }
            }
            Expr::Const(val) => {
                let val = *val;
                Ok(Box::new(move |_| val))
            }
            Expr::Add(lhs, rhs) => {
                let lf = lhs.lambdify_scoped(free_vars, params)?;
                let rf = rhs.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| lf(args) + rf(args)))
            }
            Expr::Sub(lhs, rhs) => {
                let lf = lhs.lambdify_scoped(free_vars, params)?;
                let rf = rhs.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| lf(args) - rf(args)))
            }
            Expr::Mul(lhs, rhs) => {
                let lf = lhs.lambdify_scoped(free_vars, params)?;
                let rf = rhs.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| lf(args) * rf(args)))
            }
            Expr::Div(lhs, rhs) => {
                let lf = lhs.lambdify_scoped(free_vars, params)?;
                let rf = rhs.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| lf(args) / rf(args)))
            }
            Expr::Pow(b, e) => {
                let bf = b.lambdify_scoped(free_vars, params)?;
                let ef = e.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| bf(args).powf(ef(args))))
            }
            Expr::Exp(e) => {
                let f = e.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| f(args).exp()))
            }
            Expr::Ln(e) => {
                let f = e.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| f(args).ln()))
            }
            Expr::sqrt(e) => {
                let f = e.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| f(args).sqrt()))
            }
            Expr::abs(e) => {
                let f = e.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| f(args).abs()))
            }
            Expr::sin(e) => {
                let f = e.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| f(args).sin()))
            }
            Expr::cos(e) => {
                let f = e.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| f(args).cos()))
            }
            Expr::tg(e) => {
                let f = e.lambdify_scoped(free_vars, params)?;
                Ok(Box::new(move |args| f(args).tan()))
            }
        }
    } // end of lambdify_scoped
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn scope_of(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_eval_arithmetic() {
        let expr = Expr::Var("x".to_string()).pow(Expr::Const(2.0)) + Expr::Const(1.0);
        let result = expr.eval_with_scope(&scope_of(&[("x", 3.0)])).unwrap();
        assert_eq!(result, 10.0);
    }

    #[test]
    fn test_eval_trig() {
        let expr = Expr::sin(Expr::Var("theta".to_string()).boxed());
        let result = expr
            .eval_with_scope(&scope_of(&[("theta", PI / 2.0)]))
            .unwrap();
        assert_relative_eq!(result, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eval_missing_symbol() {
        let expr = Expr::Var("a".to_string()) * Expr::Var("x".to_string());
        let result = expr.eval_with_scope(&scope_of(&[("x", 1.0)]));
        assert!(result.is_err());
    }

    #[test]
    fn test_eval_domain_error_is_nan_not_err() {
        let expr = Expr::Ln(Expr::Const(-1.0).boxed());
        let result = expr.eval_with_scope(&HashMap::new()).unwrap();
        assert!(result.is_nan());
    }

    #[test]
    fn test_all_arguments_are_variables() {
        let expr = Expr::Var("b".to_string()) * Expr::Var("a".to_string())
            + Expr::sin(Expr::Var("x".to_string()).boxed());
        assert_eq!(
            expr.all_arguments_are_variables(),
            vec!["a".to_string(), "b".to_string(), "x".to_string()]
        );
    }

    #[test]
    fn test_neg_operator() {
        let expr = -(Expr::Var("x".to_string()) + Expr::Const(2.0));
        let result = expr.eval_with_scope(&scope_of(&[("x", 3.0)])).unwrap();
        assert_eq!(result, -5.0);
    }

    #[test]
    fn test_contains_variable() {
        let expr = Expr::Var("a".to_string()) * Expr::sin(Expr::Var("x".to_string()).boxed());
        assert!(expr.contains_variable("x"));
        assert!(expr.contains_variable("a"));
        assert!(!expr.contains_variable("y"));
    }

    #[test]
    fn test_lambdify_scoped_free_and_param() {
        // a*x + b with a, b fixed and x free
        let expr = Expr::Var("a".to_string()) * Expr::Var("x".to_string())
            + Expr::Var("b".to_string());
        let params = scope_of(&[("a", 2.0), ("b", -1.0)]);
        let f = expr.lambdify_scoped(&["x"], &params).unwrap();
        assert_eq!(f(&[3.0]), 5.0);
        assert_eq!(f(&[0.0]), -1.0);
    }

    #[test]
    fn test_lambdify_scoped_unknown_symbol() {
        let expr = Expr::Var("q".to_string());
        assert!(expr.lambdify_scoped(&["x"], &HashMap::new()).is_err());
    }

    #[test]
    fn test_eval_determinism() {
        let expr = Expr::parse_expression("sin(x)*exp(x/3) - sqrt(abs(x))").unwrap();
        let scope = scope_of(&[("x", 1.2345)]);
        let a = expr.eval_with_scope(&scope).unwrap();
        let b = expr.eval_with_scope(&scope).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
