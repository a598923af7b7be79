#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///# Example
/// ```
/// use equano::symbolic::symbolic_engine::Expr;
/// let input = "x^2 + sin(a*x)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!("parsed_expression {}", parsed_expression);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds the symbolic expression tree produced by the parser
/// 2) evaluates a symbolic expression over a variable->value scope
/// 3) turns a symbolic expression into a string expression for printing and control of results
///# Example#
/// ```
/// use std::collections::HashMap;
/// use equano::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("x^2 + 1").unwrap();
/// let mut scope = HashMap::new();
/// scope.insert("x".to_string(), 3.0);
/// assert_eq!(f.eval_with_scope(&scope).unwrap(), 10.0);
/// // return vec of all arguments
/// let all = f.all_arguments_are_variables();
/// assert_eq!(all, vec!["x".to_string()]);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
///________________________________________________________________________________________________________________________________________________
/// public evaluation boundary: canonicalize a raw string (Unicode symbols,
/// implicit multiplication), evaluate it over a scope with injected constants,
/// and extract its free variable names with a best-effort fallback
///# Example#
/// ```
/// use std::collections::HashMap;
/// use equano::symbolic::symbolic_eval::{evaluate_expression, extract_variables};
/// let v = evaluate_expression("sin(pi/2)", &HashMap::new()).unwrap();
/// assert!((v - 1.0).abs() < 1e-9);
/// assert_eq!(extract_variables("a*sin(b*x+c)"), vec!["a", "b", "c", "x"]);
/// ```
pub mod symbolic_eval;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility functions mainly for bracket parsing and proceeding
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
