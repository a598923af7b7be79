use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{
    find_char_position_outside_brackets, find_matching_bracket,
    find_rightmost_operator_outside_brackets,
};
use log::trace;
/// a module turns a String expression into a symbolic expression
///# Example
/// ```
/// use equano::symbolic::symbolic_engine::Expr;
/// let input = "x^2 * sin(a*x + b)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!("parsed_expression {}", parsed_expression);
/// ```
//                  search recursion diagram
//                "y^2+exp(x)+sin(x)/y"             |
//                |       left  | right             |
//                |_________________________________|
//                |           div by    +           |
//                |_________________________________|
//                | y^2+exp(x)  |  sin(x)/y         |
//                |       |     |          |        |
//                |_____ \|/    |          |        |
//                |    div by+  |       div by /    |
//                |_____________|___________________|
//                |  y^2 exp(x) |  sin(x)    y      |
//                  etc...

/// Recognized unary function prefixes, longest names first so that e.g.
/// "sqrt(" is never matched as a variable followed by garbage.
const FUNCTIONS: [(&str, fn(Box<Expr>) -> Expr); 9] = [
    ("sqrt", Expr::sqrt),
    ("abs", Expr::abs),
    ("exp", Expr::Exp),
    ("log", Expr::Ln),
    ("sin", Expr::sin),
    ("cos", Expr::cos),
    ("tan", Expr::tg),
    ("ln", Expr::Ln),
    ("tg", Expr::tg),
];

impl Expr {
    /// Parses a string into a symbolic expression tree.
    ///
    /// Whitespace is insignificant. Operator precedence follows the usual
    /// mathematical rules; `^` binds tightest and associates to the right.
    pub fn parse_expression(input: &str) -> Result<Expr, String> {
        let cleaned: String = input.split_whitespace().collect::<Vec<_>>().join("");
        if cleaned.is_empty() {
            return Err("empty expression".to_string());
        }
        parse_recursive(&cleaned)
    }
}

fn parse_recursive(input: &str) -> Result<Expr, String> {
    trace!("parsing: {}", input);

    // Addition and subtraction: split at the rightmost occurrence outside
    // brackets so the left operand keeps everything parsed so far
    if let Some((pos, op)) = find_rightmost_operator_outside_brackets(input, &['+', '-']) {
        let left = &input[..pos];
        let right = &input[pos + 1..];
        if right.is_empty() {
            return Err(format!("dangling '{}' in: {}", op, input));
        }

        // Unary minus: "-x", "-sin(x)", "-(x+1)"
        if left.is_empty() {
            return if op == '-' {
                Ok(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(parse_recursive(right)?),
                ))
            } else {
                Ok(parse_recursive(right)?)
            };
        }

        // A sign directly after another operator belongs to the operand:
        // "2*-3", "x^-2". Retry the search on the prefix before the sign.
        if left.ends_with(['+', '-', '*', '/', '^']) {
            let signed = parse_signed_tail(input, pos, op)?;
            return Ok(signed);
        }

        let lhs = Box::new(parse_recursive(left)?);
        let rhs = Box::new(parse_recursive(right)?);
        return match op {
            '+' => Ok(Expr::Add(lhs, rhs)),
            '-' => Ok(Expr::Sub(lhs, rhs)),
            _ => unreachable!(),
        };
    }

    // Multiplication and division, rightmost split keeps left-associativity:
    // a/b/c parses as (a/b)/c
    if let Some((pos, op)) = find_rightmost_operator_outside_brackets(input, &['*', '/']) {
        let left = &input[..pos];
        let right = &input[pos + 1..];
        if left.is_empty() || right.is_empty() {
            return Err(format!("dangling '{}' in: {}", op, input));
        }
        let lhs = Box::new(parse_recursive(left)?);
        let rhs = Box::new(parse_recursive(right)?);
        return match op {
            '*' => Ok(Expr::Mul(lhs, rhs)),
            '/' => Ok(Expr::Div(lhs, rhs)),
            _ => unreachable!(),
        };
    }

    // Power: leftmost split makes ^ right-associative (a^b^c = a^(b^c))
    if let Some(pos) = find_char_position_outside_brackets(input, '^') {
        let base = &input[..pos];
        let exponent = &input[pos + 1..];
        if base.is_empty() || exponent.is_empty() {
            return Err(format!("dangling '^' in: {}", input));
        }
        return Ok(Expr::Pow(
            Box::new(parse_recursive(base)?),
            Box::new(parse_recursive(exponent)?),
        ));
    }

    // Function calls: the whole input must be name(...)
    for (name, constructor) in FUNCTIONS {
        if let Some(rest) = input.strip_prefix(name) {
            if rest.starts_with('(') {
                let open = name.len();
                if let Some(close) = find_matching_bracket(input, open) {
                    if close == input.len() - 1 {
                        let inner = &input[open + 1..close];
                        return Ok(constructor(Box::new(parse_recursive(inner)?)));
                    }
                }
                return Err(format!("unbalanced brackets in: {}", input));
            }
        }
    }

    // Constants and variables
    if let Ok(value) = input.parse::<f64>() {
        return Ok(Expr::Const(value));
    }
    let mut chars = input.chars();
    if chars
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false)
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Ok(Expr::Var(input.to_string()));
    }

    // Expression that is all in brackets
    if input.starts_with('(') {
        if let Some(close) = find_matching_bracket(input, 0) {
            if close == input.len() - 1 {
                return parse_recursive(&input[1..close]);
            }
        }
    }

    Err(format!("invalid expression format: {}", input))
}

/// Handles a `+`/`-` that directly follows another operator, e.g. the `-`
/// in "2*-3": the sign is folded into the right operand and the search is
/// retried on the remaining prefix.
fn parse_signed_tail(input: &str, sign_pos: usize, sign: char) -> Result<Expr, String> {
    let prefix = &input[..sign_pos];
    let operand = &input[sign_pos + 1..];
    let signed_operand = if sign == '-' {
        Expr::Mul(
            Box::new(Expr::Const(-1.0)),
            Box::new(parse_recursive(operand)?),
        )
    } else {
        parse_recursive(operand)?
    };
    // prefix always ends with an operator here
    let op = prefix.chars().last().ok_or("empty operand")?;
    let left = &prefix[..prefix.len() - 1];
    if left.is_empty() {
        return Err(format!("dangling '{}' in: {}", op, input));
    }
    let lhs = Box::new(parse_recursive(left)?);
    let rhs = Box::new(signed_operand);
    match op {
        '+' => Ok(Expr::Add(lhs, rhs)),
        '-' => Ok(Expr::Sub(lhs, rhs)),
        '*' => Ok(Expr::Mul(lhs, rhs)),
        '/' => Ok(Expr::Div(lhs, rhs)),
        '^' => Ok(Expr::Pow(lhs, rhs)),
        _ => Err(format!("invalid expression format: {}", input)),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constant() {
        let expr = Expr::parse_expression("42").unwrap();
        assert_eq!(expr, Expr::Const(42.0));
    }

    #[test]
    fn test_parse_variable() {
        let expr = Expr::parse_expression("x").unwrap();
        assert_eq!(expr, Expr::Var("x".to_string()));
    }

    #[test]
    fn test_parse_addition() {
        let expr = Expr::parse_expression("x + 2").unwrap();
        assert_eq!(
            expr,
            Expr::Add(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Const(2.0))
            )
        );
    }

    #[test]
    fn test_parse_power() {
        let expr = Expr::parse_expression("x^2").unwrap();
        assert_eq!(
            expr,
            Expr::Pow(
                Box::new(Expr::Var("x".to_string())),
                Box::new(Expr::Const(2.0))
            )
        );
    }

    #[test]
    fn test_parse_division_left_associative() {
        // 8/4/2 must be (8/4)/2 = 1, not 8/(4/2) = 4
        let expr = Expr::parse_expression("8/4/2").unwrap();
        let result = expr.eval_with_scope(&std::collections::HashMap::new()).unwrap();
        assert_eq!(result, 1.0);
    }

    #[test]
    fn test_parse_power_right_associative() {
        // 2^3^2 = 2^(3^2) = 512
        let expr = Expr::parse_expression("2^3^2").unwrap();
        let result = expr.eval_with_scope(&std::collections::HashMap::new()).unwrap();
        assert_eq!(result, 512.0);
    }

    #[test]
    fn test_parse_unary_minus() {
        let expr = Expr::parse_expression("-x").unwrap();
        assert_eq!(
            expr,
            Expr::Mul(
                Box::new(Expr::Const(-1.0)),
                Box::new(Expr::Var("x".to_string()))
            )
        );
    }

    #[test]
    fn test_parse_sign_after_operator() {
        let expr = Expr::parse_expression("2*-3").unwrap();
        let result = expr.eval_with_scope(&std::collections::HashMap::new()).unwrap();
        assert_eq!(result, -6.0);
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(
            Expr::parse_expression("sin(x)").unwrap(),
            Expr::sin(Box::new(Expr::Var("x".to_string())))
        );
        assert_eq!(
            Expr::parse_expression("tan(x)").unwrap(),
            Expr::tg(Box::new(Expr::Var("x".to_string())))
        );
        assert_eq!(
            Expr::parse_expression("log(x)").unwrap(),
            Expr::Ln(Box::new(Expr::Var("x".to_string())))
        );
        assert_eq!(
            Expr::parse_expression("sqrt(x)").unwrap(),
            Expr::sqrt(Box::new(Expr::Var("x".to_string())))
        );
        assert_eq!(
            Expr::parse_expression("abs(x)").unwrap(),
            Expr::abs(Box::new(Expr::Var("x".to_string())))
        );
    }

    #[test]
    fn test_parse_nested_functions() {
        let expr = Expr::parse_expression("sin(sqrt(x^2+y^2))").unwrap();
        assert_eq!(
            expr.all_arguments_are_variables(),
            vec!["x".to_string(), "y".to_string()]
        );
    }

    #[test]
    fn test_parse_expression_with_brackets() {
        let expr = Expr::parse_expression("(x + y) * z").unwrap();
        assert_eq!(
            expr,
            Expr::Mul(
                Box::new(Expr::Add(
                    Box::new(Expr::Var("x".to_string())),
                    Box::new(Expr::Var("y".to_string()))
                )),
                Box::new(Expr::Var("z".to_string()))
            )
        );
    }

    #[test]
    fn test_parse_complex_expression() {
        let expr = Expr::parse_expression("(x + y) * (z - 2) / exp(w)").unwrap();
        let x = Box::new(Expr::Var("x".to_string()));
        let y = Box::new(Expr::Var("y".to_string()));
        let z = Box::new(Expr::Var("z".to_string()));
        let w = Box::new(Expr::Var("w".to_string()));
        let c = Box::new(Expr::Const(2.0));
        let x_plus_y = Box::new(Expr::Add(x, y));
        let z_minus_c = Box::new(Expr::Sub(z, c));
        let e = Box::new(Expr::Exp(w));
        let expected = Expr::Div(Box::new(Expr::Mul(x_plus_y, z_minus_c)), e);
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_parse_scientific_notation() {
        let expr = Expr::parse_expression("1e-5").unwrap();
        assert_eq!(expr, Expr::Const(1.0e-5));
        // the exponent sign is part of the literal, the second minus is not
        let expr = Expr::parse_expression("2e-1*10 - 1").unwrap();
        assert_eq!(expr.eval_with_scope(&std::collections::HashMap::new()), Ok(1.0));
    }

    #[test]
    fn test_invalid_expression() {
        assert!(Expr::parse_expression("(x +").is_err());
        assert!(Expr::parse_expression("").is_err());
        assert!(Expr::parse_expression("sin(x").is_err());
    }

    #[test]
    fn test_multiple_subtraction() {
        let expr = Expr::parse_expression("x^2 - x - 1").unwrap();
        let x = Box::new(Expr::Var("x".to_string()));
        let expected =
            Expr::Pow(x.clone(), Box::new(Expr::Const(2.0))) - *x - Expr::Const(1.0);
        assert_eq!(expr, expected);
    }
}
