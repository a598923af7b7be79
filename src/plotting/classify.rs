//! Classifies a raw expression string into one of six mathematical forms.
//!
//! The rules form a precedence list, not a committee: they are tried in
//! order and the first match wins. Malformed splits (a parametric candidate
//! without exactly two parts, an implicit candidate with two `=` signs) fall
//! through to the next rule and ultimately to `Expression` - the permissive
//! default that keeps freeform "evaluate" queries working.

use crate::symbolic::symbolic_eval::extract_variables;
use crate::symbolic::utils::{find_matching_bracket, find_top_level_char_positions};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;
use strum_macros::{Display, EnumString};

/// Comparison operator of an inequality, ordered so that the two-character
/// operators are matched before their one-character prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum ComparisonOp {
    #[strum(serialize = ">=")]
    Ge,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = "<")]
    Lt,
}

impl ComparisonOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Ge => ">=",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Lt => "<",
        }
    }
}

/// Discriminant of [`ParsedExpression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ExpressionKind {
    Function,
    Parametric,
    Polar,
    Inequality,
    Implicit,
    Expression,
}

/// A classified expression, recomputed from raw text on every evaluation
/// pass and never mutated in place. Sub-expression fragments are stored as
/// text; the samplers parse them against the current parameter scope.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedExpression {
    /// y = f(x)
    Function {
        expression: String,
        variables: Vec<String>,
    },
    /// x = f(t), y = g(t) or (f(t), g(t))
    Parametric {
        x_expr: String,
        y_expr: String,
        variables: Vec<String>,
    },
    /// r = f(theta)
    Polar {
        expression: String,
        variables: Vec<String>,
    },
    /// left <op> right
    Inequality {
        left: String,
        right: String,
        op: ComparisonOp,
        variables: Vec<String>,
    },
    /// left = right with neither side reserved
    Implicit {
        left: String,
        right: String,
        variables: Vec<String>,
    },
    /// anything else - a live "evaluate" query, not a curve
    Expression {
        expression: String,
        variables: Vec<String>,
    },
}

impl ParsedExpression {
    pub fn kind(&self) -> ExpressionKind {
        match self {
            ParsedExpression::Function { .. } => ExpressionKind::Function,
            ParsedExpression::Parametric { .. } => ExpressionKind::Parametric,
            ParsedExpression::Polar { .. } => ExpressionKind::Polar,
            ParsedExpression::Inequality { .. } => ExpressionKind::Inequality,
            ParsedExpression::Implicit { .. } => ExpressionKind::Implicit,
            ParsedExpression::Expression { .. } => ExpressionKind::Expression,
        }
    }

    /// Free variable names of the whole statement.
    pub fn variables(&self) -> &[String] {
        match self {
            ParsedExpression::Function { variables, .. }
            | ParsedExpression::Parametric { variables, .. }
            | ParsedExpression::Polar { variables, .. }
            | ParsedExpression::Inequality { variables, .. }
            | ParsedExpression::Implicit { variables, .. }
            | ParsedExpression::Expression { variables, .. } => variables,
        }
    }
}

static FUNCTION_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^y\s*=\s*(.+)$").expect("static pattern"));
static POLAR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^r\s*=\s*(.+)$").expect("static pattern"));
static X_EQ_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^x\s*=\s*").expect("static pattern"));
static Y_EQ_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^y\s*=\s*").expect("static pattern"));

/// The ordered matcher list. Each matcher either claims the text or declines.
const MATCHERS: [fn(&str) -> Option<ParsedExpression>; 5] = [
    match_function,
    match_parametric,
    match_polar,
    match_inequality,
    match_implicit,
];

/// Classifies raw expression text. Pure function of its input; never fails -
/// text that satisfies no rule becomes a plain `Expression`.
pub fn classify(text: &str) -> ParsedExpression {
    let clean: String = text.trim().split_whitespace().collect::<Vec<_>>().join(" ");

    for matcher in MATCHERS {
        if let Some(parsed) = matcher(&clean) {
            debug!("classified {:?} as {}", clean, parsed.kind());
            return parsed;
        }
    }

    ParsedExpression::Expression {
        variables: extract_variables(&clean),
        expression: clean,
    }
}

fn match_function(text: &str) -> Option<ParsedExpression> {
    let caps = FUNCTION_PREFIX.captures(text)?;
    let expression = caps.get(1).map(|m| m.as_str().to_string())?;
    Some(ParsedExpression::Function {
        variables: extract_variables(&expression),
        expression,
    })
}

fn match_parametric(text: &str) -> Option<ParsedExpression> {
    if !text.contains(',') || !(text.contains("x=") || text.contains("x =") || text.contains('(')) {
        return None;
    }
    // A tuple "(f(t), g(t))" hides its payload comma one bracket level down;
    // strip the outer pair before looking for the top-level comma.
    let mut body = text;
    if find_top_level_char_positions(text, ',').is_empty()
        && text.starts_with('(')
        && find_matching_bracket(text, 0) == Some(text.len() - 1)
    {
        body = text[1..text.len() - 1].trim();
    }
    let commas = find_top_level_char_positions(body, ',');
    if commas.len() != 1 {
        // not exactly two parts - fall through to the next rule
        return None;
    }
    let split = commas[0];
    let first = body[..split].trim();
    let second = body[split + 1..].trim();

    let (x_expr, y_expr) = if X_EQ_PREFIX.is_match(first) && Y_EQ_PREFIX.is_match(second) {
        (
            X_EQ_PREFIX.replace(first, "").into_owned(),
            Y_EQ_PREFIX.replace(second, "").into_owned(),
        )
    } else {
        (first.to_string(), second.to_string())
    };

    let mut variables = extract_variables(&x_expr);
    variables.extend(extract_variables(&y_expr));
    variables.sort();
    variables.dedup();
    Some(ParsedExpression::Parametric {
        x_expr,
        y_expr,
        variables,
    })
}

fn match_polar(text: &str) -> Option<ParsedExpression> {
    let caps = POLAR_PREFIX.captures(text)?;
    // the Greek angle symbol is normalized to the canonical variable name
    let expression = caps.get(1)?.as_str().replace('θ', "theta");
    Some(ParsedExpression::Polar {
        variables: extract_variables(&expression),
        expression,
    })
}

fn match_inequality(text: &str) -> Option<ParsedExpression> {
    // two-character operators first so ">=" is not split at ">"
    for op in [
        ComparisonOp::Ge,
        ComparisonOp::Le,
        ComparisonOp::Gt,
        ComparisonOp::Lt,
    ] {
        if let Some(pos) = text.find(op.as_str()) {
            let left = text[..pos].trim().to_string();
            let right = text[pos + op.as_str().len()..].trim().to_string();
            let mut variables = extract_variables(&left);
            variables.extend(extract_variables(&right));
            variables.sort();
            variables.dedup();
            return Some(ParsedExpression::Inequality {
                left,
                right,
                op,
                variables,
            });
        }
    }
    None
}

fn match_implicit(text: &str) -> Option<ParsedExpression> {
    if !text.contains('=') {
        return None;
    }
    let parts: Vec<&str> = text.split('=').collect();
    if parts.len() != 2 {
        // more than one '=' falls through to the permissive default
        return None;
    }
    let left = parts[0].trim().to_string();
    let right = parts[1].trim().to_string();
    let mut variables = extract_variables(&left);
    variables.extend(extract_variables(&right));
    variables.sort();
    variables.dedup();
    Some(ParsedExpression::Implicit {
        left,
        right,
        variables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_function() {
        let parsed = classify("y = x^2+1");
        assert_eq!(
            parsed,
            ParsedExpression::Function {
                expression: "x^2+1".to_string(),
                variables: vec!["x".to_string()],
            }
        );
    }

    #[test]
    fn test_classify_parametric_with_prefixes() {
        let parsed = classify("x = cos(t), y = sin(t)");
        match parsed {
            ParsedExpression::Parametric {
                x_expr,
                y_expr,
                variables,
            } => {
                assert_eq!(x_expr, "cos(t)");
                assert_eq!(y_expr, "sin(t)");
                assert_eq!(variables, vec!["t".to_string()]);
            }
            other => panic!("expected parametric, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_parametric_tuple() {
        let parsed = classify("(cos(t), sin(t))");
        match parsed {
            ParsedExpression::Parametric { x_expr, y_expr, .. } => {
                assert_eq!(x_expr, "cos(t)");
                assert_eq!(y_expr, "sin(t)");
            }
            other => panic!("expected parametric, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_polar_normalizes_theta() {
        let parsed = classify("r = sin(3θ)");
        match parsed {
            ParsedExpression::Polar { expression, .. } => {
                assert_eq!(expression, "sin(3theta)");
            }
            other => panic!("expected polar, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_inequality_two_char_operator() {
        let parsed = classify("y >= x+1");
        match parsed {
            ParsedExpression::Inequality { left, right, op, .. } => {
                assert_eq!(left, "y");
                assert_eq!(right, "x+1");
                assert_eq!(op, ComparisonOp::Ge);
            }
            other => panic!("expected inequality, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_implicit() {
        let parsed = classify("x^2+y^2 = 25");
        match parsed {
            ParsedExpression::Implicit { left, right, .. } => {
                assert_eq!(left, "x^2+y^2");
                assert_eq!(right, "25");
            }
            other => panic!("expected implicit, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_double_equals_falls_through() {
        let parsed = classify("a = b = c");
        assert_eq!(parsed.kind(), ExpressionKind::Expression);
    }

    #[test]
    fn test_classify_plain_expression() {
        let parsed = classify("2 + 3*4");
        assert_eq!(parsed.kind(), ExpressionKind::Expression);
    }

    #[test]
    fn test_function_wins_over_implicit() {
        // "y = ..." contains '=' but rule 1 has precedence
        assert_eq!(classify("y = 2*x").kind(), ExpressionKind::Function);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ExpressionKind::Parametric.to_string(), "parametric");
    }
}
