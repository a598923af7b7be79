// the collection of utility functions mainly for bracket parsing and proceeding

use num_traits::Float;

/// Finds the rightmost occurrence of any of the given operator characters at
/// bracket depth zero. Used by the parser to split at the lowest-precedence
/// operator while keeping left-associativity. A sign inside a scientific
/// literal ("1e-5") is part of the number, not an operator.
pub fn find_rightmost_operator_outside_brackets(
    input: &str,
    operators: &[char],
) -> Option<(usize, char)> {
    let mut bracket_depth = 0i32;
    let mut last_op_pos = None;
    let mut last_op_char = ' ';

    for (i, c) in input.char_indices() {
        match c {
            '(' => bracket_depth += 1,
            ')' => bracket_depth -= 1,
            _ if bracket_depth == 0
                && operators.contains(&c)
                && !is_exponent_sign(input.as_bytes(), i, c) =>
            {
                last_op_pos = Some(i);
                last_op_char = c;
            }
            _ => {}
        }
    }

    last_op_pos.map(|pos| (pos, last_op_char))
}

/// True when the sign at byte `i` sits between a digit-`e` pair and a digit,
/// i.e. it belongs to a scientific-notation literal.
fn is_exponent_sign(bytes: &[u8], i: usize, c: char) -> bool {
    if c != '+' && c != '-' {
        return false;
    }
    if i < 2 || i + 1 >= bytes.len() {
        return false;
    }
    (bytes[i - 1] == b'e' || bytes[i - 1] == b'E')
        && bytes[i - 2].is_ascii_digit()
        && bytes[i + 1].is_ascii_digit()
}

/// Finds the first occurrence of the given char at bracket depth zero.
pub fn find_char_position_outside_brackets(s: &str, c: char) -> Option<usize> {
    find_top_level_char_positions(s, c).first().copied()
}

/// Finds every occurrence of the given char at bracket depth zero. The
/// classifier uses this to split parametric pairs at the top-level comma.
pub fn find_top_level_char_positions(s: &str, c: char) -> Vec<usize> {
    let mut depth = 0i32;
    let mut positions = Vec::new();
    for (i, ch) in s.char_indices() {
        if ch == '(' {
            depth += 1;
        } else if ch == ')' {
            depth -= 1;
        } else if ch == c && depth == 0 {
            positions.push(i);
        }
    }
    positions
}

/// Finds the position of the closing bracket matching the opening bracket at
/// `open_pos`. Returns None for unbalanced input.
pub fn find_matching_bracket(input: &str, open_pos: usize) -> Option<usize> {
    let mut stack = 0i32;
    for (i, c) in input.char_indices().filter(|(i, _)| *i >= open_pos) {
        if c == '(' {
            stack += 1;
        } else if c == ')' {
            stack -= 1;
            if stack == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Evenly spaced values over [start, end], inclusive of both endpoints.
pub fn linspace<T: Float>(start: T, end: T, num_values: usize) -> Vec<T> {
    let mut values = Vec::with_capacity(num_values);
    let step = (end - start) / (T::from(num_values).unwrap() - T::one());

    for i in 0..num_values {
        values.push(start + T::from(i).unwrap() * step);
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rightmost_operator() {
        assert_eq!(
            find_rightmost_operator_outside_brackets("a+b-c", &['+', '-']),
            Some((3, '-'))
        );
        assert_eq!(
            find_rightmost_operator_outside_brackets("(a+b)", &['+', '-']),
            None
        );
    }

    #[test]
    fn test_exponent_sign_is_not_an_operator() {
        assert_eq!(
            find_rightmost_operator_outside_brackets("1e-5", &['+', '-']),
            None
        );
        assert_eq!(
            find_rightmost_operator_outside_brackets("2e-1-x", &['+', '-']),
            Some((4, '-'))
        );
        // spelled-out e times a constant still splits
        assert_eq!(
            find_rightmost_operator_outside_brackets("x*e-5", &['+', '-']),
            Some((3, '-'))
        );
    }

    #[test]
    fn test_top_level_positions() {
        assert_eq!(find_top_level_char_positions("f(a,b),g(c)", ','), vec![6]);
        assert_eq!(find_char_position_outside_brackets("(a^b)^c", '^'), Some(5));
    }

    #[test]
    fn test_matching_bracket() {
        assert_eq!(find_matching_bracket("sin(x+(y))", 3), Some(9));
        assert_eq!(find_matching_bracket("sin(x", 3), None);
    }

    #[test]
    fn test_linspace() {
        let v = linspace(0.0, 1.0, 5);
        assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }
}
