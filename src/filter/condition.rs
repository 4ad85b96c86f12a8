use crate::error::FilterParseError;
use crate::record::Record;

use super::{Comparison, Predicate};

// Longest operators first so ">=" is not read as ">".
const OPERATORS: [&str; 7] = ["!=", ">=", "<=", "=", ">", "<", "~"];

/// Parse a single `field OP value` condition into a name-based predicate.
///
/// Supported operators: `=`, `!=`, `>`, `>=`, `<`, `<=` and `~` (contains).
/// Values may be wrapped in double quotes. The predicate is keyed
/// `where:<field><op>` so repeated conditions on one field replace each other
/// only when they share an operator.
pub fn parse_condition<T: Record>(input: &str) -> Result<Predicate<T>, FilterParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FilterParseError::Empty);
    }

    let (position, op) = find_operator(trimmed)
        .ok_or_else(|| FilterParseError::MissingOperator(trimmed.to_string()))?;

    let field = trimmed[..position].trim();
    let raw_value = trimmed[position + op.len()..].trim();
    if field.is_empty() {
        return Err(FilterParseError::MissingField(trimmed.to_string()));
    }
    let value = unquote(raw_value);
    if value.is_empty() {
        return Err(FilterParseError::MissingValue(trimmed.to_string()));
    }

    let predicate = match op {
        "=" => Predicate::field_equals(field, value),
        "!=" => Predicate::field_not_equals(field, value),
        "~" => Predicate::field_contains(field, value),
        symbol => {
            let comparison: Comparison = symbol
                .parse()
                .map_err(|_| FilterParseError::MissingOperator(trimmed.to_string()))?;
            let threshold = value
                .parse::<f64>()
                .map_err(|_| FilterParseError::NotANumber {
                    op: symbol.to_string(),
                    value: value.to_string(),
                })?;
            Predicate::field_threshold(field, comparison, threshold)
        }
    };

    Ok(predicate.keyed(format!("where:{field}{op}")))
}

fn find_operator(input: &str) -> Option<(usize, &'static str)> {
    for (position, _) in input.char_indices() {
        let rest = &input[position..];
        if let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            return Some((position, *op));
        }
    }
    None
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}
