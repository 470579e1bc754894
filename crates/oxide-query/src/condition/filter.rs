//! Pruning of empty operands for the `filter*` query methods.

use super::registry::normalize_keyword;
use crate::value::Value;

/// Removes empty operands from a condition.
///
/// - A hash mapping loses every key whose value is empty.
/// - `AND`/`OR`/`NOT` recurse into their operands and drop the empty ones;
///   the whole condition is dropped if no operand survives.
/// - `BETWEEN`/`NOT BETWEEN` are dropped if either bound is empty.
/// - Any other operator is dropped if its value operand is empty.
///
/// A dropped condition is returned as an empty list. Numeric zero is not
/// empty, see [`Value::is_empty`].
#[must_use]
pub fn filter_condition(condition: Value) -> Value {
    match condition {
        Value::Map(entries) => Value::Map(
            entries
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .collect(),
        ),
        Value::List(items) => filter_operator(items),
        other => other,
    }
}

fn filter_operator(mut items: Vec<Value>) -> Value {
    let keyword = match items.first() {
        Some(Value::Text(operator)) => normalize_keyword(operator),
        _ => return Value::List(items),
    };

    match keyword.as_str() {
        "AND" | "OR" | "NOT" => {
            let head = items.remove(0);
            let operands: Vec<Value> = items
                .into_iter()
                .map(filter_condition)
                .filter(|operand| !operand.is_empty())
                .collect();
            if operands.is_empty() {
                return Value::List(vec![]);
            }
            let mut filtered = Vec::with_capacity(operands.len() + 1);
            filtered.push(head);
            filtered.extend(operands);
            Value::List(filtered)
        }
        "BETWEEN" | "NOT BETWEEN" => match (items.get(2), items.get(3)) {
            (Some(start), Some(end)) if start.is_empty() || end.is_empty() => Value::List(vec![]),
            _ => Value::List(items),
        },
        _ => {
            if items.get(2).is_some_and(Value::is_empty) {
                Value::List(vec![])
            } else {
                Value::List(items)
            }
        }
    }
}
