//! Condition expressions gating template files and dependencies.
//!
//! Grammar:
//!
//! ```text
//! condition := path | path "===" literal
//! path      := segment ("." segment)*
//! segment   := [A-Za-z0-9_$-]+
//! literal   := "..." | '...' | bare text
//! ```
//!
//! Every failure (empty expression, malformed path, unresolvable segment,
//! more than one `===`) evaluates to `false`. Nothing here panics and nothing
//! is executed: the expression is only ever used as a lookup path.
//!
//! The expression is split on `===` before literals are unquoted, so a
//! literal that itself contains `===` (`x === "a===b"`) is unsupported and
//! evaluates to `false`.

use serde_json::Value;
use tracing::debug;

const EQ: &str = "===";

/// Evaluate `expression` against the generation context.
pub fn evaluate(expression: &str, context: &Value) -> bool {
    let expr = expression.trim();
    if expr.is_empty() {
        debug!(expression, "empty condition evaluates to false");
        return false;
    }

    let parts: Vec<&str> = expr.split(EQ).collect();
    let result = match parts.as_slice() {
        [path] => resolve(path.trim(), context).is_some_and(is_truthy),
        [lhs, rhs] => {
            let expected = unquote(rhs.trim());
            resolve(lhs.trim(), context)
                .and_then(scalar_string)
                .is_some_and(|actual| actual == expected)
        }
        _ => {
            debug!(expression, "condition has more than one '==='");
            false
        }
    };

    debug!(expression, result, "evaluated condition");
    result
}

/// Resolve a dotted path against `context`.
///
/// Returns `None` when the path is malformed or any segment is missing.
/// Numeric segments index into arrays.
pub fn resolve<'a>(path: &str, context: &'a Value) -> Option<&'a Value> {
    if !is_valid_path(path) {
        debug!(path, "malformed condition path");
        return None;
    }

    path.split('.').try_fold(context, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn is_valid_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-'))
        })
}

/// JavaScript-style truthiness.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Canonical string form of a scalar; `None` for null, arrays and objects.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Strip one matching pair of surrounding quotes.
fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    s
}
