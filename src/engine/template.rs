use serde_json::Value as JsonValue;
use tracing::warn;

/// Placeholder substitution over `{name}` and `{a.b.c}` patterns. Rendering
/// never fails: an unresolved placeholder stays verbatim in the output and
/// the miss is logged.
pub struct TemplateEngine;

impl TemplateEngine {
    pub fn render(pattern: &str, data: &JsonValue) -> String {
        let mut out = String::with_capacity(pattern.len());
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open + 1..];

            let Some(close) = tail.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };

            let name = &tail[..close];
            if !is_placeholder_name(name) {
                // Not a placeholder; keep the brace and rescan right after it
                // so an inner `{var}` is still found.
                out.push('{');
                rest = tail;
                continue;
            }

            match resolve(data, name) {
                Some(value) => out.push_str(&value),
                None => {
                    warn!(variable = %name, "Template variable unresolved, leaving placeholder");
                    out.push_str(&rest[open..open + close + 2]);
                }
            }

            rest = &tail[close + 1..];
        }

        out.push_str(rest);
        out
    }

    /// Placeholder names in `pattern` that do not resolve against `data`.
    /// Used pre-send to warn, never to block.
    pub fn find_missing_variables(pattern: &str, data: &JsonValue) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            let tail = &rest[open + 1..];

            let Some(close) = tail.find('}') else {
                break;
            };

            let name = &tail[..close];
            if is_placeholder_name(name) {
                if resolve(data, name).is_none() && !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                rest = &tail[close + 1..];
            } else {
                rest = tail;
            }
        }

        missing
    }
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

fn resolve(data: &JsonValue, path: &str) -> Option<String> {
    let mut current = data;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }

    match current {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
