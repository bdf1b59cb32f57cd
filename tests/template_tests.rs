use notify_dispatch::engine::template::TemplateEngine;
use serde_json::json;

/// Test: A placeholder with no matching data is preserved verbatim
#[test]
fn test_missing_variable_preserves_placeholder() {
    let rendered = TemplateEngine::render("Hello {name}", &json!({}));
    assert_eq!(rendered, "Hello {name}");
}

/// Test: Simple variables are substituted
#[test]
fn test_simple_substitution() {
    let rendered = TemplateEngine::render("Hello {name}", &json!({"name": "Ada"}));
    assert_eq!(rendered, "Hello Ada");
}

/// Test: Dotted paths walk nested objects
#[test]
fn test_nested_path_substitution() {
    let rendered = TemplateEngine::render(
        "Hello {user.name}",
        &json!({"user": {"name": "Ada"}}),
    );
    assert_eq!(rendered, "Hello Ada");
}

/// Test: Numbers and booleans render via their string form
#[test]
fn test_number_and_bool_substitution() {
    let rendered = TemplateEngine::render(
        "{count} spots left, confirmed: {confirmed}",
        &json!({"count": 3, "confirmed": true}),
    );
    assert_eq!(rendered, "3 spots left, confirmed: true");
}

/// Test: Null values count as unresolved
#[test]
fn test_null_value_is_unresolved() {
    let rendered = TemplateEngine::render("Hi {name}", &json!({"name": null}));
    assert_eq!(rendered, "Hi {name}");
}

/// Test: Brace spans that are not placeholders pass through untouched
#[test]
fn test_non_placeholder_braces_untouched() {
    let rendered = TemplateEngine::render(
        "literal {not a var} and {valid}",
        &json!({"valid": "ok"}),
    );
    assert_eq!(rendered, "literal {not a var} and ok");
}

/// Test: An unclosed brace at the end does not break rendering
#[test]
fn test_unclosed_brace_preserved() {
    let rendered = TemplateEngine::render("Hello {name", &json!({"name": "Ada"}));
    assert_eq!(rendered, "Hello {name");
}

/// Test: Multiple occurrences of the same variable all substitute
#[test]
fn test_repeated_variable() {
    let rendered = TemplateEngine::render(
        "{name}, yes {name}",
        &json!({"name": "Ada"}),
    );
    assert_eq!(rendered, "Ada, yes Ada");
}

/// Test: find_missing_variables reports only unresolved names, deduplicated
#[test]
fn test_find_missing_variables() {
    let missing = TemplateEngine::find_missing_variables(
        "Hi {name}, your {slot.time} on {date} ({date})",
        &json!({"name": "Ada"}),
    );
    assert_eq!(missing, vec!["slot.time".to_string(), "date".to_string()]);
}

/// Test: find_missing_variables is empty when everything resolves
#[test]
fn test_no_missing_variables() {
    let missing = TemplateEngine::find_missing_variables(
        "Hi {name}",
        &json!({"name": "Ada"}),
    );
    assert!(missing.is_empty());
}
