use crate::core::json::query_json_path;
use crate::model::{BodyOperator, BodyRule, ResponseRecord, RuleCategory, RuleResult};
use crate::resolve::{substitute, VariableTable};
use serde_json::Value;

fn fail(rule: &BodyRule, message: impl Into<String>) -> RuleResult {
    RuleResult::fail(&rule.id, RuleCategory::Body, message)
}

fn pass(rule: &BodyRule, message: impl Into<String>) -> RuleResult {
    RuleResult::pass(&rule.id, RuleCategory::Body, message)
}

/// JSON-aware equality: both sides parsed when possible, byte-exact otherwise.
fn bodies_equal(actual: &str, expected: &str) -> bool {
    match (
        serde_json::from_str::<Value>(actual),
        serde_json::from_str::<Value>(expected),
    ) {
        (Ok(a), Ok(e)) => a == e,
        _ => actual == expected,
    }
}

/// String leaves compare to the raw text; anything else to the text read as JSON.
fn leaf_equals(leaf: &Value, expected: &str) -> bool {
    match leaf {
        Value::String(s) => s == expected,
        other => match serde_json::from_str::<Value>(expected) {
            Ok(parsed) => *other == parsed,
            Err(_) => other.to_string() == expected,
        },
    }
}

fn leaf_display(leaf: &Value) -> String {
    match leaf {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(super) fn check(rule: &BodyRule, response: &ResponseRecord, table: &VariableTable) -> RuleResult {
    if rule.value.is_none()
        && matches!(rule.operator, BodyOperator::Contains | BodyOperator::NotContains)
    {
        let name = match rule.operator {
            BodyOperator::Contains => "contains",
            _ => "not_contains",
        };
        return fail(rule, format!("Operator '{name}' requires 'value'"));
    }

    let body = response.decoded_body();
    let expected = substitute(rule.value.as_deref().unwrap_or_default(), table).result;

    match rule.operator {
        BodyOperator::Contains => {
            let result = if body.contains(&expected) {
                pass(rule, format!("Body contains '{expected}'"))
            } else {
                fail(rule, format!("Body does not contain '{expected}'"))
            };
            result.with_expected(expected)
        }
        BodyOperator::NotContains => {
            let result = if body.contains(&expected) {
                fail(rule, format!("Body should not contain '{expected}'"))
            } else {
                pass(rule, format!("Body does not contain '{expected}'"))
            };
            result.with_expected(expected)
        }
        BodyOperator::Equals | BodyOperator::NotEquals => {
            let equal = bodies_equal(&body, &expected);
            let wanted = rule.operator == BodyOperator::Equals;
            let result = match (equal, wanted) {
                (true, true) => pass(rule, "Body equals expected value"),
                (false, false) => pass(rule, "Body differs from value"),
                (false, true) => fail(rule, "Body does not equal expected value"),
                (true, false) => fail(rule, "Body should differ from value"),
            };
            result.with_expected(expected).with_actual(body)
        }
        BodyOperator::JsonPathExists | BodyOperator::JsonPathEquals => {
            let Some(path) = rule.json_path.as_deref().filter(|p| !p.trim().is_empty()) else {
                return fail(rule, "No JSON path given");
            };
            let json: Value = match serde_json::from_str(&body) {
                Ok(json) => json,
                Err(e) => return fail(rule, format!("Response body is not valid JSON: {e}")),
            };
            let leaf = match query_json_path(&json, path) {
                Ok(leaf) => leaf,
                Err(e) => return fail(rule, format!("Invalid JSON path: {e}")),
            };

            match (rule.operator, leaf) {
                (BodyOperator::JsonPathExists, Some(leaf)) => {
                    pass(rule, format!("Path '{path}' exists")).with_actual(leaf_display(leaf))
                }
                (_, None) => fail(rule, format!("Path '{path}' not found")),
                (_, Some(leaf)) => {
                    let result = if leaf_equals(leaf, &expected) {
                        pass(rule, format!("Path '{path}' equals '{expected}'"))
                    } else {
                        fail(rule, format!("Path '{path}' does not equal '{expected}'"))
                    };
                    result.with_expected(expected).with_actual(leaf_display(leaf))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    const BODY: &str = r#"{"user": {"name": "Ada", "age": 36, "tags": ["a", "b"]}, "ok": true}"#;

    fn rule(operator: BodyOperator, value: Option<&str>, json_path: Option<&str>) -> BodyRule {
        BodyRule {
            id: "b1".into(),
            enabled: true,
            operator,
            value: value.map(String::from),
            json_path: json_path.map(String::from),
        }
    }

    fn run(operator: BodyOperator, value: Option<&str>, json_path: Option<&str>) -> RuleResult {
        check(
            &rule(operator, value, json_path),
            &ResponseRecord::new(200, BODY),
            &VariableTable::new(),
        )
    }

    #[test]
    fn test_contains() {
        assert!(run(BodyOperator::Contains, Some("Ada"), None).passed);
        assert!(!run(BodyOperator::Contains, Some("Bob"), None).passed);
        assert!(run(BodyOperator::NotContains, Some("Bob"), None).passed);
        assert!(!run(BodyOperator::NotContains, Some("Ada"), None).passed);
    }

    #[test]
    fn test_contains_without_value_is_malformed() {
        let contains = run(BodyOperator::Contains, None, None);
        assert!(!contains.passed);
        assert_eq!(contains.message, "Operator 'contains' requires 'value'");

        let not_contains = run(BodyOperator::NotContains, None, None);
        assert!(!not_contains.passed);
        assert_eq!(not_contains.message, "Operator 'not_contains' requires 'value'");
    }

    #[test]
    fn test_equals_is_json_aware() {
        let reordered = r#"{"ok": true, "user": {"tags": ["a", "b"], "age": 36, "name": "Ada"}}"#;
        assert!(run(BodyOperator::Equals, Some(reordered), None).passed);
        assert!(!run(BodyOperator::NotEquals, Some(reordered), None).passed);

        let plain = check(
            &rule(BodyOperator::Equals, Some("pong"), None),
            &ResponseRecord::new(200, "pong"),
            &VariableTable::new(),
        );
        assert!(plain.passed);
    }

    #[test]
    fn test_json_path_exists() {
        assert!(run(BodyOperator::JsonPathExists, None, Some("$.user.tags[1]")).passed);
        assert!(!run(BodyOperator::JsonPathExists, None, Some("$.user.email")).passed);
    }

    #[test]
    fn test_json_path_equals() {
        assert!(run(BodyOperator::JsonPathEquals, Some("Ada"), Some("$.user.name")).passed);
        assert!(run(BodyOperator::JsonPathEquals, Some("36"), Some("user.age")).passed);
        assert!(run(BodyOperator::JsonPathEquals, Some("true"), Some("$.ok")).passed);
        assert!(run(BodyOperator::JsonPathEquals, Some(r#"["a","b"]"#), Some("$.user.tags")).passed);

        let mismatch = run(BodyOperator::JsonPathEquals, Some("37"), Some("$.user.age"));
        assert!(!mismatch.passed);
        assert_eq!(mismatch.actual.as_deref(), Some("36"));
    }

    #[test]
    fn test_json_path_on_invalid_json_fails_gracefully() {
        let result = check(
            &rule(BodyOperator::JsonPathExists, None, Some("$.a")),
            &ResponseRecord::new(200, "<html>"),
            &VariableTable::new(),
        );
        assert!(!result.passed);
        assert!(result.message.starts_with("Response body is not valid JSON"));

        let bad_path = run(BodyOperator::JsonPathExists, None, Some("$.user[x]"));
        assert!(!bad_path.passed);
        assert!(bad_path.message.starts_with("Invalid JSON path"));

        assert!(!run(BodyOperator::JsonPathExists, None, None).passed);
    }

    #[test]
    fn test_encoded_body_is_decoded() {
        let mut response = ResponseRecord::new(200, STANDARD.encode("binary-ish payload"));
        response.is_encoded = true;
        let result = check(
            &rule(BodyOperator::Contains, Some("payload"), None),
            &response,
            &VariableTable::new(),
        );
        assert!(result.passed);
    }

    #[test]
    fn test_expected_value_substituted() {
        let table: VariableTable = [("NAME".to_string(), "Ada".to_string())].into();
        let result = check(
            &rule(BodyOperator::JsonPathEquals, Some("{{NAME}}"), Some("$.user.name")),
            &ResponseRecord::new(200, BODY),
            &table,
        );
        assert!(result.passed);
    }
}
