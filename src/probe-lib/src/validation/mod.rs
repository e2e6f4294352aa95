mod body;
mod header;
mod status;
mod time;

use crate::model::{
    RequestValidation, ResponseRecord, RuleCategory, RuleEntry, RuleResult, ValidationResult,
    ValidationRule,
};
use crate::resolve::VariableTable;
use std::collections::HashMap;

/// Shared rules addressable from any rule list by id.
pub type GlobalRules<'a> = HashMap<&'a str, &'a ValidationRule>;

pub fn global_rules_by_id(rules: &[ValidationRule]) -> GlobalRules<'_> {
    rules.iter().map(|rule| (rule.id(), rule)).collect()
}

pub fn evaluate_rule(
    rule: &ValidationRule,
    response: &ResponseRecord,
    table: &VariableTable,
) -> RuleResult {
    match rule {
        ValidationRule::Status(rule) => status::check(rule, response, table),
        ValidationRule::Header(rule) => header::check(rule, response, table),
        ValidationRule::Body(rule) => body::check(rule, response, table),
        ValidationRule::Time(rule) => time::check(rule, response),
    }
}

/// Runs every enabled rule against `response`. Rules never short-circuit each
/// other, and a malformed rule fails on its own without affecting siblings.
pub fn evaluate(
    validation: &RequestValidation,
    response: &ResponseRecord,
    global_rules: &GlobalRules,
    table: &VariableTable,
) -> ValidationResult {
    if !validation.enabled {
        return ValidationResult::passed_empty();
    }

    let mut results = Vec::with_capacity(validation.rules.len());
    for entry in &validation.rules {
        match entry {
            RuleEntry::Inline { rule } => {
                if rule.enabled() {
                    results.push(evaluate_rule(rule, response, table));
                }
            }
            RuleEntry::Global {
                global_rule_id,
                enabled,
            } => {
                if !enabled {
                    continue;
                }
                match global_rules.get(global_rule_id.as_str()) {
                    Some(rule) if rule.enabled() => {
                        results.push(evaluate_rule(rule, response, table))
                    }
                    Some(_) => {}
                    None => results.push(RuleResult::fail(
                        global_rule_id,
                        RuleCategory::Status,
                        format!("Global rule '{global_rule_id}' not found"),
                    )),
                }
            }
        }
    }

    ValidationResult::from_results(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BodyOperator, BodyRule, StatusOperator, StatusRule, TimeOperator, TimeRule,
    };

    fn status(id: &str, operator: StatusOperator, value: &str) -> ValidationRule {
        ValidationRule::Status(StatusRule {
            id: id.into(),
            enabled: true,
            operator,
            value: value.into(),
        })
    }

    fn response() -> ResponseRecord {
        ResponseRecord::new(201, r#"{"id": 7}"#).with_elapsed(120)
    }

    #[test]
    fn test_disabled_set_passes_empty() {
        let mut validation = RequestValidation::new(vec![status("s", StatusOperator::Equals, "500")]);
        validation.enabled = false;
        let result = evaluate(&validation, &response(), &GlobalRules::new(), &VariableTable::new());
        assert_eq!(result, ValidationResult::passed_empty());
    }

    #[test]
    fn test_every_rule_is_evaluated() {
        let validation = RequestValidation::new(vec![
            status("s1", StatusOperator::Equals, "200"),
            ValidationRule::Time(TimeRule {
                id: "t1".into(),
                enabled: true,
                operator: TimeOperator::LessThan,
                value: 500,
                max_value: None,
            }),
            ValidationRule::Body(BodyRule {
                id: "b1".into(),
                enabled: false,
                operator: BodyOperator::Contains,
                value: Some("never".into()),
                json_path: None,
            }),
        ]);
        let result = evaluate(&validation, &response(), &GlobalRules::new(), &VariableTable::new());
        assert!(!result.all_passed);
        let outcome: Vec<(&str, bool)> = result
            .results
            .iter()
            .map(|r| (r.rule_id.as_str(), r.passed))
            .collect();
        assert_eq!(outcome, vec![("s1", false), ("t1", true)]);
    }

    #[test]
    fn test_global_rule_references() {
        let shared = vec![
            status("g-success", StatusOperator::IsSuccess, ""),
            ValidationRule::Status(StatusRule {
                id: "g-off".into(),
                enabled: false,
                operator: StatusOperator::Equals,
                value: "500".into(),
            }),
        ];
        let globals = global_rules_by_id(&shared);
        let validation = RequestValidation {
            enabled: true,
            rules: vec![
                RuleEntry::Global {
                    global_rule_id: "g-success".into(),
                    enabled: true,
                },
                RuleEntry::Global {
                    global_rule_id: "g-off".into(),
                    enabled: true,
                },
                RuleEntry::Global {
                    global_rule_id: "g-success".into(),
                    enabled: false,
                },
                RuleEntry::Global {
                    global_rule_id: "g-missing".into(),
                    enabled: true,
                },
            ],
        };

        let result = evaluate(&validation, &response(), &globals, &VariableTable::new());
        assert_eq!(result.results.len(), 2);
        assert!(result.results[0].passed);
        assert_eq!(result.results[1].rule_id, "g-missing");
        assert_eq!(result.results[1].category, RuleCategory::Status);
        assert!(!result.results[1].passed);
    }

    #[test]
    fn test_evaluate_is_repeatable() {
        let validation = RequestValidation::default_success();
        let table = VariableTable::new();
        let first = evaluate(&validation, &response(), &GlobalRules::new(), &table);
        let second = evaluate(&validation, &response(), &GlobalRules::new(), &table);
        assert_eq!(first, second);
        assert!(first.all_passed);
    }
}
