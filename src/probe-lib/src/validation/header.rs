use crate::model::{HeaderOperator, HeaderRule, ResponseRecord, RuleCategory, RuleResult};
use crate::resolve::{substitute, VariableTable};
use regex::RegexBuilder;

fn fail(rule: &HeaderRule, message: String) -> RuleResult {
    RuleResult::fail(&rule.id, RuleCategory::Header, message)
}

fn pass(rule: &HeaderRule, message: String) -> RuleResult {
    RuleResult::pass(&rule.id, RuleCategory::Header, message)
}

pub(super) fn check(rule: &HeaderRule, response: &ResponseRecord, table: &VariableTable) -> RuleResult {
    let name = &rule.header_name;
    let actual = response.header(name);

    match rule.operator {
        HeaderOperator::Exists => match actual {
            Some(value) => pass(rule, format!("Header '{name}' exists")).with_actual(value),
            None => fail(rule, format!("Header '{name}' not found")),
        },
        HeaderOperator::NotExists => match actual {
            Some(value) => fail(rule, format!("Header '{name}' should not exist")).with_actual(value),
            None => pass(rule, format!("Header '{name}' is absent")),
        },
        operator => {
            let expected = substitute(rule.value.as_deref().unwrap_or_default(), table).result;
            let Some(actual) = actual else {
                return fail(rule, format!("Header '{name}' not found")).with_expected(expected);
            };

            let outcome = match operator {
                HeaderOperator::Equals => Ok(if rule.case_sensitive {
                    actual == expected
                } else {
                    actual.to_lowercase() == expected.to_lowercase()
                }),
                HeaderOperator::Contains => Ok(if rule.case_sensitive {
                    actual.contains(&expected)
                } else {
                    actual.to_lowercase().contains(&expected.to_lowercase())
                }),
                _ => RegexBuilder::new(&expected)
                    .case_insensitive(!rule.case_sensitive)
                    .build()
                    .map(|re| re.is_match(actual))
                    .map_err(|e| format!("Invalid regex '{expected}': {e}")),
            };

            let verb = match operator {
                HeaderOperator::Equals => "equal",
                HeaderOperator::Contains => "contain",
                _ => "match",
            };
            let result = match outcome {
                Ok(true) => pass(rule, format!("Header '{name}' does {verb} '{expected}'")),
                Ok(false) => fail(rule, format!("Header '{name}' does not {verb} '{expected}'")),
                Err(message) => fail(rule, message),
            };
            result.with_expected(expected).with_actual(actual)
        }
    }
}
