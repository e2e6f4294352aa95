use crate::model::{ResponseRecord, RuleCategory, RuleResult, StatusOperator, StatusRule};
use crate::resolve::{substitute, VariableTable};

fn compare(operator: StatusOperator, actual: u16, expected: u16) -> Option<(&'static str, bool)> {
    match operator {
        StatusOperator::Equals => Some(("==", actual == expected)),
        StatusOperator::NotEquals => Some(("!=", actual != expected)),
        StatusOperator::LessThan => Some(("<", actual < expected)),
        StatusOperator::LessThanOrEqual => Some(("<=", actual <= expected)),
        StatusOperator::GreaterThan => Some((">", actual > expected)),
        StatusOperator::GreaterThanOrEqual => Some((">=", actual >= expected)),
        StatusOperator::IsSuccess => None,
    }
}

fn check_success(rule: &StatusRule, response: &ResponseRecord) -> RuleResult {
    let actual = response.status;
    let result = if response.is_success() {
        RuleResult::pass(&rule.id, RuleCategory::Status, format!("Status {actual} is 2xx"))
    } else {
        RuleResult::fail(
            &rule.id,
            RuleCategory::Status,
            format!("Expected a 2xx status, got {actual}"),
        )
    };
    result.with_expected("2xx").with_actual(actual.to_string())
}

pub(super) fn check(rule: &StatusRule, response: &ResponseRecord, table: &VariableTable) -> RuleResult {
    if rule.operator == StatusOperator::IsSuccess {
        return check_success(rule, response);
    }
    let actual = response.status;

    let expected_text = substitute(&rule.value, table).result;
    let Ok(expected) = expected_text.trim().parse::<u16>() else {
        return RuleResult::fail(
            &rule.id,
            RuleCategory::Status,
            format!("Invalid expected status '{expected_text}'"),
        )
        .with_expected(expected_text)
        .with_actual(actual.to_string());
    };

    let Some((symbol, passed)) = compare(rule.operator, actual, expected) else {
        return check_success(rule, response);
    };
    let message = format!("Status {actual} {symbol} {expected}");
    let result = if passed {
        RuleResult::pass(&rule.id, RuleCategory::Status, message)
    } else {
        RuleResult::fail(&rule.id, RuleCategory::Status, format!("{message} failed"))
    };
    result
        .with_expected(format!("{symbol} {expected}"))
        .with_actual(actual.to_string())
}
