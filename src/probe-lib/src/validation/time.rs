use crate::model::{ResponseRecord, RuleCategory, RuleResult, TimeOperator, TimeRule};

pub(super) fn check(rule: &TimeRule, response: &ResponseRecord) -> RuleResult {
    let elapsed = response.elapsed_time;

    let (passed, expected) = match rule.operator {
        TimeOperator::LessThan => (elapsed < rule.value, format!("< {}ms", rule.value)),
        TimeOperator::GreaterThan => (elapsed > rule.value, format!("> {}ms", rule.value)),
        TimeOperator::Between => {
            let Some(max) = rule.max_value else {
                return RuleResult::fail(
                    &rule.id,
                    RuleCategory::Time,
                    "Operator 'between' requires 'maxValue'",
                );
            };
            (
                (rule.value..=max).contains(&elapsed),
                format!("{}ms - {max}ms", rule.value),
            )
        }
    };

    let result = if passed {
        RuleResult::pass(
            &rule.id,
            RuleCategory::Time,
            format!("Response time {elapsed}ms within {expected}"),
        )
    } else {
        RuleResult::fail(
            &rule.id,
            RuleCategory::Time,
            format!("Response time {elapsed}ms outside {expected}"),
        )
    };
    result.with_expected(expected).with_actual(format!("{elapsed}ms"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(operator: TimeOperator, value: u64, max_value: Option<u64>, elapsed: u64) -> RuleResult {
        let rule = TimeRule {
            id: "t1".into(),
            enabled: true,
            operator,
            value,
            max_value,
        };
        check(&rule, &ResponseRecord::new(200, "").with_elapsed(elapsed))
    }

    #[test]
    fn test_less_and_greater() {
        assert!(run(TimeOperator::LessThan, 500, None, 499).passed);
        assert!(!run(TimeOperator::LessThan, 500, None, 500).passed);
        assert!(run(TimeOperator::GreaterThan, 10, None, 11).passed);
        assert!(!run(TimeOperator::GreaterThan, 10, None, 10).passed);
    }

    #[test]
    fn test_between_is_inclusive() {
        assert!(run(TimeOperator::Between, 100, Some(200), 100).passed);
        assert!(run(TimeOperator::Between, 100, Some(200), 200).passed);
        assert!(!run(TimeOperator::Between, 100, Some(200), 201).passed);
        assert_eq!(
            run(TimeOperator::Between, 100, Some(200), 150).actual.as_deref(),
            Some("150ms")
        );
    }

    #[test]
    fn test_between_without_max_fails() {
        assert!(!run(TimeOperator::Between, 100, None, 150).passed);
    }
}
