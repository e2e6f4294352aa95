use crate::model::{RequestTestItem, RequestValidation, Suite, TestCaseData, TestItem};

/// One concrete execution of a request item.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub item_id: String,
    pub item_name: String,
    pub reference_id: String,
    pub test_case_id: Option<String>,
    pub test_case_name: Option<String>,
    pub override_data: Option<TestCaseData>,
    pub effective_validation: RequestValidation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub invocations: Vec<Invocation>,
    /// Every test case is disabled, so the item does not run at all.
    pub skipped: bool,
}

/// Turns a request item into its invocations: one with base data when it has
/// no test cases, otherwise one per enabled case in case order.
pub fn expand(item: &RequestTestItem) -> Expansion {
    let item_validation = item
        .validation
        .clone()
        .unwrap_or_else(RequestValidation::default_success);

    let cases = item.sorted_test_cases();
    if cases.is_empty() {
        return Expansion {
            invocations: vec![Invocation {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                reference_id: item.reference_id.clone(),
                test_case_id: None,
                test_case_name: None,
                override_data: None,
                effective_validation: item_validation,
            }],
            skipped: false,
        };
    }

    let invocations: Vec<Invocation> = cases
        .into_iter()
        .filter(|case| case.enabled)
        .map(|case| Invocation {
            item_id: item.id.clone(),
            item_name: item.name.clone(),
            reference_id: item.reference_id.clone(),
            test_case_id: Some(case.id.clone()),
            test_case_name: Some(case.name.clone()),
            override_data: Some(case.data.clone()),
            effective_validation: case
                .validation
                .clone()
                .unwrap_or_else(|| item_validation.clone()),
        })
        .collect();

    Expansion {
        skipped: invocations.is_empty(),
        invocations,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkUnit {
    Request(Invocation),
    /// Flows are dispatched whole and occupy a single slot in a batch.
    Flow {
        item_id: String,
        item_name: String,
        reference_id: String,
    },
}

impl WorkUnit {
    pub fn item_id(&self) -> &str {
        match self {
            WorkUnit::Request(invocation) => &invocation.item_id,
            WorkUnit::Flow { item_id, .. } => item_id,
        }
    }

    pub fn test_case_id(&self) -> Option<&str> {
        match self {
            WorkUnit::Request(invocation) => invocation.test_case_id.as_deref(),
            WorkUnit::Flow { .. } => None,
        }
    }

    pub fn is_flow(&self) -> bool {
        matches!(self, WorkUnit::Flow { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedKind {
    Request,
    Flow,
}

/// Seed for an item's slot in the result tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedItem {
    pub item_id: String,
    pub name: String,
    pub kind: PlannedKind,
    /// `(id, name)` of each case that will run.
    pub test_cases: Vec<(String, String)>,
    pub skipped: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub items: Vec<PlannedItem>,
    pub units: Vec<WorkUnit>,
}

impl RunPlan {
    pub fn batch_count(&self, batch_size: usize) -> usize {
        self.units.len().div_ceil(batch_size.max(1))
    }
}

/// Flattens a suite into work units in item order. Disabled items and items
/// whose cases are all disabled appear in `items` as skipped and produce no units.
pub fn plan(suite: &Suite) -> RunPlan {
    let mut items = Vec::with_capacity(suite.items.len());
    let mut units = Vec::new();

    for item in suite.sorted_items() {
        match item {
            TestItem::Request(request) => {
                let expansion = if request.enabled {
                    expand(request)
                } else {
                    Expansion {
                        invocations: Vec::new(),
                        skipped: true,
                    }
                };
                items.push(PlannedItem {
                    item_id: request.id.clone(),
                    name: request.name.clone(),
                    kind: PlannedKind::Request,
                    test_cases: expansion
                        .invocations
                        .iter()
                        .filter_map(|invocation| {
                            Some((
                                invocation.test_case_id.clone()?,
                                invocation.test_case_name.clone().unwrap_or_default(),
                            ))
                        })
                        .collect(),
                    skipped: expansion.skipped,
                });
                units.extend(expansion.invocations.into_iter().map(WorkUnit::Request));
            }
            TestItem::Flow(flow) => {
                items.push(PlannedItem {
                    item_id: flow.id.clone(),
                    name: flow.name.clone(),
                    kind: PlannedKind::Flow,
                    test_cases: Vec::new(),
                    skipped: !flow.enabled,
                });
                if flow.enabled {
                    units.push(WorkUnit::Flow {
                        item_id: flow.id.clone(),
                        item_name: flow.name.clone(),
                        reference_id: flow.reference_id.clone(),
                    });
                }
            }
        }
    }

    RunPlan { items, units }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        FlowTestItem, RuleEntry, StatusOperator, StatusRule, TestCase, ValidationRule,
    };

    fn case(id: &str, order: u32, enabled: bool) -> TestCase {
        TestCase {
            id: id.into(),
            name: format!("case {id}"),
            enabled,
            order,
            data: TestCaseData::default(),
            validation: None,
        }
    }

    fn status_equals(id: &str, value: &str) -> RequestValidation {
        RequestValidation::new(vec![ValidationRule::Status(StatusRule {
            id: id.into(),
            enabled: true,
            operator: StatusOperator::Equals,
            value: value.into(),
        })])
    }

    fn rule_id(validation: &RequestValidation) -> &str {
        match &validation.rules[0] {
            RuleEntry::Inline { rule } => rule.id(),
            RuleEntry::Global { global_rule_id, .. } => global_rule_id,
        }
    }

    #[test]
    fn test_expand_without_cases_runs_once() {
        let item = RequestTestItem::new("i1", "c1:r1", 0);
        let expansion = expand(&item);
        assert!(!expansion.skipped);
        assert_eq!(expansion.invocations.len(), 1);
        let invocation = &expansion.invocations[0];
        assert_eq!(invocation.test_case_id, None);
        assert_eq!(invocation.override_data, None);
        assert_eq!(invocation.effective_validation, RequestValidation::default_success());
    }

    #[test]
    fn test_expand_empty_case_list_runs_once() {
        let mut item = RequestTestItem::new("i1", "c1:r1", 0);
        item.test_cases = Some(Vec::new());
        assert_eq!(expand(&item).invocations.len(), 1);
    }

    #[test]
    fn test_expand_enabled_cases_only() {
        let mut item = RequestTestItem::new("i1", "c1:r1", 0);
        item.test_cases = Some(vec![
            case("c", 2, true),
            case("a", 0, true),
            case("off", 1, false),
            case("b", 1, true),
        ]);
        let expansion = expand(&item);
        let ids: Vec<_> = expansion
            .invocations
            .iter()
            .map(|i| i.test_case_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(!expansion.skipped);
    }

    #[test]
    fn test_expand_all_disabled_is_skipped() {
        let mut item = RequestTestItem::new("i1", "c1:r1", 0);
        item.test_cases = Some((0..4).map(|n| case(&n.to_string(), n, false)).collect());
        let expansion = expand(&item);
        assert!(expansion.skipped);
        assert!(expansion.invocations.is_empty());
    }

    #[test]
    fn test_expand_validation_fallback() {
        let mut item = RequestTestItem::new("i1", "c1:r1", 0);
        item.validation = Some(status_equals("item-rule", "200"));
        let mut own = case("own", 0, true);
        own.validation = Some(status_equals("case-rule", "201"));
        item.test_cases = Some(vec![own, case("inherits", 1, true)]);

        let expansion = expand(&item);
        assert_eq!(rule_id(&expansion.invocations[0].effective_validation), "case-rule");
        assert_eq!(rule_id(&expansion.invocations[1].effective_validation), "item-rule");

        item.validation = None;
        let expansion = expand(&item);
        // absent validation at both levels falls back to the 2xx default
        assert_eq!(
            expansion.invocations[1].effective_validation,
            RequestValidation::default_success()
        );
    }

    #[test]
    fn test_plan_orders_units_and_marks_skipped() {
        let mut disabled = RequestTestItem::new("disabled", "c1:r9", 0);
        disabled.enabled = false;
        let mut with_cases = RequestTestItem::new("cases", "c1:r2", 2);
        with_cases.test_cases = Some(vec![case("x", 0, true), case("y", 1, true)]);

        let suite = Suite::new(
            "s1",
            vec![
                TestItem::Request(with_cases),
                TestItem::Request(RequestTestItem::new("first", "c1:r1", 1)),
                TestItem::Request(disabled),
                TestItem::Flow(FlowTestItem {
                    id: "flow".into(),
                    name: "Flow".into(),
                    order: 3,
                    enabled: true,
                    reference_id: "f1".into(),
                }),
            ],
        );

        let plan = plan(&suite);
        let units: Vec<(&str, Option<&str>)> = plan
            .units
            .iter()
            .map(|u| (u.item_id(), u.test_case_id()))
            .collect();
        assert_eq!(
            units,
            vec![
                ("first", None),
                ("cases", Some("x")),
                ("cases", Some("y")),
                ("flow", None)
            ]
        );
        assert!(plan.units[3].is_flow());

        let items: Vec<(&str, bool)> = plan
            .items
            .iter()
            .map(|i| (i.item_id.as_str(), i.skipped))
            .collect();
        assert_eq!(
            items,
            vec![("disabled", true), ("first", false), ("cases", false), ("flow", false)]
        );
        assert_eq!(plan.items[2].test_cases.len(), 2);
    }

    #[test]
    fn test_batch_count() {
        let items = (0..5)
            .map(|n| TestItem::Request(RequestTestItem::new(n.to_string(), "r", n)))
            .collect();
        let plan = plan(&Suite::new("s1", items));
        assert_eq!(plan.batch_count(1), 5);
        assert_eq!(plan.batch_count(2), 3);
        assert_eq!(plan.batch_count(5), 1);
        assert_eq!(plan.batch_count(0), 5);
    }
}
