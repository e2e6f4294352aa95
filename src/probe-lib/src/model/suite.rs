use super::collection::{KeyValue, RequestBody};
use super::validation::RequestValidation;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteSettings {
    #[serde(default = "default_concurrency")]
    pub concurrent_calls: usize,
    #[serde(default)]
    pub delay_between_calls: u64,
    #[serde(default)]
    pub stop_on_failure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl Default for SuiteSettings {
    fn default() -> Self {
        SuiteSettings {
            concurrent_calls: 1,
            delay_between_calls: 0,
            stop_on_failure: false,
            request_timeout_ms: None,
        }
    }
}

/// Per-run replacements for stored settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOverrides {
    pub concurrent_calls: Option<usize>,
    pub delay_between_calls: Option<u64>,
    pub stop_on_failure: Option<bool>,
    pub request_timeout_ms: Option<u64>,
}

impl SuiteSettings {
    pub fn with_overrides(&self, overrides: &RunOverrides) -> SuiteSettings {
        SuiteSettings {
            concurrent_calls: overrides.concurrent_calls.unwrap_or(self.concurrent_calls),
            delay_between_calls: overrides
                .delay_between_calls
                .unwrap_or(self.delay_between_calls),
            stop_on_failure: overrides.stop_on_failure.unwrap_or(self.stop_on_failure),
            request_timeout_ms: overrides.request_timeout_ms.or(self.request_timeout_ms),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.concurrent_calls.max(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<KeyValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<KeyValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub data: TestCaseData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<RequestValidation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTestItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub reference_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<RequestValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_cases: Option<Vec<TestCase>>,
}

impl RequestTestItem {
    pub fn new(id: impl Into<String>, reference_id: impl Into<String>, order: u32) -> Self {
        let id = id.into();
        RequestTestItem {
            name: id.clone(),
            id,
            order,
            enabled: true,
            reference_id: reference_id.into(),
            validation: None,
            test_cases: None,
        }
    }

    pub fn sorted_test_cases(&self) -> Vec<&TestCase> {
        let mut cases: Vec<&TestCase> = self.test_cases.iter().flatten().collect();
        cases.sort_by_key(|case| case.order);
        cases
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTestItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub reference_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TestItem {
    Request(RequestTestItem),
    Flow(FlowTestItem),
}

impl TestItem {
    pub fn id(&self) -> &str {
        match self {
            TestItem::Request(item) => &item.id,
            TestItem::Flow(item) => &item.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TestItem::Request(item) => &item.name,
            TestItem::Flow(item) => &item.name,
        }
    }

    pub fn order(&self) -> u32 {
        match self {
            TestItem::Request(item) => item.order,
            TestItem::Flow(item) => item.order,
        }
    }

    fn set_order(&mut self, order: u32) {
        match self {
            TestItem::Request(item) => item.order = order,
            TestItem::Flow(item) => item.order = order,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            TestItem::Request(item) => item.enabled,
            TestItem::Flow(item) => item.enabled,
        }
    }

    pub fn reference_id(&self) -> &str {
        match self {
            TestItem::Request(item) => &item.reference_id,
            TestItem::Flow(item) => &item.reference_id,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestItem::Request(_) => "request",
            TestItem::Flow(_) => "flow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suite {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<TestItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_env_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_auth_id: Option<String>,
    #[serde(default)]
    pub settings: SuiteSettings,
}

impl Suite {
    pub fn new(id: impl Into<String>, items: Vec<TestItem>) -> Self {
        let id = id.into();
        Suite {
            name: id.clone(),
            id,
            items,
            default_env_id: None,
            default_auth_id: None,
            settings: SuiteSettings::default(),
        }
    }

    /// Items by `order`; ties keep their stored position.
    pub fn sorted_items(&self) -> Vec<&TestItem> {
        let mut items: Vec<&TestItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.order());
        items
    }

    /// Rewrites `order` to 0..n following the current sort key and stores the
    /// items in that sequence.
    pub fn normalize_order(&mut self) {
        self.items.sort_by_key(|item| item.order());
        for (index, item) in self.items.iter_mut().enumerate() {
            item.set_order(index as u32);
        }
    }

    /// Moves the item at sorted position `from` to sorted position `to`.
    /// Out-of-range positions leave the suite untouched.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        self.normalize_order();
        if from >= self.items.len() || to >= self.items.len() {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        for (index, item) in self.items.iter_mut().enumerate() {
            item.set_order(index as u32);
        }
        true
    }

    pub fn remove_item(&mut self, id: &str) -> Option<TestItem> {
        let position = self.items.iter().position(|item| item.id() == id)?;
        let removed = self.items.remove(position);
        self.normalize_order();
        Some(removed)
    }

    pub fn find_item(&self, id: &str) -> Option<&TestItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn enabled_item_count(&self) -> usize {
        self.items.iter().filter(|item| item.enabled()).count()
    }
}
