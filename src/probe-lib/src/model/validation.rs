use serde::{Deserialize, Deserializer, Serialize};

fn default_true() -> bool {
    true
}

/// Accepts `"200"` as well as `200` for operands persisted by older editors.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusOperator {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    IsSuccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderOperator {
    Exists,
    NotExists,
    Equals,
    Contains,
    MatchesRegex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyOperator {
    Contains,
    NotContains,
    Equals,
    NotEquals,
    JsonPathExists,
    JsonPathEquals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOperator {
    LessThan,
    GreaterThan,
    Between,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRule {
    pub id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub operator: StatusOperator,
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderRule {
    pub id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub header_name: String,
    pub operator: HeaderOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyRule {
    pub id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub operator: BodyOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRule {
    pub id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub operator: TimeOperator,
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Status,
    Header,
    Body,
    Time,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum ValidationRule {
    Status(StatusRule),
    Header(HeaderRule),
    Body(BodyRule),
    Time(TimeRule),
}

impl ValidationRule {
    pub fn id(&self) -> &str {
        match self {
            ValidationRule::Status(rule) => &rule.id,
            ValidationRule::Header(rule) => &rule.id,
            ValidationRule::Body(rule) => &rule.id,
            ValidationRule::Time(rule) => &rule.id,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            ValidationRule::Status(rule) => rule.enabled,
            ValidationRule::Header(rule) => rule.enabled,
            ValidationRule::Body(rule) => rule.enabled,
            ValidationRule::Time(rule) => rule.enabled,
        }
    }

    pub fn category(&self) -> RuleCategory {
        match self {
            ValidationRule::Status(_) => RuleCategory::Status,
            ValidationRule::Header(_) => RuleCategory::Header,
            ValidationRule::Body(_) => RuleCategory::Body,
            ValidationRule::Time(_) => RuleCategory::Time,
        }
    }
}

/// One slot in a rule list: either a rule written in place or a reference to a
/// shared rule kept alongside the suites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
    #[serde(rename_all = "camelCase")]
    Global {
        global_rule_id: String,
        #[serde(default = "default_true")]
        enabled: bool,
    },
    Inline {
        rule: ValidationRule,
    },
}

impl RuleEntry {
    pub fn inline(rule: ValidationRule) -> Self {
        RuleEntry::Inline { rule }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestValidation {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

pub const DEFAULT_RULE_ID: &str = "default-status-success";

impl RequestValidation {
    pub fn new(rules: Vec<ValidationRule>) -> Self {
        RequestValidation {
            enabled: true,
            rules: rules.into_iter().map(RuleEntry::inline).collect(),
        }
    }

    /// Validation applied when neither the item nor the test case defines one.
    pub fn default_success() -> Self {
        Self::new(vec![ValidationRule::Status(StatusRule {
            id: DEFAULT_RULE_ID.to_string(),
            enabled: true,
            operator: StatusOperator::IsSuccess,
            value: String::new(),
        })])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResult {
    pub rule_id: String,
    pub category: RuleCategory,
    pub passed: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl RuleResult {
    pub fn pass(rule_id: &str, category: RuleCategory, message: impl Into<String>) -> Self {
        RuleResult {
            rule_id: rule_id.to_string(),
            category,
            passed: true,
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn fail(rule_id: &str, category: RuleCategory, message: impl Into<String>) -> Self {
        RuleResult {
            passed: false,
            ..Self::pass(rule_id, category, message)
        }
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub all_passed: bool,
    pub results: Vec<RuleResult>,
}

impl ValidationResult {
    pub fn passed_empty() -> Self {
        ValidationResult {
            all_passed: true,
            results: Vec::new(),
        }
    }

    pub fn from_results(results: Vec<RuleResult>) -> Self {
        ValidationResult {
            all_passed: results.iter().all(|r| r.passed),
            results,
        }
    }
}
