use serde::{Deserialize, Serialize};

pub const GLOBAL_ENVIRONMENT_NAME: &str = "global";

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub variables: Vec<EnvVariable>,
}

impl Environment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Environment {
            id: id.into(),
            name: name.into(),
            variables: Vec::new(),
        }
    }

    pub fn with_var(mut self, key: &str, value: &str, enabled: bool) -> Self {
        self.variables.push(EnvVariable {
            key: key.to_string(),
            value: value.to_string(),
            enabled,
        });
        self
    }

    pub fn is_global(&self) -> bool {
        self.name.eq_ignore_ascii_case(GLOBAL_ENVIRONMENT_NAME)
    }

    pub fn enabled_variables(&self) -> impl Iterator<Item = &EnvVariable> {
        self.variables.iter().filter(|v| v.enabled)
    }
}
