use crate::model::Environment;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};

/// Values may reference other variables; substitution stops after this many passes.
const MAX_PASSES: usize = 10;

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").unwrap();
}

pub type VariableTable = HashMap<String, String>;

/// Merges the variable tiers into one lookup table.
///
/// Lowest to highest precedence: every environment named `global` (enabled
/// variables only), the active environment (enabled only), then the test
/// case's own variables.
pub fn resolve(
    environments: &[Environment],
    active_env_id: Option<&str>,
    case_variables: Option<&IndexMap<String, String>>,
) -> VariableTable {
    let mut table = VariableTable::new();

    for env in environments.iter().filter(|env| env.is_global()) {
        for var in env.enabled_variables() {
            table.insert(var.key.clone(), var.value.clone());
        }
    }

    if let Some(active) = active_env_id.and_then(|id| environments.iter().find(|env| env.id == id))
    {
        for var in active.enabled_variables() {
            table.insert(var.key.clone(), var.value.clone());
        }
    }

    if let Some(case_variables) = case_variables {
        for (key, value) in case_variables {
            table.insert(key.clone(), value.clone());
        }
    }

    table
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub result: String,
    pub unresolved: BTreeSet<String>,
}

/// Replaces every `{{name}}` found in `table`. Unknown names stay in the output
/// verbatim and are reported in `unresolved`; this never fails.
pub fn substitute(text: &str, table: &VariableTable) -> Substitution {
    let mut result = text.to_string();

    for _ in 0..MAX_PASSES {
        let mut changed = false;
        let next = PLACEHOLDER.replace_all(&result, |caps: &regex::Captures| {
            match table.get(&caps[1]) {
                Some(value) => {
                    changed = true;
                    value.clone()
                }
                None => caps[0].to_string(),
            }
        });
        if !changed {
            break;
        }
        result = next.into_owned();
    }

    let unresolved = PLACEHOLDER
        .captures_iter(&result)
        .map(|caps| caps[1].to_string())
        .collect();

    Substitution { result, unresolved }
}

/// Runs `substitute` over many fields of one request and keeps the union of
/// unresolved names, so a single error can report all of them.
pub struct Substitutor<'a> {
    table: &'a VariableTable,
    unresolved: BTreeSet<String>,
}

impl<'a> Substitutor<'a> {
    pub fn new(table: &'a VariableTable) -> Self {
        Substitutor {
            table,
            unresolved: BTreeSet::new(),
        }
    }

    pub fn apply(&mut self, text: &str) -> String {
        let substitution = substitute(text, self.table);
        self.unresolved.extend(substitution.unresolved);
        substitution.result
    }

    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }

    pub fn into_unresolved(self) -> Vec<String> {
        self.unresolved.into_iter().collect()
    }
}
