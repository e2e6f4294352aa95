use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders a view as indented `key: value` lines. Nulls and empty
/// collections are left out.
fn render_value(value: &Value, indent: usize, out: &mut String) {
    let pad = " ".repeat(indent);
    match value {
        Value::Object(map) => {
            for (key, item) in map.iter().filter(|(_, item)| !is_blank(item)) {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        out.push_str(&format!("{pad}{key}:\n"));
                        render_value(item, indent + 2, out);
                    }
                    Value::String(s) if s.contains('\n') => {
                        out.push_str(&format!("{pad}{key}:\n"));
                        for line in s.lines() {
                            out.push_str(&format!("{pad}  {line}\n"));
                        }
                    }
                    _ => out.push_str(&format!("{pad}{key}: {}\n", scalar(item))),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        out.push_str(&format!("{pad}-\n"));
                        render_value(item, indent + 2, out);
                    }
                    _ => out.push_str(&format!("{pad}- {}\n", scalar(item))),
                }
            }
        }
        Value::Null => {}
        other => out.push_str(&format!("{pad}{}\n", scalar(other))),
    }
}

fn render_text<T: Serialize + ?Sized>(model: &T) -> String {
    let value = serde_json::to_value(model).unwrap_or(Value::Null);
    let mut out = String::new();
    render_value(&value, 0, &mut out);
    out
}

pub struct Formatter {
    engine: OutputFormat,
}

impl Formatter {
    pub fn new(engine: OutputFormat) -> Self {
        Self { engine }
    }

    pub fn format<T: Serialize>(&self, model: &T) -> String {
        match self.engine {
            OutputFormat::Text => render_text(model),
            OutputFormat::Json => {
                let mut json = serde_json::to_string_pretty(model).unwrap_or_default();
                json.push('\n');
                json
            }
        }
    }

    pub fn format_list<T: Serialize>(&self, list: &[T], title: &str, empty_msg: &str) -> String {
        match self.engine {
            OutputFormat::Text if list.is_empty() => format!("{empty_msg}\n"),
            OutputFormat::Text => format!("{title}\n{}", render_text(list)),
            OutputFormat::Json => {
                let mut json =
                    serde_json::to_string_pretty(list).unwrap_or_else(|_| "[]".to_string());
                json.push('\n');
                json
            }
        }
    }
}

pub fn get_formatter(output_format: &OutputFormat) -> Formatter {
    Formatter::new(*output_format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_skips_blank_fields() {
        let formatter = Formatter::new(OutputFormat::Text);
        let text = formatter.format(&json!({
            "suite": "Smoke",
            "error": null,
            "tags": [],
            "progress": {"total": 2, "failed": 0}
        }));
        assert_eq!(text, "suite: Smoke\nprogress:\n  total: 2\n  failed: 0\n");
    }

    #[test]
    fn test_text_list_items() {
        let formatter = Formatter::new(OutputFormat::Text);
        let text = formatter.format_list(&[json!({"id": "s1"}), json!({"id": "s2"})], "Suites:", "none");
        assert_eq!(text, "Suites:\n-\n  id: s1\n-\n  id: s2\n");
        assert_eq!(formatter.format_list::<Value>(&[], "Suites:", "none"), "none\n");
    }

    #[test]
    fn test_json_output() {
        let formatter = Formatter::new(OutputFormat::Json);
        let parsed: Value = serde_json::from_str(&formatter.format(&json!({"a": 1}))).unwrap();
        assert_eq!(parsed, json!({"a": 1}));
    }
}
