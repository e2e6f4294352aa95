use serde_json::Value;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_XML: &str = "application/xml";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

pub fn is_json_content(content: &str) -> bool {
    let trimmed = content.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Parses a JSON path such as `$.data.items[0].name` or `$['odd key']`.
/// The leading `$` is optional; `a.b` is read as `$.a.b`.
pub fn parse_json_path(path: &str) -> Result<Vec<PathSegment>, String> {
    let path = path.trim();
    let rest = path.strip_prefix('$').unwrap_or(path);
    let chars: Vec<char> = rest.chars().collect();
    let mut segments = Vec::new();
    let mut i = 0;

    if !chars.is_empty() && chars[0] != '.' && chars[0] != '[' {
        // implicit root
        let (key, next) = read_key(&chars, 0);
        segments.push(PathSegment::Key(key));
        i = next;
    }

    while i < chars.len() {
        match chars[i] {
            '.' => {
                let (key, next) = read_key(&chars, i + 1);
                if key.is_empty() {
                    return Err(format!("Empty key at position {} in '{path}'", i + 1));
                }
                segments.push(PathSegment::Key(key));
                i = next;
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|offset| i + offset)
                    .ok_or_else(|| format!("Unclosed '[' in '{path}'"))?;
                let inner: String = chars[i + 1..close].iter().collect();
                let inner = inner.trim();
                let quoted = (inner.starts_with('\'') && inner.ends_with('\''))
                    || (inner.starts_with('"') && inner.ends_with('"'));
                if quoted && inner.len() >= 2 {
                    segments.push(PathSegment::Key(inner[1..inner.len() - 1].to_string()));
                } else {
                    let index = inner
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid array index '{inner}' in '{path}'"))?;
                    segments.push(PathSegment::Index(index));
                }
                i = close + 1;
            }
            other => return Err(format!("Unexpected '{other}' in '{path}'")),
        }
    }

    Ok(segments)
}

fn read_key(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && chars[end] != '.' && chars[end] != '[' {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

/// Looks up `path` inside `json`. `Ok(None)` means the path is well formed
/// but points at nothing.
pub fn query_json_path<'a>(json: &'a Value, path: &str) -> Result<Option<&'a Value>, String> {
    let segments = parse_json_path(path)?;
    let mut current = json;
    for segment in &segments {
        let next = match segment {
            PathSegment::Key(key) => current.get(key.as_str()),
            PathSegment::Index(index) => current.get(*index),
        };
        match next {
            Some(value) => current = value,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_json_content_object() {
        assert!(is_json_content(r#"{"key": "value"}"#));
        assert!(is_json_content(r#"  ["item1", "item2"]  "#));
        assert!(!is_json_content("plain text"));
        assert!(!is_json_content("{not closed"));
    }

    #[test]
    fn test_parse_json_path_forms() {
        assert_eq!(parse_json_path("$").unwrap(), vec![]);
        assert_eq!(
            parse_json_path("$.data.items[2]").unwrap(),
            vec![
                PathSegment::Key("data".into()),
                PathSegment::Key("items".into()),
                PathSegment::Index(2)
            ]
        );
        assert_eq!(
            parse_json_path("user.name").unwrap(),
            vec![PathSegment::Key("user".into()), PathSegment::Key("name".into())]
        );
        assert_eq!(
            parse_json_path("$['odd key'][0]").unwrap(),
            vec![PathSegment::Key("odd key".into()), PathSegment::Index(0)]
        );
    }

    #[test]
    fn test_parse_json_path_errors() {
        assert!(parse_json_path("$.items[abc]").is_err());
        assert!(parse_json_path("$.items[0").is_err());
        assert!(parse_json_path("$..x").is_err());
    }

    #[test]
    fn test_query_json_path() {
        let body = json!({"data": {"items": [{"id": 1}, {"id": 2}]}, "ok": true});
        assert_eq!(query_json_path(&body, "$.ok").unwrap(), Some(&json!(true)));
        assert_eq!(
            query_json_path(&body, "$.data.items[1].id").unwrap(),
            Some(&json!(2))
        );
        assert_eq!(query_json_path(&body, "$.data.items[5]").unwrap(), None);
        assert_eq!(query_json_path(&body, "$.missing").unwrap(), None);
        assert_eq!(query_json_path(&body, "$").unwrap(), Some(&body));
    }
}
