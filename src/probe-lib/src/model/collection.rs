use super::http_method::HttpMethod;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawLanguage {
    #[default]
    Text,
    Json,
    Xml,
    Html,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RequestBody {
    #[default]
    None,
    Raw {
        #[serde(default)]
        content: String,
        #[serde(default)]
        language: RawLanguage,
    },
    UrlEncoded {
        #[serde(default)]
        fields: Vec<KeyValue>,
    },
    FormData {
        #[serde(default)]
        fields: Vec<KeyValue>,
    },
}

impl RequestBody {
    pub fn raw_json(content: impl Into<String>) -> Self {
        RequestBody::Raw {
            content: content.into(),
            language: RawLanguage::Json,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, RequestBody::None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTemplate {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub params: Vec<KeyValue>,
    #[serde(default)]
    pub body: RequestBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_id: Option<String>,
}

impl RequestTemplate {
    pub fn new(id: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        let id = id.into();
        RequestTemplate {
            name: id.clone(),
            id,
            method,
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            body: RequestBody::None,
            auth_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CollectionItem {
    Folder {
        id: String,
        #[serde(default)]
        name: String,
        #[serde(default)]
        items: Vec<CollectionItem>,
    },
    Request(RequestTemplate),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<CollectionItem>,
}

impl Collection {
    /// Number of request templates in the tree, folders excluded.
    pub fn request_count(&self) -> usize {
        fn count(items: &[CollectionItem]) -> usize {
            items
                .iter()
                .map(|item| match item {
                    CollectionItem::Folder { items, .. } => count(items),
                    CollectionItem::Request(_) => 1,
                })
                .sum()
        }
        count(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_collection_tree() {
        let json = r#"{
            "id": "c1",
            "name": "Users",
            "items": [
                {"type": "request", "id": "r1", "method": "GET", "url": "{{baseUrl}}/users"},
                {"type": "folder", "id": "f1", "name": "Admin", "items": [
                    {"type": "request", "id": "r2", "method": "post", "url": "/admin",
                     "headers": [{"key": "X-Trace", "value": "1", "enabled": false}],
                     "body": {"mode": "raw", "content": "{}", "language": "json"}}
                ]}
            ]
        }"#;

        let collection: Collection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.request_count(), 2);

        let CollectionItem::Folder { items, .. } = &collection.items[1] else {
            panic!("expected folder");
        };
        let CollectionItem::Request(template) = &items[0] else {
            panic!("expected request");
        };
        assert_eq!(template.method, HttpMethod::POST);
        assert!(!template.headers[0].enabled);
        assert_eq!(template.body, RequestBody::raw_json("{}"));
    }

    #[test]
    fn test_body_defaults_to_none() {
        let template: RequestTemplate = serde_json::from_str(r#"{"id": "r1"}"#).unwrap();
        assert!(template.body.is_none());
        assert_eq!(template.method, HttpMethod::GET);
    }

    #[test]
    fn test_key_value_enabled_by_default() {
        let kv: KeyValue = serde_json::from_str(r#"{"key": "a", "value": "b"}"#).unwrap();
        assert!(kv.enabled);
    }

    #[test]
    fn test_url_encoded_body_tag() {
        let body = RequestBody::UrlEncoded {
            fields: vec![KeyValue::new("a", "1")],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["mode"], "url_encoded");
    }
}
