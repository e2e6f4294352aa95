use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What the HTTP collaborator hands back for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    #[serde(default)]
    pub body: String,
    /// Milliseconds between dispatch and the last body byte.
    #[serde(default)]
    pub elapsed_time: u64,
    #[serde(default)]
    pub size: u64,
    /// `body` holds base64 when set.
    #[serde(default)]
    pub is_encoded: bool,
}

impl ResponseRecord {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        ResponseRecord {
            status,
            size: body.len() as u64,
            body,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_elapsed(mut self, elapsed_time: u64) -> Self {
        self.elapsed_time = elapsed_time;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, decoding base64 first when the record is marked encoded.
    /// Undecodable payloads fall back to the raw text.
    pub fn decoded_body(&self) -> String {
        if !self.is_encoded {
            return self.body.clone();
        }
        match STANDARD.decode(self.body.trim()) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => self.body.clone(),
        }
    }
}
