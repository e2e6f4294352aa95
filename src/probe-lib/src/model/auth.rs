use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_header_prefix() -> String {
    "Bearer".to_string()
}

/// Fields every credential kind shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCommon {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub domain_filters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl AuthCommon {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        AuthCommon {
            name: id.clone(),
            id,
            enabled: true,
            domain_filters: Vec::new(),
            expiry_date: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry <= now)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    #[default]
    Header,
    Query,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyAuth {
    #[serde(flatten)]
    pub common: AuthCommon,
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub add_to: ApiKeyLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicAuth {
    #[serde(flatten)]
    pub common: AuthCommon,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestAuth {
    #[serde(flatten)]
    pub common: AuthCommon,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2RefreshAuth {
    #[serde(flatten)]
    pub common: AuthCommon,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_header_prefix")]
    pub header_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Auth {
    ApiKey(ApiKeyAuth),
    Basic(BasicAuth),
    Digest(DigestAuth),
    #[serde(rename = "oauth2_refresh")]
    OAuth2Refresh(OAuth2RefreshAuth),
}

impl Auth {
    pub fn common(&self) -> &AuthCommon {
        match self {
            Auth::ApiKey(auth) => &auth.common,
            Auth::Basic(auth) => &auth.common,
            Auth::Digest(auth) => &auth.common,
            Auth::OAuth2Refresh(auth) => &auth.common,
        }
    }

    pub fn id(&self) -> &str {
        &self.common().id
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Auth::ApiKey(_) => "api_key",
            Auth::Basic(_) => "basic",
            Auth::Digest(_) => "digest",
            Auth::OAuth2Refresh(_) => "oauth2_refresh",
        }
    }
}
