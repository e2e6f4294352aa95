use super::auth_provider::AuthProvider;
use crate::client::HttpExecutor;
use crate::core::error::EngineError;
use crate::model::{HttpMethod, KeyValue, OAuth2RefreshAuth, RequestBody};
use crate::request::ResolvedRequest;
use crate::resolve::{Substitutor, VariableTable};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

const GRANT_TYPE_REFRESH: &str = "refresh_token";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl OAuth2RefreshAuth {
    /// True when the stored token is missing or expired and a refresh is possible.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        let can_refresh = non_empty(&self.refresh_token).is_some() && non_empty(&self.token_url).is_some();
        let stale = non_empty(&self.access_token).is_none()
            || self.token_expires_at.is_some_and(|expires| expires <= now);
        can_refresh && stale
    }

    pub fn refresh_request(&self, table: &VariableTable) -> Result<ResolvedRequest, EngineError> {
        let mut substitutor = Substitutor::new(table);
        let token_url = substitutor.apply(non_empty(&self.token_url).unwrap_or_default());

        let mut fields = vec![
            KeyValue::new("grant_type", GRANT_TYPE_REFRESH),
            KeyValue::new(
                "refresh_token",
                substitutor.apply(non_empty(&self.refresh_token).unwrap_or_default()),
            ),
        ];
        if let Some(client_id) = non_empty(&self.client_id) {
            fields.push(KeyValue::new("client_id", substitutor.apply(client_id)));
        }
        if let Some(client_secret) = non_empty(&self.client_secret) {
            fields.push(KeyValue::new("client_secret", substitutor.apply(client_secret)));
        }

        if substitutor.has_unresolved() {
            return Err(EngineError::UnresolvedVariables(substitutor.into_unresolved()));
        }

        let mut request = ResolvedRequest::new(HttpMethod::POST, token_url);
        request.set_header(
            reqwest::header::CONTENT_TYPE.as_str(),
            crate::core::json::CONTENT_TYPE_FORM,
        );
        request.set_header(reqwest::header::ACCEPT.as_str(), crate::core::json::CONTENT_TYPE_JSON);
        request.body = RequestBody::UrlEncoded { fields };
        Ok(request)
    }

    /// Copy of this auth carrying the tokens from a token endpoint reply.
    pub fn with_token_response(&self, body: &str, now: DateTime<Utc>) -> Result<Self, EngineError> {
        let response: TokenResponse = serde_json::from_str(body)?;
        let mut refreshed = self.clone();
        refreshed.access_token = Some(response.access_token);
        if response.refresh_token.is_some() {
            refreshed.refresh_token = response.refresh_token;
        }
        refreshed.token_expires_at = response
            .expires_in
            .map(|seconds| now + Duration::seconds(seconds));
        Ok(refreshed)
    }

    pub async fn refresh<H: HttpExecutor + ?Sized>(
        &self,
        http: &H,
        table: &VariableTable,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let request = self.refresh_request(table)?;
        let response = http.execute(&request).await.map_err(EngineError::Transport)?;
        if !response.is_success() {
            return Err(EngineError::Transport(format!(
                "Token endpoint returned {} {}",
                response.status, response.status_text
            )));
        }
        self.with_token_response(&response.decoded_body(), now)
    }
}

impl AuthProvider for OAuth2RefreshAuth {
    fn auth_type(&self) -> &str {
        "oauth2_refresh"
    }

    fn validate(&self) -> Result<(), EngineError> {
        let has_token = non_empty(&self.access_token).is_some();
        let can_refresh = non_empty(&self.refresh_token).is_some() && non_empty(&self.token_url).is_some();
        if !has_token && !can_refresh {
            return Err(EngineError::InvalidAuth(format!(
                "OAuth2 auth '{}' must have either 'accessToken' or both 'refreshToken' and 'tokenUrl'",
                self.common.name
            )));
        }
        Ok(())
    }

    fn configure(&self, request: &mut ResolvedRequest, substitutor: &mut Substitutor) {
        let Some(token) = non_empty(&self.access_token) else {
            return;
        };
        let token = substitutor.apply(token);
        let prefix = self.header_prefix.trim();
        let value = if prefix.is_empty() {
            token
        } else {
            format!("{prefix} {token}")
        };
        request.set_header(reqwest::header::AUTHORIZATION.as_str(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ExecFuture;
    use crate::model::{AuthCommon, ResponseRecord};
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn oauth() -> OAuth2RefreshAuth {
        OAuth2RefreshAuth {
            common: AuthCommon::new("o1"),
            access_token: Some("old-token".into()),
            refresh_token: Some("refresh-1".into()),
            token_url: Some("https://auth.example.com/token".into()),
            client_id: Some("{{CLIENT_ID}}".into()),
            client_secret: None,
            token_expires_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 11, 0, 0).unwrap()),
            header_prefix: "Bearer".into(),
        }
    }

    struct TokenEndpoint {
        seen: Mutex<Vec<ResolvedRequest>>,
        reply: ResponseRecord,
    }

    impl HttpExecutor for TokenEndpoint {
        fn execute<'a>(&'a self, request: &'a ResolvedRequest) -> ExecFuture<'a> {
            Box::pin(async move {
                self.seen.lock().unwrap().push(request.clone());
                Ok(self.reply.clone())
            })
        }
    }

    #[test]
    fn test_needs_refresh() {
        let mut auth = oauth();
        assert!(auth.needs_refresh(now()));

        auth.token_expires_at = Some(Utc.with_ymd_and_hms(2026, 3, 1, 13, 0, 0).unwrap());
        assert!(!auth.needs_refresh(now()));

        auth.access_token = None;
        assert!(auth.needs_refresh(now()));

        auth.refresh_token = None;
        assert!(!auth.needs_refresh(now()));
    }

    #[test]
    fn test_refresh_request_is_form_post() {
        let table: VariableTable = [("CLIENT_ID".to_string(), "app".to_string())].into();
        let request = oauth().refresh_request(&table).unwrap();
        assert_eq!(request.method, HttpMethod::POST);
        assert_eq!(request.url, "https://auth.example.com/token");
        assert_eq!(
            request.body,
            RequestBody::UrlEncoded {
                fields: vec![
                    KeyValue::new("grant_type", "refresh_token"),
                    KeyValue::new("refresh_token", "refresh-1"),
                    KeyValue::new("client_id", "app"),
                ]
            }
        );

        let err = oauth().refresh_request(&VariableTable::new()).unwrap_err();
        assert_eq!(err.unresolved_names(), ["CLIENT_ID"]);
    }

    #[test]
    fn test_with_token_response() {
        let refreshed = oauth()
            .with_token_response(r#"{"access_token": "new", "expires_in": 3600}"#, now())
            .unwrap();
        assert_eq!(refreshed.access_token.as_deref(), Some("new"));
        assert_eq!(refreshed.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(
            refreshed.token_expires_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 13, 0, 0).unwrap())
        );
        assert!(oauth().with_token_response("not json", now()).is_err());
    }

    #[tokio::test]
    async fn test_refresh_through_executor() {
        let endpoint = TokenEndpoint {
            seen: Mutex::new(Vec::new()),
            reply: ResponseRecord::new(200, r#"{"access_token": "fresh", "refresh_token": "r2"}"#),
        };
        let table: VariableTable = [("CLIENT_ID".to_string(), "app".to_string())].into();

        let refreshed = oauth().refresh(&endpoint, &table, now()).await.unwrap();

        assert_eq!(refreshed.access_token.as_deref(), Some("fresh"));
        assert_eq!(refreshed.refresh_token.as_deref(), Some("r2"));
        assert_eq!(endpoint.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_rejected_by_endpoint() {
        let endpoint = TokenEndpoint {
            seen: Mutex::new(Vec::new()),
            reply: ResponseRecord::new(400, r#"{"error": "invalid_grant"}"#),
        };
        let table: VariableTable = [("CLIENT_ID".to_string(), "app".to_string())].into();
        let err = oauth().refresh(&endpoint, &table, now()).await.unwrap_err();
        assert!(err.to_string().starts_with("HTTP Error: Token endpoint returned 400"));
    }

    #[test]
    fn test_configure_uses_prefix() {
        let mut auth = oauth();
        let table = VariableTable::new();
        let mut substitutor = Substitutor::new(&table);
        let mut request = ResolvedRequest::new(HttpMethod::GET, "https://x");
        auth.configure(&mut request, &mut substitutor);
        assert_eq!(request.header("authorization"), Some("Bearer old-token"));

        auth.header_prefix = String::new();
        auth.configure(&mut request, &mut substitutor);
        assert_eq!(request.header("authorization"), Some("old-token"));
    }

    #[test]
    fn test_validate() {
        assert!(oauth().validate().is_ok());
        let mut auth = oauth();
        auth.access_token = None;
        auth.token_url = None;
        assert!(auth.validate().is_err());
    }
}
