use super::{ExecFuture, HttpExecutor};
use crate::auth::DigestChallenge;
use crate::core::error::EngineError;
use crate::debug_log;
use crate::model::{RequestBody, ResponseRecord};
use crate::request::ResolvedRequest;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;
use std::time::{Duration, Instant};

/// `HttpExecutor` backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
    user_agent: String,
}

impl ReqwestExecutor {
    pub fn new(user_agent: impl Into<String>) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        Ok(ReqwestExecutor {
            client,
            user_agent: user_agent.into(),
        })
    }

    fn target_url(request: &ResolvedRequest) -> Result<reqwest::Url, String> {
        let mut url = reqwest::Url::parse(&request.url)
            .map_err(|e| format!("Invalid URL '{}': {e}", request.url))?;
        if !request.params.is_empty() {
            url.query_pairs_mut().extend_pairs(
                request
                    .params
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            );
        }
        Ok(url)
    }

    fn prepare(
        &self,
        request: &ResolvedRequest,
        url: reqwest::Url,
        authorization: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(request.method.to_reqwest_method(), url)
            .header(reqwest::header::USER_AGENT, &self.user_agent);

        for (key, value) in &request.headers {
            debug_log!("Adding header: {key}: {value}");
            builder = builder.header(key, value);
        }
        if let Some(authorization) = authorization {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization);
        }

        builder = match &request.body {
            RequestBody::None => builder,
            RequestBody::Raw { content, .. } => builder.body(content.clone()),
            RequestBody::UrlEncoded { fields } => {
                let pairs: Vec<(&str, &str)> = fields
                    .iter()
                    .map(|field| (field.key.as_str(), field.value.as_str()))
                    .collect();
                builder.form(&pairs)
            }
            RequestBody::FormData { fields } => {
                let form = fields.iter().fold(reqwest::multipart::Form::new(), |form, field| {
                    form.text(field.key.clone(), field.value.clone())
                });
                builder.multipart(form)
            }
        };

        if let Some(timeout_ms) = request.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        builder
    }

    fn describe_error(error: reqwest::Error, request: &ResolvedRequest) -> String {
        match request.timeout_ms {
            Some(timeout_ms) if error.is_timeout() => {
                format!("Request timed out after {timeout_ms}ms")
            }
            _ => error.to_string(),
        }
    }

    async fn send(&self, request: &ResolvedRequest) -> Result<ResponseRecord, String> {
        let url = Self::target_url(request)?;
        debug_log!("Executing {} request to URL: {url}", request.method);

        let started = Instant::now();
        let mut response = self
            .prepare(request, url.clone(), None)
            .send()
            .await
            .map_err(|e| Self::describe_error(e, request))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(reqwest::header::WWW_AUTHENTICATE)
                .and_then(|value| value.to_str().ok())
                .and_then(DigestChallenge::parse);
            if let (Some(challenge), Some(credentials)) = (challenge, &request.digest) {
                debug_log!("Answering digest challenge for realm '{}'", challenge.realm);
                let uri = match url.query() {
                    Some(query) => format!("{}?{query}", url.path()),
                    None => url.path().to_string(),
                };
                let cnonce = uuid::Uuid::new_v4().simple().to_string();
                let authorization = challenge.authorization(
                    credentials,
                    request.method.as_str(),
                    &uri,
                    &cnonce,
                    1,
                );
                response = self
                    .prepare(request, url, Some(&authorization))
                    .send()
                    .await
                    .map_err(|e| Self::describe_error(e, request))?;
            }
        }

        let status = response.status();
        let mut headers: IndexMap<String, String> = IndexMap::new();
        for (key, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers
                .entry(key.to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::describe_error(e, request))?;
        let elapsed_time = started.elapsed().as_millis() as u64;
        let size = bytes.len() as u64;
        let (body, is_encoded) = match String::from_utf8(bytes.to_vec()) {
            Ok(text) => (text, false),
            Err(_) => (STANDARD.encode(&bytes), true),
        };

        Ok(ResponseRecord {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            elapsed_time,
            size,
            is_encoded,
        })
    }
}

impl HttpExecutor for ReqwestExecutor {
    fn execute<'a>(&'a self, request: &'a ResolvedRequest) -> ExecFuture<'a> {
        Box::pin(self.send(request))
    }
}
