use crate::auth::DigestCredentials;
use crate::core::error::EngineError;
use crate::core::json::{
    is_json_content, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON, CONTENT_TYPE_XML,
};
use crate::debug_log;
use crate::model::{
    Auth, HttpMethod, KeyValue, RawLanguage, RequestBody, RequestTemplate, TestCaseData,
};
use crate::resolve::{Substitutor, VariableTable};

const DEFAULT_SCHEME: &str = "https://";

/// A request with every placeholder replaced, ready for the HTTP executor.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub body: RequestBody,
    /// Answered by the executor when the server issues a digest challenge.
    pub digest: Option<DigestCredentials>,
    pub timeout_ms: Option<u64>,
}

impl ResolvedRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        ResolvedRequest {
            method,
            url: url.into(),
            headers: Vec::new(),
            params: Vec::new(),
            body: RequestBody::None,
            digest: None,
            timeout_ms: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Replaces a header of the same name (any case) or appends a new one.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some(existing) => existing.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }
}

fn merge_entries(
    base: &[KeyValue],
    overrides: Option<&Vec<KeyValue>>,
    same_key: fn(&str, &str) -> bool,
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = base
        .iter()
        .filter(|entry| entry.enabled)
        .map(|entry| (entry.key.clone(), entry.value.clone()))
        .collect();

    for entry in overrides.into_iter().flatten().filter(|entry| entry.enabled) {
        match merged.iter_mut().find(|(key, _)| same_key(key, &entry.key)) {
            Some(existing) => existing.1 = entry.value.clone(),
            None => merged.push((entry.key.clone(), entry.value.clone())),
        }
    }

    merged
}

fn header_key_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

fn param_key_eq(a: &str, b: &str) -> bool {
    a == b
}

/// True when `url` starts with `scheme://`, per RFC 3986 scheme syntax.
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn with_default_scheme(url: String) -> String {
    if url.is_empty() || has_scheme(&url) {
        url
    } else {
        format!("{DEFAULT_SCHEME}{url}")
    }
}

fn substitute_fields(fields: &[KeyValue], substitutor: &mut Substitutor) -> Vec<KeyValue> {
    fields
        .iter()
        .filter(|field| field.enabled)
        .map(|field| KeyValue::new(substitutor.apply(&field.key), substitutor.apply(&field.value)))
        .collect()
}

fn substitute_body(body: &RequestBody, substitutor: &mut Substitutor) -> RequestBody {
    match body {
        RequestBody::None => RequestBody::None,
        RequestBody::Raw { content, language } => RequestBody::Raw {
            content: substitutor.apply(content),
            language: *language,
        },
        RequestBody::UrlEncoded { fields } => RequestBody::UrlEncoded {
            fields: substitute_fields(fields, substitutor),
        },
        RequestBody::FormData { fields } => RequestBody::FormData {
            fields: substitute_fields(fields, substitutor),
        },
    }
}

fn implied_content_type(body: &RequestBody) -> Option<&'static str> {
    match body {
        RequestBody::Raw { language: RawLanguage::Json, .. } => Some(CONTENT_TYPE_JSON),
        RequestBody::Raw { language: RawLanguage::Xml, .. } => Some(CONTENT_TYPE_XML),
        RequestBody::Raw { language: RawLanguage::Text, content } if is_json_content(content) => {
            Some(CONTENT_TYPE_JSON)
        }
        RequestBody::UrlEncoded { .. } => Some(CONTENT_TYPE_FORM),
        _ => None,
    }
}

/// URL the request will target, used for auth domain filtering before the
/// full build. Unknown placeholders are left in place.
pub fn preview_url(template: &RequestTemplate, table: &VariableTable) -> String {
    let mut substitutor = Substitutor::new(table);
    with_default_scheme(substitutor.apply(&template.url))
}

/// Assembles the concrete request for one invocation.
///
/// Headers and params are merged first (an override replaces the base entry
/// in place, otherwise it is appended), then every field is substituted,
/// the default scheme and the body's content type are applied, and finally
/// the auth is attached. Any placeholder left unresolved anywhere fails the
/// whole build with every missing name.
pub fn build(
    template: &RequestTemplate,
    overrides: Option<&TestCaseData>,
    table: &VariableTable,
    auth: Option<&Auth>,
) -> Result<ResolvedRequest, EngineError> {
    let headers = merge_entries(
        &template.headers,
        overrides.and_then(|data| data.headers.as_ref()),
        header_key_eq,
    );
    let params = merge_entries(
        &template.params,
        overrides.and_then(|data| data.params.as_ref()),
        param_key_eq,
    );
    let body = overrides
        .and_then(|data| data.body.as_ref())
        .unwrap_or(&template.body);

    let mut substitutor = Substitutor::new(table);
    let mut request = ResolvedRequest::new(
        template.method,
        with_default_scheme(substitutor.apply(&template.url)),
    );
    request.headers = headers
        .iter()
        .map(|(key, value)| (substitutor.apply(key), substitutor.apply(value)))
        .collect();
    request.params = params
        .iter()
        .map(|(key, value)| (substitutor.apply(key), substitutor.apply(value)))
        .collect();
    request.body = substitute_body(body, &mut substitutor);

    if let Some(content_type) = implied_content_type(&request.body) {
        if request.header(reqwest::header::CONTENT_TYPE.as_str()).is_none() {
            request
                .headers
                .push(("Content-Type".to_string(), content_type.to_string()));
        }
    }

    if let Some(auth) = auth {
        debug_log!("Applying {} auth '{}'", auth.as_str(), auth.id());
        auth.provider().configure(&mut request, &mut substitutor);
    }

    if substitutor.has_unresolved() {
        let names = substitutor.into_unresolved();
        debug_log!(
            "Request '{}' has unresolved variables: {}",
            template.id,
            names.join(", ")
        );
        return Err(EngineError::UnresolvedVariables(names));
    }

    Ok(request)
}
