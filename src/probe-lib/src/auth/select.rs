use crate::debug_log;
use crate::model::Auth;
use chrono::{DateTime, Utc};

/// Reduces a filter such as `https://API.example.com:8443/v1` to `api.example.com`.
fn normalize_filter(filter: &str) -> String {
    let filter = filter.trim().to_ascii_lowercase();
    let without_scheme = match filter.split_once("://") {
        Some((_, rest)) => rest,
        None => filter.as_str(),
    };
    let host = without_scheme.split('/').next().unwrap_or_default();
    host.split(':').next().unwrap_or_default().to_string()
}

fn host_matches(host: &str, filter: &str) -> bool {
    match filter.strip_prefix("*.") {
        Some(suffix) => host.ends_with(&format!(".{suffix}")),
        None => host == filter || host.ends_with(&format!(".{filter}")),
    }
}

/// Whether a credential restricted to `filters` may be sent to `target_url`.
/// An empty list applies everywhere; an unparsable URL matches nothing.
pub fn domain_allowed(filters: &[String], target_url: &str) -> bool {
    let filters: Vec<String> = filters
        .iter()
        .map(|filter| normalize_filter(filter))
        .filter(|filter| !filter.is_empty())
        .collect();
    if filters.is_empty() {
        return true;
    }

    let Some(host) = reqwest::Url::parse(target_url)
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_ascii_lowercase()))
    else {
        return false;
    };

    filters.iter().any(|filter| host_matches(&host, filter))
}

pub fn select<'a>(
    request_auth_id: Option<&str>,
    default_auth_id: Option<&str>,
    case_auth_id: Option<&str>,
    auths: &'a [Auth],
    target_url: &str,
) -> Option<&'a Auth> {
    select_at(
        request_auth_id,
        default_auth_id,
        case_auth_id,
        auths,
        target_url,
        Utc::now(),
    )
}

/// Picks the credential for one invocation: test case over item over suite
/// default. The winner must be enabled, unexpired and allowed for the target
/// host, otherwise no auth is applied at all.
pub fn select_at<'a>(
    request_auth_id: Option<&str>,
    default_auth_id: Option<&str>,
    case_auth_id: Option<&str>,
    auths: &'a [Auth],
    target_url: &str,
    now: DateTime<Utc>,
) -> Option<&'a Auth> {
    let auth_id = [case_auth_id, request_auth_id, default_auth_id]
        .into_iter()
        .flatten()
        .find(|id| !id.is_empty())?;

    let Some(auth) = auths.iter().find(|auth| auth.id() == auth_id) else {
        debug_log!("Auth '{auth_id}' not found, sending without auth");
        return None;
    };

    let common = auth.common();
    if !common.enabled {
        debug_log!("Auth '{auth_id}' is disabled");
        return None;
    }
    if common.is_expired(now) {
        debug_log!("Auth '{auth_id}' expired");
        return None;
    }
    if !domain_allowed(&common.domain_filters, target_url) {
        debug_log!("Auth '{auth_id}' does not apply to {target_url}");
        return None;
    }

    Some(auth)
}
