use super::auth_provider::{require_field, AuthProvider};
use crate::core::error::EngineError;
use crate::model::DigestAuth;
use crate::request::ResolvedRequest;
use crate::resolve::Substitutor;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref CHALLENGE_PARAM: Regex =
        Regex::new(r#"([A-Za-z0-9_-]+)\s*=\s*(?:"([^"]*)"|([^\s,]+))"#).unwrap();
}

/// Substituted credentials carried on a request until the server challenges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestCredentials {
    pub username: String,
    pub password: String,
}

/// Parameters of a `WWW-Authenticate: Digest ...` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub qop: Option<String>,
    pub opaque: Option<String>,
    pub algorithm: Option<String>,
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
}

impl DigestChallenge {
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let scheme_len = "digest".len();
        let rest = match header.get(..scheme_len) {
            Some(scheme) if scheme.eq_ignore_ascii_case("digest") => &header[scheme_len..],
            _ => return None,
        };

        let params: HashMap<String, String> = CHALLENGE_PARAM
            .captures_iter(rest)
            .map(|caps| {
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                (caps[1].to_ascii_lowercase(), value)
            })
            .collect();

        Some(DigestChallenge {
            realm: params.get("realm").cloned().unwrap_or_default(),
            nonce: params.get("nonce")?.clone(),
            qop: params.get("qop").cloned(),
            opaque: params.get("opaque").cloned(),
            algorithm: params.get("algorithm").cloned(),
        })
    }

    fn supports_qop_auth(&self) -> bool {
        self.qop
            .as_deref()
            .is_some_and(|qop| qop.split(',').any(|q| q.trim().eq_ignore_ascii_case("auth")))
    }

    /// Builds the `Authorization` value answering this challenge (MD5).
    pub fn authorization(
        &self,
        credentials: &DigestCredentials,
        method: &str,
        uri: &str,
        cnonce: &str,
        nonce_count: u32,
    ) -> String {
        let ha1 = md5_hex(&format!(
            "{}:{}:{}",
            credentials.username, self.realm, credentials.password
        ));
        let ha2 = md5_hex(&format!("{method}:{uri}"));
        let nc = format!("{nonce_count:08x}");

        let mut header = format!(
            r#"Digest username="{}", realm="{}", nonce="{}", uri="{uri}", algorithm=MD5"#,
            credentials.username, self.realm, self.nonce
        );

        let response = if self.supports_qop_auth() {
            header.push_str(&format!(r#", qop=auth, nc={nc}, cnonce="{cnonce}""#));
            md5_hex(&format!("{ha1}:{}:{nc}:{cnonce}:auth:{ha2}", self.nonce))
        } else {
            md5_hex(&format!("{ha1}:{}:{ha2}", self.nonce))
        };
        header.push_str(&format!(r#", response="{response}""#));

        if let Some(opaque) = &self.opaque {
            header.push_str(&format!(r#", opaque="{opaque}""#));
        }
        header
    }
}

impl AuthProvider for DigestAuth {
    fn auth_type(&self) -> &str {
        "digest"
    }

    fn validate(&self) -> Result<(), EngineError> {
        require_field("Digest", &self.common.name, "username", &self.username)
    }

    fn configure(&self, request: &mut ResolvedRequest, substitutor: &mut Substitutor) {
        request.digest = Some(DigestCredentials {
            username: substitutor.apply(&self.username),
            password: substitutor.apply(&self.password),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfc_challenge() -> DigestChallenge {
        DigestChallenge::parse(
            r#"Digest realm="testrealm@host.com", qop="auth,auth-int", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41""#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_challenge() {
        let challenge = rfc_challenge();
        assert_eq!(challenge.realm, "testrealm@host.com");
        assert_eq!(challenge.nonce, "dcd98b7102dd2f0e8b11d0f600bfb0c093");
        assert_eq!(challenge.qop.as_deref(), Some("auth,auth-int"));
        assert!(challenge.supports_qop_auth());
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!(DigestChallenge::parse(r#"Basic realm="x""#).is_none());
        assert!(DigestChallenge::parse(r#"Digest realm="x""#).is_none());
    }

    #[test]
    fn test_authorization_matches_rfc_2617_example() {
        let credentials = DigestCredentials {
            username: "Mufasa".into(),
            password: "Circle Of Life".into(),
        };
        let header = rfc_challenge().authorization(
            &credentials,
            "GET",
            "/dir/index.html",
            "0a4f113b",
            1,
        );
        assert!(header.contains(r#"response="6629fae49393a05397450978507c4ef1""#));
        assert!(header.contains("nc=00000001"));
        assert!(header.contains(r#"opaque="5ccc069c403ebaf9f0171e9517f40e41""#));
    }

    #[test]
    fn test_authorization_without_qop() {
        let challenge = DigestChallenge::parse(r#"Digest realm="r", nonce=abc"#).unwrap();
        let credentials = DigestCredentials {
            username: "u".into(),
            password: "p".into(),
        };
        let header = challenge.authorization(&credentials, "GET", "/", "c", 1);
        let ha1 = md5_hex("u:r:p");
        let ha2 = md5_hex("GET:/");
        let expected = md5_hex(&format!("{ha1}:abc:{ha2}"));
        assert!(header.contains(&format!(r#"response="{expected}""#)));
        assert!(!header.contains("qop"));
    }
}
