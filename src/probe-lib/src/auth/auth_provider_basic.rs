use super::auth_provider::{require_field, AuthProvider};
use crate::core::error::EngineError;
use crate::model::BasicAuth;
use crate::request::ResolvedRequest;
use crate::resolve::Substitutor;
use base64::{engine::general_purpose::STANDARD, Engine as _};

impl AuthProvider for BasicAuth {
    fn auth_type(&self) -> &str {
        "basic"
    }

    fn validate(&self) -> Result<(), EngineError> {
        require_field("Basic", &self.common.name, "username", &self.username)
    }

    fn configure(&self, request: &mut ResolvedRequest, substitutor: &mut Substitutor) {
        let username = substitutor.apply(&self.username);
        let password = substitutor.apply(&self.password);
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        request.set_header(
            reqwest::header::AUTHORIZATION.as_str(),
            format!("Basic {encoded}"),
        );
    }
}
