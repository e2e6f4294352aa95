use super::auth_provider::{require_field, AuthProvider};
use crate::core::error::EngineError;
use crate::model::{ApiKeyAuth, ApiKeyLocation};
use crate::request::ResolvedRequest;
use crate::resolve::Substitutor;

impl AuthProvider for ApiKeyAuth {
    fn auth_type(&self) -> &str {
        "api_key"
    }

    fn validate(&self) -> Result<(), EngineError> {
        require_field("API key", &self.common.name, "key", &self.key)
    }

    fn configure(&self, request: &mut ResolvedRequest, substitutor: &mut Substitutor) {
        let key = substitutor.apply(&self.key);
        let value = substitutor.apply(&self.value);
        match self.add_to {
            ApiKeyLocation::Header => request.set_header(&key, value),
            ApiKeyLocation::Query => {
                match request.params.iter_mut().find(|(existing, _)| *existing == key) {
                    Some(param) => param.1 = value,
                    None => request.params.push((key, value)),
                }
            }
        }
    }
}
