use crate::core::error::EngineError;
use crate::request::ResolvedRequest;
use crate::resolve::Substitutor;

pub trait AuthProvider: Send + Sync {
    fn auth_type(&self) -> &str;

    /// Checks the stored configuration, independent of any request.
    fn validate(&self) -> Result<(), EngineError>;

    /// Attaches credentials to `request`. Credential values are substituted
    /// through `substitutor`, so unresolved names surface with the request's own.
    fn configure(&self, request: &mut ResolvedRequest, substitutor: &mut Substitutor);
}

pub(super) fn require_field(
    auth_type: &str,
    name: &str,
    field: &str,
    value: &str,
) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::InvalidAuth(format!(
            "{auth_type} auth '{name}' has empty '{field}' field"
        )));
    }
    Ok(())
}
