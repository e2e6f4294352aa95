mod auth_provider;
mod auth_provider_api_key;
mod auth_provider_basic;
mod auth_provider_digest;
mod auth_provider_oauth2_refresh;
mod select;

pub use auth_provider::AuthProvider;
pub use auth_provider_digest::{DigestChallenge, DigestCredentials};
pub use select::{domain_allowed, select, select_at};

use crate::model::Auth;

impl Auth {
    pub fn provider(&self) -> &dyn AuthProvider {
        match self {
            Auth::ApiKey(auth) => auth,
            Auth::Basic(auth) => auth,
            Auth::Digest(auth) => auth,
            Auth::OAuth2Refresh(auth) => auth,
        }
    }
}
