use std::future::Future;

use crate::errors::ApiError;

/// What the identity provider hands back after a sign-in. Session
/// persistence and token refresh are the provider's responsibility.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Identity {
    /// Name to show in owner slots: display name if present, else email.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Opaque identity source (OAuth provider, test double, ...).
pub trait IdentityProvider {
    fn sign_in(&self) -> impl Future<Output = Result<Identity, ApiError>> + Send;
}
