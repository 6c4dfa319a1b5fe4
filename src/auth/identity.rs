//! Authenticated user identity

use serde::{Deserialize, Serialize};

/// An authenticated GitHub user
///
/// Only built after the provider has exchanged the authorization code and
/// answered the profile lookup. Lives for a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Bearer token issued by the provider
    pub access_token: String,
    /// Refresh token, when the provider issues one (unused)
    pub refresh_token: Option<String>,
    /// Provider profile, passed through unmodified
    pub profile: serde_json::Value,
}

impl Identity {
    /// GitHub login name, if the profile carries one
    pub fn login(&self) -> Option<&str> {
        self.profile.get("login").and_then(|login| login.as_str())
    }
}
