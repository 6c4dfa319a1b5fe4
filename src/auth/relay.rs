//! Authentication relay
//!
//! Drives the two-step redirect handshake:
//! `idle -> awaiting-provider -> authenticated | failed`.
//!
//! The relay owns its strategy and session codec; nothing is registered
//! globally. No timeouts or retries are added on top of the HTTP client.

use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use super::identity::Identity;
use super::session::SessionCodec;
use super::strategy::OAuthStrategy;
use crate::error::AuthError;

/// Where to send the browser to start a login
#[derive(Debug, Clone)]
pub struct RedirectTarget {
    /// Provider authorization URL
    pub url: Url,
    /// CSRF state embedded in `url`, to be bound to the browser
    pub csrf_state: String,
}

/// Query parameters sent by the provider to the callback
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// OAuth relay with an injected strategy and session codec
#[derive(Clone)]
pub struct AuthRelay {
    strategy: Arc<dyn OAuthStrategy>,
    codec: Arc<dyn SessionCodec>,
}

impl AuthRelay {
    pub fn new(strategy: Arc<dyn OAuthStrategy>, codec: Arc<dyn SessionCodec>) -> Self {
        Self { strategy, codec }
    }

    /// Name of the configured provider
    pub fn provider(&self) -> &'static str {
        self.strategy.name()
    }

    /// Start a login: build the provider redirect with a fresh CSRF state
    pub fn begin_login(&self) -> RedirectTarget {
        let (url, csrf_state) = self.strategy.authorize_url();

        RedirectTarget {
            url,
            csrf_state: csrf_state.secret().clone(),
        }
    }

    /// Complete a login from the provider's callback
    ///
    /// # Steps
    /// 1. Reject provider-reported errors
    /// 2. Verify the CSRF state against the one bound to the browser
    /// 3. Exchange the code for tokens
    /// 4. Fetch the profile
    /// 5. Round-trip the identity through the session codec
    ///
    /// # Errors
    /// Any failure of the above; callers redirect back to `/login`.
    pub async fn handle_callback(
        &self,
        params: CallbackParams,
        expected_state: Option<&str>,
    ) -> Result<Identity, AuthError> {
        if let Some(error) = params.error {
            return Err(AuthError::Denied {
                error,
                description: params.error_description,
            });
        }

        match (expected_state, params.state.as_deref()) {
            (Some(expected), Some(received)) if expected == received => {}
            _ => return Err(AuthError::StateMismatch),
        }

        let code = params
            .code
            .filter(|code| !code.is_empty())
            .ok_or(AuthError::MissingCode)?;

        let grant = self.strategy.exchange_code(&code).await?;
        let profile = self.strategy.fetch_profile(&grant.access_token).await?;

        let identity = Identity {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            profile,
        };

        tracing::debug!(
            provider = self.strategy.name(),
            login = identity.login().unwrap_or("unknown"),
            "OAuth identity established"
        );

        let record = self.codec.serialize(identity);
        Ok(self.codec.deserialize(record))
    }
}
