//! GitHub OAuth authentication
//!
//! Handles:
//! - GitHub OAuth flow
//! - Identity construction from the provider's answer
//! - Session codec (pass-through)

mod identity;
mod oauth;
mod relay;
pub mod session;
pub mod strategy;

pub use identity::Identity;
pub use oauth::auth_router;
pub use relay::{AuthRelay, CallbackParams, RedirectTarget};
pub use session::{PassThroughCodec, SessionCodec};
pub use strategy::{GitHubStrategy, OAuthStrategy, TokenGrant};
