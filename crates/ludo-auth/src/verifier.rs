//! Bearer-token verification.
//!
//! Tokens come from configuration and are kept only as SHA-256 digests, so a
//! memory dump or debug print of the verifier never reveals a usable secret.

use std::collections::HashMap;
use std::fmt;

use ludo_config::AuthConfig;
use ludo_core::identity::{ADMIN_ROLE, AuthIdentity};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// Resolves a presented bearer token to the identity it belongs to.
pub trait TokenVerifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is unknown.
    fn verify(&self, token: &str) -> Result<AuthIdentity, AuthError>;
}

/// Hex-encoded SHA-256 of a token.
#[must_use]
pub fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Verifier over a fixed set of configured tokens.
#[derive(Default, Clone)]
pub struct StaticTokenVerifier {
    identities: HashMap<String, AuthIdentity>,
}

impl StaticTokenVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `identity`. Empty tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: &str, identity: AuthIdentity) -> Self {
        if !token.is_empty() {
            self.identities.insert(digest(token), identity);
        }
        self
    }

    /// Build from the `auth` config section.
    ///
    /// `admin_token` maps to `admin_user` with the admin role; each `tokens`
    /// entry maps to its own user and roles.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let verifier = Self::new().with_token(
            &config.admin_token,
            AuthIdentity::new(config.admin_user.as_str(), [ADMIN_ROLE]),
        );
        config.tokens.iter().fold(verifier, |verifier, entry| {
            verifier.with_token(
                &entry.token,
                AuthIdentity::new(entry.user_id.as_str(), entry.roles.iter().map(String::as_str)),
            )
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl fmt::Debug for StaticTokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenVerifier")
            .field("tokens", &self.identities.len())
            .finish()
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<AuthIdentity, AuthError> {
        self.identities
            .get(&digest(token))
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
