//! Admin credential configuration.
//!
//! Two forms are accepted and may be combined: a single `admin_token` (easy to
//! supply as `LUDO_AUTH__ADMIN_TOKEN`) and a `tokens` list in TOML for several
//! operators with explicit roles.

use serde::{Deserialize, Serialize};

fn default_admin_user() -> String {
    "admin".to_string()
}

/// One bearer token and the identity it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenEntry {
    pub token: String,
    pub user_id: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Bearer token granting the admin role to `admin_user`.
    #[serde(default)]
    pub admin_token: String,

    /// Operator id recorded as `exportedBy` for `admin_token`.
    #[serde(default = "default_admin_user")]
    pub admin_user: String,

    #[serde(default)]
    pub tokens: Vec<TokenEntry>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_token: String::new(),
            admin_user: default_admin_user(),
            tokens: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// At least one credential is configured.
    pub fn is_configured(&self) -> bool {
        !self.admin_token.is_empty() || self.tokens.iter().any(|t| !t.token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = AuthConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.admin_user, "admin");
    }

    #[test]
    fn token_list_counts_as_configured() {
        let config = AuthConfig {
            tokens: vec![TokenEntry {
                token: "t-1".into(),
                user_id: "ops".into(),
                roles: vec!["admin".into()],
            }],
            ..Default::default()
        };
        assert!(config.is_configured());
    }
}
