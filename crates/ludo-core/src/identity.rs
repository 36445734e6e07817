use serde::{Deserialize, Serialize};

/// Role name that grants access to the admin panel, backup, and restore.
pub const ADMIN_ROLE: &str = "admin";

/// Lightweight authenticated caller identity for cross-crate passing.
///
/// Produced by `ludo-auth`, consumed by `ludo-server` and `ludo-db`.
/// Carries data only; verification happens in `ludo-auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    /// Stable operator identifier; recorded as `exportedBy` and audit actor.
    pub user_id: String,
    /// Role names granted to the caller (e.g. `"admin"`, `"buyer"`).
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AuthIdentity {
    #[must_use]
    pub fn new(user_id: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}
