//! # ludo-auth
//!
//! Admin authorization for the snapshot endpoints.
//!
//! Both `POST /admin/backup` and `POST /admin/restore` require a bearer token
//! that resolves to an identity holding the `admin` role.

pub mod error;
pub mod verifier;

pub use error::AuthError;
pub use verifier::{StaticTokenVerifier, TokenVerifier};

use ludo_core::identity::AuthIdentity;

/// Extract the token from an `Authorization: Bearer <token>` header value.
///
/// # Errors
///
/// `AuthError::MissingCredentials` if the header is absent, uses another
/// scheme, or carries an empty token.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.ok_or(AuthError::MissingCredentials)?.trim();
    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::MissingCredentials)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}

/// Fail unless `identity` holds the admin role.
///
/// # Errors
///
/// `AuthError::NotAdmin` naming the caller.
pub fn require_admin(identity: AuthIdentity) -> Result<AuthIdentity, AuthError> {
    if identity.is_admin() {
        Ok(identity)
    } else {
        tracing::warn!(user_id = %identity.user_id, "admin endpoint refused");
        Err(AuthError::NotAdmin(identity.user_id))
    }
}

/// Resolve an `Authorization` header to an admin identity.
///
/// # Errors
///
/// Any `AuthError`; all of them mean HTTP 401.
pub fn authorize_admin(
    verifier: &dyn TokenVerifier,
    authorization: Option<&str>,
) -> Result<AuthIdentity, AuthError> {
    let token = bearer_token(authorization)?;
    require_admin(verifier.verify(token)?)
}
