use thiserror::Error;

/// Every variant is answered with HTTP 401 and is never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credentials: send `Authorization: Bearer <token>`")]
    MissingCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("user '{0}' is not an admin")]
    NotAdmin(String),
}
