use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use ludo_core::identity::AuthIdentity;

use crate::AppState;
use crate::error::ApiError;

/// A caller verified to hold the admin role.
///
/// Extracted from request headers only, so handlers that take it reject
/// unauthorized callers before any body is read.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub AuthIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let identity = ludo_auth::authorize_admin(state.verifier.as_ref(), header)?;
        Ok(Self(identity))
    }
}
