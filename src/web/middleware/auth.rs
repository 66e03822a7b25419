//! HTTP Basic authentication middleware.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// The authenticated username.
///
/// Inserted into request extensions by [`basic_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Missing authorization"))
    }
}

/// Reject requests without valid Basic credentials.
///
/// Runs before the handler, so a rejected request never reaches the store.
/// Password hashing is CPU bound and runs on the blocking pool.
pub async fn basic_auth(
    State(state): State<Arc<AppState>>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(Authorization(basic))) = credentials else {
        tracing::debug!(path = %request.uri().path(), "Missing Basic credentials");
        return Err(ApiError::challenge(&state.realm, "Missing credentials"));
    };

    let username = basic.username().to_string();
    let password = basic.password().to_string();
    let verifier = state.verifier.clone();
    let candidate = username.clone();

    let verified = tokio::task::spawn_blocking(move || verifier.verify(&candidate, &password))
        .await
        .map_err(|e| {
            tracing::error!("Credential verification task failed: {}", e);
            ApiError::internal("Credential verification failed")
        })?;

    if !verified {
        tracing::warn!(username = %username, "Rejected credentials");
        return Err(ApiError::challenge(&state.realm, "Invalid credentials"));
    }

    request.extensions_mut().insert(AuthUser(username));
    Ok(next.run(request).await)
}
