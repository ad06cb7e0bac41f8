//! API handlers for Biblioteca REST endpoints

pub mod books;
pub mod categories;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod stats;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, services::auth::CallerIdentity, AppState};

/// Generic message response for delete endpoints
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Authentication("Invalid authorization header format".to_string())
    })
}

/// Extractor for an authenticated caller.
///
/// Verifies the bearer token and resolves the local user record,
/// auto-provisioning one on first contact.
pub struct Caller(pub CallerIdentity);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.services.auth.verify_token(token)?;
        let caller = state.services.auth.resolve_caller(&claims).await?;
        Ok(Caller(caller))
    }
}

/// Extractor for an authenticated caller holding the admin role
pub struct AdminCaller(pub CallerIdentity);

#[async_trait]
impl FromRequestParts<AppState> for AdminCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Caller(caller) = Caller::from_request_parts(parts, state).await?;
        state.services.auth.require_admin(&caller)?;
        Ok(AdminCaller(caller))
    }
}

/// Extractor that never fails: `None` when no usable token is supplied.
///
/// For public endpoints with a personalized variant.
pub struct OptionalCaller(pub Option<CallerIdentity>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalCaller {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalCaller(
            Caller::from_request_parts(parts, state)
                .await
                .ok()
                .map(|Caller(caller)| caller),
        ))
    }
}
