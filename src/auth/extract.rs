//! Request authentication extractor.
//!
//! Handlers take [`AuthUser`] as an argument; extraction fails with a 401
//! before the handler body runs when the bearer token is missing or bad.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use super::token::TokenService;
use crate::error::ErrorCode;
use crate::rbac::{AccessContext, Role};

/// Authentication rejection, mapped onto 401 responses.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication credentials")]
    MissingCredentials,

    #[error("Invalid authentication token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::MissingCredentials => "Authentication credentials are required",
            Self::InvalidToken => "The provided token is invalid",
            Self::TokenExpired => "The authentication token has expired",
        };

        let body = json!({ "success": false, "message": message });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// The authenticated caller, decoded from the bearer token.
///
/// An unrecognized role string still authenticates; the decision engine
/// denies it downstream.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub context: AccessContext,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer ").or_else(|| s.strip_prefix("bearer ")))
            .ok_or(AuthError::MissingCredentials)?;

        let claims = tokens.verify(token).map_err(|e| match e.code() {
            ErrorCode::TokenExpired => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            context: AccessContext::new(claims.sub, Role::parse(&claims.role), claims.org_id),
        })
    }
}
