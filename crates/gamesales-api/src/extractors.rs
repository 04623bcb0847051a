//! Custom Extractors
//!
//! Session and body extractors for handlers. Authentication happens
//! upstream; requests arrive with the authenticated user's id in the
//! `X-User-Id` header and the profile is loaded fresh on every request.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use gamesales_types::{Session, UserId};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{format_validation_errors, ApiError};
use crate::state::AppState;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

fn error_response(err: ApiError) -> Response {
    err.into_response()
}

// =============================================================================
// Session Extractors
// =============================================================================

/// An approved user
#[derive(Debug, Clone)]
pub struct SessionUser(pub Session);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| UserId::parse(v.trim()).ok())
            .ok_or_else(|| error_response(ApiError::Unauthorized))?;

        let profile = state
            .store
            .profile(user_id)
            .await
            .map_err(|e| error_response(e.into()))?
            .ok_or_else(|| error_response(ApiError::Unauthorized))?;

        let session = Session::new(profile);
        if !session.is_approved() {
            tracing::debug!(%user_id, "Rejected request from unapproved user");
            return Err(error_response(ApiError::AwaitingApproval));
        }

        Ok(SessionUser(session))
    }
}

/// An approved MASTER or MANAGER
#[derive(Debug, Clone)]
pub struct RequireStaff(pub Session);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireStaff {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let SessionUser(session) = SessionUser::from_request_parts(parts, state).await?;
        if !session.can_manage() {
            return Err(error_response(ApiError::Forbidden(
                "management access required".to_string(),
            )));
        }
        Ok(RequireStaff(session))
    }
}

/// An approved MASTER
#[derive(Debug, Clone)]
pub struct RequireMaster(pub Session);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireMaster {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let SessionUser(session) = SessionUser::from_request_parts(parts, state).await?;
        if !session.is_master() {
            return Err(error_response(ApiError::Forbidden(
                "master access required".to_string(),
            )));
        }
        Ok(RequireMaster(session))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// JSON body that has passed `validator` checks
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Response;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| error_response(ApiError::BadRequest(e.body_text())))?;

        value.validate().map_err(|e| {
            error_response(ApiError::ValidationError(format_validation_errors(&e)))
        })?;

        Ok(ValidatedJson(value))
    }
}
