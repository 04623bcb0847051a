//! Signup Review Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use gamesales_types::{SignupRequest, SignupRequestId};
use tracing::info;

use crate::dto::RejectSignupRequest;
use crate::error::ApiResult;
use crate::extractors::{RequireMaster, ValidatedJson};
use crate::state::AppState;

/// Requests awaiting review
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
    RequireMaster(_session): RequireMaster,
) -> ApiResult<Json<Vec<SignupRequest>>> {
    Ok(Json(state.store.pending_signups().await?))
}

/// Approve a request and the applicant's profile
pub async fn approve(
    State(state): State<Arc<AppState>>,
    RequireMaster(session): RequireMaster,
    Path(id): Path<SignupRequestId>,
) -> ApiResult<Json<SignupRequest>> {
    let request = state.store.approve_signup(id, session.user_id()).await?;
    state.views.invalidate();

    info!(signup_id = %id, user_id = %request.user_id, reviewer = %session.user_id(), "Signup approved");
    metrics::counter!("gamesales_signups_reviewed_total", "outcome" => "approved").increment(1);
    Ok(Json(request))
}

/// Reject a request with an optional reason
pub async fn reject(
    State(state): State<Arc<AppState>>,
    RequireMaster(session): RequireMaster,
    Path(id): Path<SignupRequestId>,
    ValidatedJson(req): ValidatedJson<RejectSignupRequest>,
) -> ApiResult<Json<SignupRequest>> {
    let reason = req.reason.filter(|r| !r.trim().is_empty());
    let request = state.store.reject_signup(id, session.user_id(), reason).await?;

    info!(signup_id = %id, reviewer = %session.user_id(), "Signup rejected");
    metrics::counter!("gamesales_signups_reviewed_total", "outcome" => "rejected").increment(1);
    Ok(Json(request))
}
