//! Progression Handlers
//!
//! Read-only pages for an approved user: dashboard, rankings, race,
//! achievements and missions.

use axum::{extract::State, Json};
use std::sync::Arc;

use gamesales_engine::leaderboard::{leaderboard, position_of};
use gamesales_engine::{achievement_board, dashboard, missions_board, AchievementBoard, Dashboard};
use gamesales_engine::{MissionProgress, RaceView};

use crate::dto::RankingsResponse;
use crate::error::ApiResult;
use crate::extractors::SessionUser;
use crate::state::AppState;

/// Dashboard for the session user
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
) -> ApiResult<Json<Dashboard>> {
    let views = state.views.current(state.store.as_ref(), &state.settings.race).await?;
    Ok(Json(dashboard(&session, &state.levels, &views.ranked)))
}

/// Top of the leaderboard plus the caller's position
pub async fn get_rankings(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
) -> ApiResult<Json<RankingsResponse>> {
    let views = state.views.current(state.store.as_ref(), &state.settings.race).await?;
    let my_position = position_of(&views.ranked, session.user_id());
    let total_ranked = views.ranked.len();

    Ok(Json(RankingsResponse {
        entries: leaderboard(views.ranked, state.settings.leaderboard_limit),
        total_ranked,
        my_position,
    }))
}

/// This month's race
pub async fn get_race(
    State(state): State<Arc<AppState>>,
    SessionUser(_session): SessionUser,
) -> ApiResult<Json<RaceView>> {
    let views = state.views.current(state.store.as_ref(), &state.settings.race).await?;
    Ok(Json(views.race))
}

/// Achievement catalog with the caller's unlocks
pub async fn get_achievements(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
) -> ApiResult<Json<AchievementBoard>> {
    let catalog = state.store.achievements().await?;
    let unlocks = state.store.unlocks_for(session.user_id()).await?;
    Ok(Json(achievement_board(&catalog, &unlocks)))
}

/// Active missions with the caller's progress
pub async fn get_missions(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
) -> ApiResult<Json<Vec<MissionProgress>>> {
    let user_id = session.user_id();
    let missions = state
        .store
        .active_missions_for(user_id, session.profile.team_id)
        .await?;

    let window = missions.iter().fold(None, |acc, m| match acc {
        None => Some((m.starts_at, m.ends_at)),
        Some((start, end)) => Some((m.starts_at.min(start), m.ends_at.max(end))),
    });
    let sales = match window {
        Some((start, end)) => state.store.seller_sales_between(user_id, start, end).await?,
        None => Vec::new(),
    };

    Ok(Json(missions_board(&missions, user_id, &sales)))
}
