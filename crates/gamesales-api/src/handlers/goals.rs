//! Goal Handlers

use axum::{extract::State, http::StatusCode, Json};
use rust_decimal::Decimal;
use std::sync::Arc;

use gamesales_engine::{goal_board, goal_progress, GoalBoard, TierRetention};
use gamesales_types::{GoalDefinition, NewGoal};
use tracing::info;

use crate::dto::CreateGoalRequest;
use crate::error::ApiResult;
use crate::extractors::{RequireStaff, SessionUser, ValidatedJson};
use crate::state::AppState;

/// Boards for every active goal, newest first
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    SessionUser(_session): SessionUser,
) -> ApiResult<Json<Vec<GoalBoard>>> {
    let goals = state.store.active_goals().await?;
    if goals.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let participants = state.store.approved_seller_count().await?;

    let mut boards = Vec::with_capacity(goals.len());
    for goal in &goals {
        let (start, end) = goal.window();
        let team_total: Decimal = state
            .store
            .approved_sales_between(start, end)
            .await?
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.amount));

        let percent = goal_progress(team_total, goal.target_amount).percent;
        let high_water = match state.settings.tier_retention {
            TierRetention::HighWaterMark => state.views.observe_goal(goal.id, percent),
            TierRetention::Live => None,
        };

        boards.push(goal_board(
            goal,
            team_total,
            participants,
            state.settings.tier_retention,
            high_water,
        ));
    }

    Ok(Json(boards))
}

/// Create a goal, replacing the active goal of the same period kind
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    RequireStaff(session): RequireStaff,
    ValidatedJson(req): ValidatedJson<CreateGoalRequest>,
) -> ApiResult<(StatusCode, Json<GoalDefinition>)> {
    let new_goal = NewGoal::from(req);
    new_goal.validate()?;

    let goal = state.store.create_goal(new_goal).await?;
    info!(
        goal_id = %goal.id,
        period = goal.period_kind.as_db_str(),
        target = %goal.target_amount,
        created_by = %session.user_id(),
        "Goal created"
    );

    Ok((StatusCode::CREATED, Json(goal)))
}
