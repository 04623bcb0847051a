//! API Integration Tests
//!
//! Full request/response cycles against the in-memory demo store.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use gamesales_api::dto::{RankingsResponse, RecordSaleResponse};
use gamesales_api::{create_test_router, AppState, ErrorResponse, USER_ID_HEADER};
use gamesales_db::{MemoryStore, SalesStore};
use gamesales_engine::{Dashboard, EngineSettings, GoalBoard, Medal, RaceView, TierRetention};
use gamesales_types::{Sale, SaleStatus, SignupRequest, SignupStatus, UserId};
use rust_decimal_macros::dec;
use serde_json::json;

// =============================================================================
// Helpers
// =============================================================================

fn setup() -> (TestServer, Arc<AppState>) {
    setup_with(EngineSettings::default())
}

fn setup_with(settings: EngineSettings) -> (TestServer, Arc<AppState>) {
    let store: Arc<dyn SalesStore> = Arc::new(MemoryStore::demo());
    let state = Arc::new(AppState::new(store, settings).unwrap());
    let server = TestServer::new(create_test_router(state.clone())).unwrap();
    (server, state)
}

async fn user(state: &AppState, name: &str) -> UserId {
    state
        .store
        .approved_profiles()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.display_name == name)
        .map(|p| p.id)
        .unwrap()
}

fn as_user(id: UserId) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(USER_ID_HEADER),
        HeaderValue::from_str(&id.as_uuid().to_string()).unwrap(),
    )
}

// =============================================================================
// Health & Session
// =============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let (server, _) = setup();
    server.get("/health").await.assert_status_ok();

    let ready = server.get("/ready").await;
    ready.assert_status_ok();
    assert_eq!(ready.json::<serde_json::Value>()["backend"], "memory");
}

#[tokio::test]
async fn test_missing_or_unknown_user_is_unauthorized() {
    let (server, _) = setup();

    server
        .get("/api/v1/dashboard")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let (name, value) = as_user(UserId::new());
    server
        .get("/api/v1/dashboard")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/v1/dashboard")
        .add_header(
            HeaderName::from_static(USER_ID_HEADER),
            HeaderValue::from_static("not-a-uuid"),
        )
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unapproved_user_awaits_approval() {
    let (server, state) = setup();
    let pending = state.store.pending_signups().await.unwrap();
    let (name, value) = as_user(pending[0].user_id);

    let response = server.get("/api/v1/rankings").add_header(name, value).await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<ErrorResponse>().code, "AWAITING_APPROVAL");
}

// =============================================================================
// Progression Pages
// =============================================================================

#[tokio::test]
async fn test_rankings() {
    let (server, state) = setup();
    let bruno = user(&state, "Bruno Lima").await;
    let (name, value) = as_user(bruno);

    let response = server.get("/api/v1/rankings").add_header(name, value).await;
    response.assert_status_ok();
    let rankings: RankingsResponse = response.json();

    assert_eq!(rankings.total_ranked, 6);
    assert_eq!(rankings.entries[0].entry.display_name, "Ana Souza");
    assert_eq!(rankings.entries[0].medal, Some(Medal::Gold));
    // Bruno and Carla tie on points and keep query order
    assert_eq!(rankings.entries[1].entry.display_name, "Bruno Lima");
    assert_eq!(rankings.entries[2].entry.display_name, "Carla Dias");
    assert_eq!(rankings.entries[3].medal, None);
    assert_eq!(rankings.my_position, Some(2));
}

#[tokio::test]
async fn test_race() {
    let (server, state) = setup();
    let (name, value) = as_user(user(&state, "Carla Dias").await);

    let response = server.get("/api/v1/race").add_header(name, value).await;
    response.assert_status_ok();
    let race: RaceView = response.json();

    let markers = race.markers();
    assert_eq!(markers.len(), 3);
    assert!(markers[0].leader);
    assert_eq!(markers[0].participant.display_name, "Ana Souza");
    assert_eq!(markers[0].position, dec!(80));
    assert!(markers.iter().all(|m| m.position >= dec!(10) && m.position <= dec!(80)));
}

#[tokio::test]
async fn test_dashboard() {
    let (server, state) = setup();
    let (name, value) = as_user(user(&state, "Ana Souza").await);

    let response = server.get("/api/v1/dashboard").add_header(name, value).await;
    response.assert_status_ok();
    let dashboard: Dashboard = response.json();

    assert_eq!(dashboard.total_points, 1450);
    assert_eq!(dashboard.stored_level, 6);
    assert_eq!(dashboard.derived_level, 6);
    assert!(!dashboard.level_stale);
    assert_eq!(dashboard.ranking_position, Some(1));
}

#[tokio::test]
async fn test_goals_board() {
    let (server, state) = setup();
    let (name, value) = as_user(user(&state, "Diego Alves").await);

    let response = server.get("/api/v1/goals").add_header(name, value).await;
    response.assert_status_ok();
    let boards: Vec<GoalBoard> = response.json();

    assert_eq!(boards.len(), 1);
    let board = &boards[0];
    assert_eq!(board.team_total, dec!(9250));
    assert_eq!(board.participant_count, 4);
    assert_eq!(board.individual_target, dec!(7500));
    assert!(!board.goal_reached);
    let unlocked: Vec<bool> = board.tiers.iter().map(|t| t.unlocked).collect();
    assert_eq!(unlocked, vec![false, false, false]);
}

#[tokio::test]
async fn test_achievements_and_missions() {
    let (server, state) = setup();
    let ana = user(&state, "Ana Souza").await;

    let (name, value) = as_user(ana);
    let response = server.get("/api/v1/achievements").add_header(name, value).await;
    response.assert_status_ok();
    let board: serde_json::Value = response.json();
    assert_eq!(board["unlocked_count"], 1);
    assert_eq!(board["total"], 2);

    let (name, value) = as_user(ana);
    let response = server.get("/api/v1/missions").add_header(name, value).await;
    response.assert_status_ok();
    let missions: Vec<serde_json::Value> = response.json();
    assert_eq!(missions.len(), 1);
    assert_eq!(missions[0]["completed"], false);
}

// =============================================================================
// Sales
// =============================================================================

#[tokio::test]
async fn test_record_sale_credits_points_and_levels_up() {
    let (server, state) = setup();
    let diego = user(&state, "Diego Alves").await;

    let (name, value) = as_user(diego);
    let response = server
        .post("/api/v1/sales")
        .add_header(name, value)
        .json(&json!({ "production": "1000", "setup": "100", "customer": "Padaria Central" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let recorded: RecordSaleResponse = response.json();

    assert_eq!(recorded.sale.amount, dec!(1100));
    assert_eq!(recorded.sale.status, SaleStatus::Approved);
    assert_eq!(recorded.points_awarded, 110);
    assert!(!recorded.pending_approval);
    let change = recorded.level_change.unwrap();
    assert_eq!((change.from, change.to), (1, 2));

    let (name, value) = as_user(diego);
    let dashboard: Dashboard = server
        .get("/api/v1/dashboard")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(dashboard.total_points, 200);
    assert_eq!(dashboard.stored_level, 2);
    assert!(!dashboard.level_stale);
}

#[tokio::test]
async fn test_recorded_sale_moves_race_and_rankings() {
    let (server, state) = setup();
    let diego = user(&state, "Diego Alves").await;

    // Prime the cache before the write
    let (name, value) = as_user(diego);
    server.get("/api/v1/race").add_header(name, value).await.assert_status_ok();

    let (name, value) = as_user(diego);
    server
        .post("/api/v1/sales")
        .add_header(name, value)
        .json(&json!({ "production": 20000 }))
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = as_user(diego);
    let race: RaceView = server.get("/api/v1/race").add_header(name, value).await.json();
    assert_eq!(race.markers()[0].participant.user_id, diego);

    let (name, value) = as_user(diego);
    let rankings: RankingsResponse = server
        .get("/api/v1/rankings")
        .add_header(name, value)
        .await
        .json();
    assert_eq!(rankings.my_position, Some(1));
}

#[tokio::test]
async fn test_record_sale_rejects_invalid_amounts() {
    let (server, state) = setup();
    let diego = user(&state, "Diego Alves").await;

    let (name, value) = as_user(diego);
    let response = server
        .post("/api/v1/sales")
        .add_header(name, value)
        .json(&json!({ "production": "-5" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<ErrorResponse>().code, "VALIDATION_ERROR");

    let (name, value) = as_user(diego);
    server
        .post("/api/v1/sales")
        .add_header(name, value)
        .json(&json!({ "production": "0", "setup": "0" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_record_sale_rejects_oversized_amounts() {
    let (server, state) = setup();
    let diego = user(&state, "Diego Alves").await;

    let (name, value) = as_user(diego);
    server
        .post("/api/v1/sales")
        .add_header(name, value)
        .json(&json!({ "production": "79228162514264337593543950335", "setup": "1" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // Each part fits, the total does not
    let (name, value) = as_user(diego);
    let response = server
        .post("/api/v1/sales")
        .add_header(name, value)
        .json(&json!({ "production": "1000000000", "setup": "1" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<ErrorResponse>().code, "VALIDATION_ERROR");

    let profile = state.store.profile(diego).await.unwrap().unwrap();
    assert_eq!(profile.total_points, 90);
}

#[tokio::test]
async fn test_only_master_records_for_others() {
    let (server, state) = setup();
    let bruno = user(&state, "Bruno Lima").await;
    let carla = user(&state, "Carla Dias").await;
    let master = user(&state, "Marina Master").await;

    let (name, value) = as_user(carla);
    server
        .post("/api/v1/sales")
        .add_header(name, value)
        .json(&json!({ "seller_id": bruno, "production": "500" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let (name, value) = as_user(master);
    let recorded: RecordSaleResponse = server
        .post("/api/v1/sales")
        .add_header(name, value)
        .json(&json!({ "seller_id": bruno, "production": "500" }))
        .await
        .json();
    assert_eq!(recorded.sale.seller_id, bruno);
    assert_eq!(recorded.points_awarded, 50);
}

#[tokio::test]
async fn test_sale_management_requires_staff() {
    let (server, state) = setup();
    let ana = user(&state, "Ana Souza").await;
    let manager = user(&state, "Gustavo Gestor").await;

    let (name, value) = as_user(ana);
    server
        .get("/api/v1/sales")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let (name, value) = as_user(manager);
    let response = server.get("/api/v1/sales").add_header(name, value).await;
    response.assert_status_ok();
    let sales: Vec<Sale> = response.json();
    assert_eq!(sales.len(), 3);
}

#[tokio::test]
async fn test_update_and_cancel_sale() {
    let (server, state) = setup();
    let manager = user(&state, "Gustavo Gestor").await;
    let sale_id = state.store.sales(10).await.unwrap()[0].id;

    let (name, value) = as_user(manager);
    server
        .put(&format!("/api/v1/sales/{}", sale_id.as_uuid()))
        .add_header(name, value)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let (name, value) = as_user(manager);
    let updated: Sale = server
        .put(&format!("/api/v1/sales/{}", sale_id.as_uuid()))
        .add_header(name, value)
        .json(&json!({ "customer": "Mercado Bom Preço", "notes": "renewal in March" }))
        .await
        .json();
    assert_eq!(updated.customer, "Mercado Bom Preço");

    let (name, value) = as_user(manager);
    let cancelled: Sale = server
        .post(&format!("/api/v1/sales/{}/cancel", sale_id.as_uuid()))
        .add_header(name, value)
        .await
        .json();
    assert_eq!(cancelled.status, SaleStatus::Rejected);
    assert_eq!(state.store.sales(10).await.unwrap().len(), 3);

    let (name, value) = as_user(manager);
    server
        .post(&format!("/api/v1/sales/{}/cancel", uuid_like()))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

fn uuid_like() -> String {
    UserId::new().as_uuid().to_string()
}

// =============================================================================
// Goals
// =============================================================================

#[tokio::test]
async fn test_create_goal() {
    let (server, state) = setup();
    let seller = user(&state, "Ana Souza").await;
    let manager = user(&state, "Gustavo Gestor").await;
    let body = json!({
        "period_kind": "WEEKLY",
        "target_amount": "8000",
        "period_start": "2026-10-19",
        "period_end": "2026-10-25",
        "tiers": [
            { "unlock_percent": 50, "title": "Pizza" },
            { "unlock_percent": 100, "title": "Early Friday" }
        ]
    });

    let (name, value) = as_user(seller);
    server
        .post("/api/v1/goals")
        .add_header(name, value)
        .json(&body)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let (name, value) = as_user(manager);
    server
        .post("/api/v1/goals")
        .add_header(name, value)
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = as_user(seller);
    let boards: Vec<GoalBoard> = server.get("/api/v1/goals").add_header(name, value).await.json();
    assert_eq!(boards.len(), 2);
}

/// Push a fresh goal to 70%, cancel the sale behind it, and report whether
/// the 66% tier is still shown as unlocked
async fn tier_unlocked_after_cancel(retention: TierRetention) -> bool {
    let (server, state) = setup_with(EngineSettings {
        tier_retention: retention,
        ..Default::default()
    });
    let seller = user(&state, "Diego Alves").await;
    let manager = user(&state, "Gustavo Gestor").await;

    let (name, value) = as_user(manager);
    server
        .post("/api/v1/goals")
        .add_header(name, value)
        .json(&json!({
            "period_kind": "WEEKLY",
            "target_amount": "1000",
            "period_start": "2030-01-07",
            "period_end": "2030-01-13",
            "tiers": [{ "unlock_percent": 66, "title": "Team lunch" }]
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = as_user(seller);
    let recorded: RecordSaleResponse = server
        .post("/api/v1/sales")
        .add_header(name, value)
        .json(&json!({ "production": "700", "sold_at": "2030-01-10T12:00:00Z" }))
        .await
        .json();

    let weekly_board = |boards: Vec<GoalBoard>| {
        boards
            .into_iter()
            .find(|b| b.goal.target_amount == dec!(1000))
            .unwrap()
    };

    let (name, value) = as_user(seller);
    let before = weekly_board(server.get("/api/v1/goals").add_header(name, value).await.json());
    assert_eq!(before.progress.percent, dec!(70));
    assert!(before.tiers[0].unlocked);

    let (name, value) = as_user(manager);
    server
        .post(&format!("/api/v1/sales/{}/cancel", recorded.sale.id.as_uuid()))
        .add_header(name, value)
        .await
        .assert_status_ok();

    let (name, value) = as_user(seller);
    let after = weekly_board(server.get("/api/v1/goals").add_header(name, value).await.json());
    assert_eq!(after.team_total, dec!(0));
    after.tiers[0].unlocked
}

#[tokio::test]
async fn test_live_retention_revokes_tier_after_cancel() {
    assert!(!tier_unlocked_after_cancel(TierRetention::Live).await);
}

#[tokio::test]
async fn test_high_water_retention_keeps_tier_after_cancel() {
    assert!(tier_unlocked_after_cancel(TierRetention::HighWaterMark).await);
}

#[tokio::test]
async fn test_create_goal_rejects_reversed_period() {
    let (server, state) = setup();
    let (name, value) = as_user(user(&state, "Marina Master").await);

    server
        .post("/api/v1/goals")
        .add_header(name, value)
        .json(&json!({
            "period_kind": "MONTHLY",
            "target_amount": "1000",
            "period_start": "2026-10-31",
            "period_end": "2026-10-01"
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// =============================================================================
// Signups
// =============================================================================

#[tokio::test]
async fn test_signup_review() {
    let (server, state) = setup();
    let master = user(&state, "Marina Master").await;
    let manager = user(&state, "Gustavo Gestor").await;

    let (name, value) = as_user(manager);
    server
        .get("/api/v1/signups")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let (name, value) = as_user(master);
    let pending: Vec<SignupRequest> = server.get("/api/v1/signups").add_header(name, value).await.json();
    assert_eq!(pending.len(), 1);
    let request = &pending[0];

    let (name, value) = as_user(master);
    let approved: SignupRequest = server
        .post(&format!("/api/v1/signups/{}/approve", request.id.as_uuid()))
        .add_header(name, value)
        .await
        .json();
    assert_eq!(approved.status, SignupStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(master));

    let (name, value) = as_user(request.user_id);
    server
        .get("/api/v1/dashboard")
        .add_header(name, value)
        .await
        .assert_status_ok();

    let (name, value) = as_user(master);
    server
        .post(&format!("/api/v1/signups/{}/reject", request.id.as_uuid()))
        .add_header(name, value)
        .json(&json!({ "reason": "duplicate" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_signup_rejection_keeps_user_locked_out() {
    let (server, state) = setup();
    let master = user(&state, "Marina Master").await;
    let request = state.store.pending_signups().await.unwrap().remove(0);

    let (name, value) = as_user(master);
    let rejected: SignupRequest = server
        .post(&format!("/api/v1/signups/{}/reject", request.id.as_uuid()))
        .add_header(name, value)
        .json(&json!({ "reason": "Not part of the sales team" }))
        .await
        .json();
    assert_eq!(rejected.status, SignupStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Not part of the sales team"));

    let (name, value) = as_user(request.user_id);
    server
        .get("/api/v1/dashboard")
        .add_header(name, value)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}
