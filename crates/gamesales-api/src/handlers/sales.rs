//! Sale Handlers
//!
//! Recording is open to every approved user. Listing, editing and
//! cancelling are management actions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use gamesales_types::{Sale, SaleId, SaleUpdate, UserId};
use tracing::{debug, info};

use crate::dto::{LevelChange, RecordSaleRequest, RecordSaleResponse, SalesQuery, UpdateSaleRequest};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{RequireStaff, SessionUser, ValidatedJson};
use crate::state::AppState;

/// Record a sale for the caller, or for any approved seller when the caller is a master
pub async fn record_sale(
    State(state): State<Arc<AppState>>,
    SessionUser(session): SessionUser,
    ValidatedJson(req): ValidatedJson<RecordSaleRequest>,
) -> ApiResult<(StatusCode, Json<RecordSaleResponse>)> {
    let seller_id = match req.seller_id {
        Some(id) if id != session.user_id() => {
            if !session.is_master() {
                return Err(ApiError::Forbidden(
                    "only a master can record sales for another seller".to_string(),
                ));
            }
            let seller = state
                .store
                .profile(id)
                .await?
                .ok_or_else(|| ApiError::NotFound(format!("Seller {}", id)))?;
            if !seller.approved {
                return Err(ApiError::BadRequest(format!("Seller {} is not approved", id)));
            }
            id
        }
        _ => session.user_id(),
    };

    let new_sale = req.into_new_sale(seller_id);
    new_sale.validate()?;

    let sale = state.store.record_sale(new_sale).await?;
    let pending_approval = !sale.status.is_approved();
    let level_change = sync_level(&state, seller_id).await?;
    state.views.invalidate();

    info!(
        sale_id = %sale.id,
        seller_id = %seller_id,
        recorded_by = %session.user_id(),
        amount = %sale.amount,
        status = sale.status.as_db_str(),
        "Sale recorded"
    );
    metrics::counter!("gamesales_sales_recorded_total", "status" => sale.status.as_db_str()).increment(1);

    let points_awarded = if pending_approval { 0 } else { sale.total_points };
    Ok((
        StatusCode::CREATED,
        Json(RecordSaleResponse {
            sale,
            points_awarded,
            pending_approval,
            level_change,
        }),
    ))
}

/// Most recent sales across all sellers
pub async fn list_sales(
    State(state): State<Arc<AppState>>,
    RequireStaff(_session): RequireStaff,
    Query(query): Query<SalesQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(state.store.sales(query.effective_limit()).await?))
}

/// Edit customer, amount or notes
pub async fn update_sale(
    State(state): State<Arc<AppState>>,
    RequireStaff(session): RequireStaff,
    Path(id): Path<SaleId>,
    ValidatedJson(req): ValidatedJson<UpdateSaleRequest>,
) -> ApiResult<Json<Sale>> {
    let update = SaleUpdate::from(req);
    if update.is_empty() {
        return Err(ApiError::BadRequest("nothing to update".to_string()));
    }
    update.validate()?;

    let sale = state.store.update_sale(id, update).await?;
    state.views.invalidate();

    info!(sale_id = %id, edited_by = %session.user_id(), "Sale updated");
    Ok(Json(sale))
}

/// Mark a sale rejected; it stays on record
pub async fn cancel_sale(
    State(state): State<Arc<AppState>>,
    RequireStaff(session): RequireStaff,
    Path(id): Path<SaleId>,
) -> ApiResult<Json<Sale>> {
    let sale = state.store.cancel_sale(id).await?;
    state.views.invalidate();

    info!(sale_id = %id, cancelled_by = %session.user_id(), "Sale cancelled");
    metrics::counter!("gamesales_sales_cancelled_total").increment(1);
    Ok(Json(sale))
}

/// Bring the stored level in line with the experience total
async fn sync_level(state: &AppState, user_id: UserId) -> ApiResult<Option<LevelChange>> {
    let Some(profile) = state.store.profile(user_id).await? else {
        return Ok(None);
    };
    let derived = state.levels.level_for(profile.total_experience);
    if derived == profile.current_level {
        return Ok(None);
    }

    state.store.set_level(user_id, derived).await?;
    debug!(%user_id, from = profile.current_level, to = derived, "Stored level corrected");
    Ok(Some(LevelChange {
        from: profile.current_level,
        to: derived,
    }))
}
