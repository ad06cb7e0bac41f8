//! Dashboard statistics endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

use super::OptionalCaller;

/// Dashboard counters. Every field is 0 on an empty store.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_books: i64,
    pub total_users: i64,
    pub active_loans: i64,
    pub available_books: i64,
}

/// Dashboard counters, available to any authenticated caller.
///
/// Authentication is optional at the transport level so that a missing or
/// broken token surfaces as `Forbidden` rather than a challenge.
#[utoipa::path(
    get,
    path = "/stats/dashboard",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard counters", body = DashboardStats),
        (status = 403, description = "Not authenticated")
    )
)]
pub async fn get_dashboard_stats(
    State(state): State<crate::AppState>,
    OptionalCaller(caller): OptionalCaller,
) -> AppResult<Json<DashboardStats>> {
    caller.ok_or_else(|| AppError::Authorization("Authentication required".to_string()))?;

    let stats = state.services.stats.dashboard().await?;
    Ok(Json(stats))
}
