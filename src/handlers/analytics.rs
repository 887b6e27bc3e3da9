use axum::{extract::State, response::IntoResponse, routing::get, Router};
use std::sync::Arc;

use crate::auth::AdminBasicAuth;
use crate::handlers::common::{map_service_error, success_response};
use crate::{errors::ApiError, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(dashboard))
}

#[utoipa::path(
    get,
    path = "/admin/analytics",
    summary = "Dashboard analytics",
    description = "Revenue and booking cards, top products and recent orders for the admin dashboard",
    responses(
        (status = 200, description = "Analytics retrieved", body = crate::services::analytics::DashboardAnalytics),
        (status = 401, description = "Admin credentials required", body = crate::errors::ErrorResponse),
    ),
    tag = "Admin"
)]
pub async fn dashboard(
    _auth: AdminBasicAuth,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let analytics = state
        .services
        .analytics
        .dashboard()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(analytics))
}
