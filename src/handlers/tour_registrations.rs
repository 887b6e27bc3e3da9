use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AdminBasicAuth;
use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input, PaginatedResponse,
    PaginationParams,
};
use crate::services::booking::{RegisterTourInput, ADMIN_PAGE_SIZE};
use crate::{errors::ApiError, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(register))
        .route("/availability", get(availability))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_registrations))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub preferred_date: NaiveDate,
    pub preferred_slot: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterTourRequest {
    #[validate(length(min = 1, max = 255, message = "Contact name is required"))]
    pub contact_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 8))]
    pub country_code: Option<String>,
    #[validate(length(max = 255))]
    pub organisation: Option<String>,
    #[validate(length(min = 1, max = 60, message = "Group type is required"))]
    pub group_type: String,
    pub preferred_date: NaiveDate,
    #[validate(length(min = 1, max = 120, message = "A tour slot is required"))]
    pub preferred_slot: String,
    #[validate(range(min = 0, max = 1000, message = "Attendee counts must be between 0 and 1000"))]
    pub adults_count: i32,
    #[validate(range(min = 0, max = 1000, message = "Attendee counts must be between 0 and 1000"))]
    pub students_count: i32,
    #[serde(default)]
    pub needs_guided_tour: bool,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[utoipa::path(
    get,
    path = "/tour-registrations/availability",
    summary = "Slot availability",
    description = "Remaining capacity for a (date, slot) pair; uncapped slots report no limit",
    params(
        ("preferred_date" = String, Query, description = "Visit date (YYYY-MM-DD)"),
        ("preferred_slot" = String, Query, description = "Slot label"),
    ),
    responses(
        (status = 200, description = "Availability retrieved", body = crate::services::booking::SlotAvailability),
    ),
    tag = "Tours"
)]
pub async fn availability(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state
        .services
        .booking
        .availability(query.preferred_date, &query.preferred_slot)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(snapshot))
}

#[utoipa::path(
    post,
    path = "/tour-registrations",
    summary = "Register tour group",
    description = "Books a group into a tour slot, enforcing per-slot capacity",
    request_body = RegisterTourRequest,
    responses(
        (status = 201, description = "Registration created"),
        (status = 422, description = "No attendees or slot capacity exceeded", body = crate::errors::ErrorResponse),
    ),
    tag = "Tours"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterTourRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let registration = state
        .services
        .booking
        .register(RegisterTourInput {
            contact_name: payload.contact_name,
            email: payload.email,
            phone: payload.phone,
            country_code: payload.country_code,
            organisation: payload.organisation,
            group_type: payload.group_type,
            preferred_date: payload.preferred_date,
            preferred_slot: payload.preferred_slot,
            adults_count: payload.adults_count,
            students_count: payload.students_count,
            needs_guided_tour: payload.needs_guided_tour,
            notes: payload.notes,
        })
        .await
        .map_err(map_service_error)?;

    Ok(created_response(registration))
}

#[utoipa::path(
    get,
    path = "/admin/tour-registrations",
    summary = "List tour registrations",
    description = "Paginated registrations for the admin dashboard, newest first",
    params(PaginationParams),
    responses(
        (status = 200, description = "Registrations retrieved"),
        (status = 401, description = "Admin credentials required", body = crate::errors::ErrorResponse),
    ),
    tag = "Admin"
)]
pub async fn list_registrations(
    _auth: AdminBasicAuth,
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = pagination.page.max(1);
    let (registrations, total) = state
        .services
        .booking
        .list_registrations(page)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        registrations,
        page,
        ADMIN_PAGE_SIZE,
        total,
    )))
}
