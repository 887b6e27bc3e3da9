use axum::{
    extract::State, http::HeaderMap, response::IntoResponse, routing::post, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

use crate::handlers::common::{
    created_response, map_service_error, resolve_cart_token, validate_input,
};
use crate::services::checkout::CheckoutInput;
use crate::{errors::ApiError, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(checkout))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    pub cart_token: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Customer name is required"))]
    pub customer_name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(max = 30))]
    pub phone: Option<String>,
    #[validate(length(max = 8))]
    pub country_code: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Address is required"))]
    pub address_line1: String,
    #[validate(length(max = 255))]
    pub address_line2: Option<String>,
    #[validate(length(min = 1, max = 120, message = "City is required"))]
    pub city: String,
    #[validate(length(max = 120))]
    pub state: Option<String>,
    #[validate(length(min = 1, max = 20, message = "Postal code is required"))]
    pub postal_code: String,
    pub notes: Option<serde_json::Value>,
}

#[utoipa::path(
    post,
    path = "/shop/checkout",
    summary = "Checkout",
    description = "Converts the cart into an order, decrementing inventory in one transaction",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created"),
        (status = 400, description = "Cart token missing", body = crate::errors::ErrorResponse),
        (status = 404, description = "Cart not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order number allocation exhausted", body = crate::errors::ErrorResponse),
        (status = 422, description = "Empty cart or insufficient inventory", body = crate::errors::ErrorResponse),
    ),
    tag = "Checkout"
)]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let token = resolve_cart_token(&headers, payload.cart_token);

    let order = state
        .services
        .checkout
        .checkout(
            token,
            CheckoutInput {
                customer_name: payload.customer_name,
                email: payload.email,
                phone: payload.phone,
                country_code: payload.country_code,
                address_line1: payload.address_line1,
                address_line2: payload.address_line2,
                city: payload.city,
                state: payload.state,
                postal_code: payload.postal_code,
                notes: payload.notes,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(order))
}
