use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::IntoResponse,
    routing::{delete, patch, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::common::{
    created_response, map_service_error, resolve_cart_token, success_response, validate_input,
};
use crate::services::cart::AddToCartInput;
use crate::{errors::ApiError, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(ensure_cart))
        .route("/items", post(add_item))
        .route("/items/:id", patch(update_item))
        .route("/items/:id", delete(remove_item))
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct EnsureCartRequest {
    pub cart_token: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddCartItemRequest {
    pub cart_token: Option<String>,
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCartItemRequest {
    pub cart_token: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RemoveCartItemRequest {
    pub cart_token: Option<String>,
}

#[utoipa::path(
    post,
    path = "/shop/cart",
    summary = "Ensure cart",
    description = "Returns the cart for the given token, creating a fresh cart when the token is absent or unknown",
    request_body = EnsureCartRequest,
    responses(
        (status = 200, description = "Cart retrieved or created"),
    ),
    tag = "Cart"
)]
pub async fn ensure_cart(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Option<Json<EnsureCartRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body_token = payload.and_then(|Json(body)| body.cart_token);
    let token = resolve_cart_token(&headers, body_token);

    let cart = state
        .services
        .cart
        .ensure_cart(token)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

#[utoipa::path(
    post,
    path = "/shop/cart/items",
    summary = "Add cart item",
    description = "Adds a product to the cart, merging quantities when the product is already in it",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Item added"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Quantity exceeds available inventory", body = crate::errors::ErrorResponse),
    ),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<AddCartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let token = resolve_cart_token(&headers, payload.cart_token);

    let cart = state
        .services
        .cart
        .add_item(
            token,
            AddToCartInput {
                product_id: payload.product_id,
                quantity: payload.quantity,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(cart))
}

#[utoipa::path(
    patch,
    path = "/shop/cart/items/{id}",
    summary = "Update cart item",
    description = "Sets the quantity of a cart line, re-snapshotting the unit price",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Item updated"),
        (status = 400, description = "Cart token missing", body = crate::errors::ErrorResponse),
        (status = 403, description = "Item belongs to another cart", body = crate::errors::ErrorResponse),
        (status = 404, description = "Cart or item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Quantity exceeds available inventory", body = crate::errors::ErrorResponse),
    ),
    tag = "Cart"
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let token = resolve_cart_token(&headers, payload.cart_token);

    let cart = state
        .services
        .cart
        .update_item(token, item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

#[utoipa::path(
    delete,
    path = "/shop/cart/items/{id}",
    summary = "Remove cart item",
    description = "Removes a cart line and returns the recalculated cart",
    params(("id" = Uuid, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "Item removed"),
        (status = 400, description = "Cart token missing", body = crate::errors::ErrorResponse),
        (status = 403, description = "Item belongs to another cart", body = crate::errors::ErrorResponse),
        (status = 404, description = "Cart or item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<Uuid>,
    headers: HeaderMap,
    payload: Option<Json<RemoveCartItemRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let body_token = payload.and_then(|Json(body)| body.cart_token);
    let token = resolve_cart_token(&headers, body_token);

    let cart = state
        .services
        .cart
        .remove_item(token, item_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}
