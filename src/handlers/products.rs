use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::handlers::common::{map_service_error, success_response, PaginatedResponse};
use crate::services::catalog::{ProductListFilter, DEFAULT_PER_PAGE, MAX_PER_PAGE};
use crate::{errors::ApiError, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/:slug", get(get_product))
}

#[utoipa::path(
    get,
    path = "/shop/products",
    summary = "List products",
    description = "Paginated product catalog with image galleries, newest first",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (default: 12, max: 50)"),
        ("search" = Option<String>, Query, description = "Substring match on name, summary or SKU"),
        ("featured" = Option<bool>, Query, description = "Only featured products"),
        ("status" = Option<String>, Query, description = "Product status filter (default: active)"),
    ),
    responses(
        (status = 200, description = "Products retrieved successfully"),
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProductListFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = filter.page.unwrap_or(1).max(1);
    let per_page = filter
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let (products, total) = state
        .services
        .catalog
        .list_products(filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        products, page, per_page, total,
    )))
}

#[utoipa::path(
    get,
    path = "/shop/products/{slug}",
    summary = "Get product",
    description = "Single product by slug with its ordered image gallery",
    params(("slug" = String, Path, description = "Product slug")),
    responses(
        (status = 200, description = "Product retrieved successfully"),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Catalog"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .get_product_by_slug(&slug)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}
