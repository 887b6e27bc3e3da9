use crate::errors::{ApiError, ServiceError};
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Header carrying the cart token when the body omits `cart_token`.
pub const CART_TOKEN_HEADER: &str = "x-cart-token";

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Resolves the cart token: the body field wins, the `X-Cart-Token` header
/// is the fallback. Blank values count as absent.
pub fn resolve_cart_token(headers: &HeaderMap, body_token: Option<String>) -> Option<String> {
    body_token
        .filter(|t| !t.trim().is_empty())
        .or_else(|| {
            headers
                .get(CART_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
        })
}

/// Pagination parameters for list operations
#[derive(Debug, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
}

fn default_page() -> u64 {
    1
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
        }
    }
}

/// Standard pagination response metadata
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Standard paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(page, per_page, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_meta_rounds_up_partial_pages() {
        let meta = PaginationMeta::new(1, 12, 25);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn pagination_meta_handles_empty_set() {
        let meta = PaginationMeta::new(1, 12, 0);
        assert_eq!(meta.total_pages, 0);
    }

    #[test]
    fn body_token_wins_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CART_TOKEN_HEADER, "header-token".parse().unwrap());
        let token = resolve_cart_token(&headers, Some("body-token".to_string()));
        assert_eq!(token.as_deref(), Some("body-token"));
    }

    #[test]
    fn blank_body_token_falls_back_to_header() {
        let mut headers = HeaderMap::new();
        headers.insert(CART_TOKEN_HEADER, "header-token".parse().unwrap());
        let token = resolve_cart_token(&headers, Some("   ".to_string()));
        assert_eq!(token.as_deref(), Some("header-token"));
    }

    #[test]
    fn absent_everywhere_is_none() {
        let headers = HeaderMap::new();
        assert!(resolve_cart_token(&headers, None).is_none());
    }
}
