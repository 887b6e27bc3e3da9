use axum::{extract::State, response::IntoResponse, routing::get, Router};
use serde_json::json;
use std::sync::Arc;

use crate::handlers::common::{map_service_error, success_response};
use crate::{errors::ApiError, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(about))
}

#[utoipa::path(
    get,
    path = "/about",
    summary = "About page content",
    description = "Latest published about-page copy; `data` is null until content is configured",
    responses(
        (status = 200, description = "About content retrieved"),
    ),
    tag = "Content"
)]
pub async fn about(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let content = state
        .services
        .content
        .about()
        .await
        .map_err(map_service_error)?;

    match content {
        Some(payload) => Ok(success_response(json!({
            "data": {
                "title": payload.title,
                "paragraph_one": payload.paragraph_one,
                "paragraph_two": payload.paragraph_two,
                "paragraph_three": payload.paragraph_three,
                "image_url": payload.image_url,
            }
        }))),
        None => Ok(success_response(json!({
            "data": null,
            "message": "About content is not configured yet.",
        }))),
    }
}
