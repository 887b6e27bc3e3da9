use crate::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

const ADMIN_REALM: &str = "Vyom Admin";

/// Extractor guarding admin endpoints with HTTP Basic Auth.
///
/// Credentials come from `AppConfig::admin_username` / `admin_password`.
/// Any parse or mismatch failure yields a 401 carrying a `WWW-Authenticate`
/// challenge so browsers prompt for credentials.
pub struct AdminBasicAuth;

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminBasicAuth {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AdminAuthRejection)?;

        let (username, password) =
            decode_basic_credentials(header_value).ok_or(AdminAuthRejection)?;

        let cfg = &state.config;
        if username != cfg.admin_username || password != cfg.admin_password {
            warn!("Rejected admin request with invalid credentials");
            return Err(AdminAuthRejection);
        }

        Ok(AdminBasicAuth)
    }
}

/// Parses `Basic <base64(user:pass)>` into its parts.
fn decode_basic_credentials(header_value: &str) -> Option<(String, String)> {
    let encoded = header_value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[derive(Debug)]
pub struct AdminAuthRejection;

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": "Unauthorized",
            "message": "Admin credentials required.",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (
            StatusCode::UNAUTHORIZED,
            [(
                header::WWW_AUTHENTICATE,
                format!("Basic realm=\"{}\"", ADMIN_REALM),
            )],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed_header() {
        // admin:secret
        let header = "Basic YWRtaW46c2VjcmV0";
        let (user, pass) = decode_basic_credentials(header).unwrap();
        assert_eq!(user, "admin");
        assert_eq!(pass, "secret");
    }

    #[test]
    fn rejects_non_basic_scheme() {
        assert!(decode_basic_credentials("Bearer token").is_none());
    }

    #[test]
    fn rejects_malformed_base64() {
        assert!(decode_basic_credentials("Basic not-base64!!!").is_none());
    }

    #[test]
    fn rejects_missing_separator() {
        // "adminsecret" without a colon
        let header = "Basic YWRtaW5zZWNyZXQ=";
        assert!(decode_basic_credentials(header).is_none());
    }

    #[test]
    fn password_may_contain_colons() {
        // admin:se:cr:et
        let header = "Basic YWRtaW46c2U6Y3I6ZXQ=";
        let (user, pass) = decode_basic_credentials(header).unwrap();
        assert_eq!(user, "admin");
        assert_eq!(pass, "se:cr:et");
    }

    #[tokio::test]
    async fn rejection_carries_challenge_header() {
        let response = AdminAuthRejection.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let challenge = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(challenge.starts_with("Basic realm="));
    }
}
