use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use base64::Engine;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;
use vyom_museum_api::{
    config::AppConfig,
    db,
    entities::product,
    events::{self, EventSender},
    AppState,
};

/// Helper harness backed by a throwaway SQLite database per test.
pub struct TestApp {
    router: Router,
    pub state: Arc<AppState>,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("vyom_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx));
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = Arc::new(AppState::new(db_arc, cfg, event_sender));
        let router = vyom_museum_api::api_routes().with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Send a JSON request with optional extra headers.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Basic Auth header value for the configured admin user.
    #[allow(dead_code)]
    pub fn admin_auth_header(&self) -> String {
        let credentials = format!(
            "{}:{}",
            self.state.config.admin_username, self.state.config.admin_password
        );
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        )
    }

    /// Insert an active product with stock.
    #[allow(dead_code)]
    pub async fn seed_product(
        &self,
        name: &str,
        slug: &str,
        price: Decimal,
        inventory: i32,
    ) -> product::Model {
        self.seed_product_with_status(name, slug, price, inventory, product::ProductStatus::Active)
            .await
    }

    #[allow(dead_code)]
    pub async fn seed_product_with_status(
        &self,
        name: &str,
        slug: &str,
        price: Decimal,
        inventory: i32,
        status: product::ProductStatus,
    ) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(format!("VY-{}", slug.to_ascii_uppercase())),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            summary: Set(None),
            description: Set(None),
            price: Set(price),
            compare_at_price: Set(None),
            inventory_count: Set(inventory),
            is_featured: Set(false),
            status: Set(status),
            metadata: Set(None),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed product")
    }
}

/// Deserialize a response body into JSON.
#[allow(dead_code)]
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not valid json")
}
