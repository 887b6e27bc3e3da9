pub mod analytics;
pub mod cart;
pub mod checkout;
pub mod common;
pub mod content;
pub mod products;
pub mod tour_registrations;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::{
    AnalyticsService, BookingService, CartService, CatalogService, CheckoutService, ContentService,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub cart: CartService,
    pub checkout: CheckoutService,
    pub booking: BookingService,
    pub analytics: AnalyticsService,
    pub content: ContentService,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        let cart = CartService::new(db.clone(), event_sender.clone(), config.clone());
        let checkout = CheckoutService::new(
            db.clone(),
            event_sender.clone(),
            config,
            cart.clone(),
        );

        Self {
            catalog: CatalogService::new(db.clone()),
            booking: BookingService::new(db.clone(), event_sender),
            analytics: AnalyticsService::new(db.clone()),
            content: ContentService::new(db),
            cart,
            checkout,
        }
    }
}
