pub mod analytics;
pub mod booking;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;

pub use analytics::AnalyticsService;
pub use booking::BookingService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
pub use content::ContentService;
