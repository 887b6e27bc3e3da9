use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vyom Museum API",
        version = "0.1.0",
        description = r#"
# Vyom Museum Shop and Tours API

Backend for the museum gift shop and guided-tour bookings.

## Features

- **Catalog**: Browse products with image galleries
- **Cart**: Anonymous token-identified shopping carts
- **Checkout**: Transactional order placement with guarded inventory decrements
- **Tours**: Slot availability and group registrations with capacity limits
- **Admin**: Dashboard analytics and registration listings behind Basic Auth

## Cart tokens

Cart endpoints accept the token either as a `cart_token` body field or an
`X-Cart-Token` header; the body field wins when both are present.

## Error Handling

Errors use a consistent JSON shape. Validation failures answer 422 and carry
the offending field in `details`:

```json
{
  "error": "Unprocessable Entity",
  "message": "Only 3 units available.",
  "details": "quantity",
  "timestamp": "2026-01-01T00:00:00Z"
}
```
        "#,
        contact(name = "Vyom Museum", email = "tech@vyommuseum.org")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Catalog", description = "Product catalog endpoints"),
        (name = "Cart", description = "Shopping cart endpoints"),
        (name = "Checkout", description = "Order placement endpoints"),
        (name = "Tours", description = "Tour booking endpoints"),
        (name = "Admin", description = "Administrative endpoints"),
        (name = "Content", description = "Editorial site content"),
    ),
    paths(
        crate::handlers::content::about,
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::cart::ensure_cart,
        crate::handlers::cart::add_item,
        crate::handlers::cart::update_item,
        crate::handlers::cart::remove_item,
        crate::handlers::checkout::checkout,
        crate::handlers::tour_registrations::availability,
        crate::handlers::tour_registrations::register,
        crate::handlers::tour_registrations::list_registrations,
        crate::handlers::analytics::dashboard,
    ),
    components(
        schemas(
            crate::handlers::cart::EnsureCartRequest,
            crate::handlers::cart::AddCartItemRequest,
            crate::handlers::cart::UpdateCartItemRequest,
            crate::handlers::cart::RemoveCartItemRequest,
            crate::handlers::checkout::CheckoutRequest,
            crate::handlers::tour_registrations::RegisterTourRequest,
            crate::services::catalog::ProductWithImages,
            crate::services::cart::CartWithItems,
            crate::services::checkout::OrderWithItems,
            crate::services::booking::SlotAvailability,
            crate::services::analytics::DashboardAnalytics,
            crate::services::analytics::DashboardCards,
            crate::services::analytics::TopProduct,
            crate::services::analytics::RecentOrder,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
