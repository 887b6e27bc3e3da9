mod common;

use axum::http::{header, Method, StatusCode};
use base64::Engine;
use common::{response_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn analytics_requires_admin_credentials() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/admin/analytics", None, &[]).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let challenge = response
        .headers()
        .get(header::WWW_AUTHENTICATE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(challenge.starts_with("Basic realm="));

    let body = response_json(response).await;
    assert_eq!(body["message"], "Admin credentials required.");
}

#[tokio::test]
async fn wrong_credentials_are_rejected() {
    let app = TestApp::new().await;

    let bogus = format!(
        "Basic {}",
        base64::engine::general_purpose::STANDARD.encode("admin:wrong-password")
    );
    let response = app
        .request(
            Method::GET,
            "/admin/analytics",
            None,
            &[("authorization", bogus.as_str())],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_system_reports_zeroed_cards() {
    let app = TestApp::new().await;

    let auth = app.admin_auth_header();
    let response = app
        .request(
            Method::GET,
            "/admin/analytics",
            None,
            &[("authorization", auth.as_str())],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["cards"]["total_orders"], 0);
    assert_eq!(body["cards"]["pending_orders"], 0);
    assert_eq!(body["cards"]["total_tour_registrations"], 0);
    assert!(body["top_products"].as_array().unwrap().is_empty());
    assert!(body["recent_orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_reflects_orders_and_registrations() {
    let app = TestApp::new().await;
    let item = app
        .seed_product("Bronze Dancing Girl Replica", "bronze-dancing-girl", dec!(500.00), 10)
        .await;

    // Place one order through the public flow
    let response = app
        .request(
            Method::POST,
            "/shop/cart/items",
            Some(json!({ "product_id": item.id, "quantity": 2 })),
            &[],
        )
        .await;
    let body = response_json(response).await;
    let token = body["cart"]["token"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            "/shop/checkout",
            Some(json!({
                "cart_token": token,
                "customer_name": "Asha Rao",
                "email": "asha@example.com",
                "address_line1": "12 Museum Road",
                "city": "Bengaluru",
                "postal_code": "560001",
            })),
            &[],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = response_json(response).await;
    let order_number = order["order"]["order_number"].as_str().unwrap().to_string();

    // And one tour registration
    let response = app
        .request(
            Method::POST,
            "/tour-registrations",
            Some(json!({
                "contact_name": "Meera Iyer",
                "email": "meera@example.com",
                "group_type": "family",
                "preferred_date": "2030-01-10",
                "preferred_slot": "Morning (10:30 AM - 12:00 PM)",
                "adults_count": 2,
                "students_count": 1,
            })),
            &[],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let auth = app.admin_auth_header();
    let response = app
        .request(
            Method::GET,
            "/admin/analytics",
            None,
            &[("authorization", auth.as_str())],
        )
        .await;
    let body = response_json(response).await;

    assert_eq!(body["cards"]["total_orders"], 1);
    assert_eq!(body["cards"]["pending_orders"], 1);
    assert_eq!(body["cards"]["unique_customers"], 1);
    assert_eq!(body["cards"]["total_tour_registrations"], 1);
    assert_eq!(body["cards"]["upcoming_tours"], 1);

    let revenue: Decimal = body["cards"]["total_revenue"].as_str().unwrap().parse().unwrap();
    assert_eq!(revenue, dec!(1000));

    let top = body["top_products"].as_array().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["product_name"], "Bronze Dancing Girl Replica");
    assert_eq!(top[0]["total_quantity"], 2);

    let recent = body["recent_orders"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["order_number"], order_number);
}
