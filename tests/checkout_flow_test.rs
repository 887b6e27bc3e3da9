mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use common::{response_json, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{json, Value};
use vyom_museum_api::entities::{order, product};

fn checkout_payload(token: &str) -> Value {
    json!({
        "cart_token": token,
        "customer_name": "Asha Rao",
        "email": "asha@example.com",
        "phone": "9876543210",
        "country_code": "+91",
        "address_line1": "12 Museum Road",
        "city": "Bengaluru",
        "state": "Karnataka",
        "postal_code": "560001",
    })
}

async fn cart_with_item(app: &TestApp, product_id: &str, quantity: i32) -> String {
    let response = app
        .request(
            Method::POST,
            "/shop/cart/items",
            Some(json!({ "product_id": product_id, "quantity": quantity })),
            &[],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    body["cart"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn checkout_converts_cart_into_order() {
    let app = TestApp::new().await;
    let item = app
        .seed_product("Bronze Dancing Girl Replica", "bronze-dancing-girl", dec!(499.00), 10)
        .await;
    let token = cart_with_item(&app, &item.id.to_string(), 2).await;

    let response = app
        .request(
            Method::POST,
            "/shop/checkout",
            Some(checkout_payload(&token)),
            &[],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    let order_number = body["order"]["order_number"].as_str().unwrap();
    assert!(order_number.starts_with("VYOM-"));
    assert_eq!(body["order"]["status"], "pending");
    assert_eq!(body["order"]["payment_status"], "unpaid");
    assert_eq!(body["order"]["country_code"], "91");

    let grand_total: Decimal = body["order"]["grand_total"].as_str().unwrap().parse().unwrap();
    assert_eq!(grand_total, dec!(998));

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product_name"], "Bronze Dancing Girl Replica");
    assert_eq!(items[0]["quantity"], 2);

    // Inventory was decremented and the cart emptied
    let live = product::Entity::find_by_id(item.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.inventory_count, 8);

    let response = app
        .request(
            Method::POST,
            "/shop/cart",
            Some(json!({ "cart_token": token })),
            &[],
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["cart"]["items_count"], 0);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn order_number_has_prefix_date_and_suffix() {
    let app = TestApp::new().await;
    let item = app
        .seed_product("Indus Script Mug", "indus-script-mug", dec!(349.00), 5)
        .await;
    let token = cart_with_item(&app, &item.id.to_string(), 1).await;

    let response = app
        .request(
            Method::POST,
            "/shop/checkout",
            Some(checkout_payload(&token)),
            &[],
        )
        .await;
    let body = response_json(response).await;
    let order_number = body["order"]["order_number"].as_str().unwrap();

    let parts: Vec<_> = order_number.split('-').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "VYOM");
    assert_eq!(parts[1], Utc::now().format("%Y%m%d").to_string());
    assert_eq!(parts[2].len(), 5);
}

#[tokio::test]
async fn empty_cart_cannot_be_checked_out() {
    let app = TestApp::new().await;

    let response = app.request(Method::POST, "/shop/cart", None, &[]).await;
    let body = response_json(response).await;
    let token = body["cart"]["token"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            "/shop/checkout",
            Some(checkout_payload(&token)),
            &[],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Your cart is empty.");
    assert_eq!(body["details"], "cart");
}

#[tokio::test]
async fn checkout_requires_a_cart_token() {
    let app = TestApp::new().await;

    let mut payload = checkout_payload("");
    payload["cart_token"] = Value::Null;

    let response = app
        .request(Method::POST, "/shop/checkout", Some(payload), &[])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stock_shortfall_fails_the_whole_checkout() {
    let app = TestApp::new().await;
    let item = app
        .seed_product("Limited Print", "limited-print", dec!(1200.00), 3)
        .await;
    let token = cart_with_item(&app, &item.id.to_string(), 3).await;

    // Stock drains after the cart was filled
    let mut drained: product::ActiveModel = product::Entity::find_by_id(item.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap()
        .into();
    drained.inventory_count = Set(1);
    drained.update(&*app.state.db).await.unwrap();

    let response = app
        .request(
            Method::POST,
            "/shop/checkout",
            Some(checkout_payload(&token)),
            &[],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Limited Print has only 1 units left.");
    assert_eq!(body["details"], "cart");

    // Nothing was committed: no order rows, inventory untouched, cart intact
    let orders = order::Entity::find().all(&*app.state.db).await.unwrap();
    assert!(orders.is_empty());

    let live = product::Entity::find_by_id(item.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.inventory_count, 1);

    let response = app
        .request(
            Method::POST,
            "/shop/cart",
            Some(json!({ "cart_token": token })),
            &[],
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["cart"]["items_count"], 3);
}

#[tokio::test]
async fn checkout_validates_contact_details() {
    let app = TestApp::new().await;
    let item = app
        .seed_product("Indus Script Mug", "indus-script-mug", dec!(349.00), 5)
        .await;
    let token = cart_with_item(&app, &item.id.to_string(), 1).await;

    let mut payload = checkout_payload(&token);
    payload["email"] = json!("not-an-email");

    let response = app
        .request(Method::POST, "/shop/checkout", Some(payload), &[])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
