mod common;

use axum::http::{header, Method, StatusCode};
use chrono::NaiveDate;
use common::{response_json, TestApp};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use uuid::Uuid;
use vyom_museum_api::entities::tour_slot_occupancy;
use vyom_museum_api::services::booking::{AFTERNOON_SLOT, MORNING_SLOT};

fn registration_payload(slot: &str, adults: i32, students: i32) -> Value {
    json!({
        "contact_name": "Meera Iyer",
        "email": "meera@example.com",
        "phone": "9876501234",
        "country_code": "+91",
        "organisation": "Sunrise Public School",
        "group_type": "school",
        "preferred_date": "2026-09-15",
        "preferred_slot": slot,
        "adults_count": adults,
        "students_count": students,
        "needs_guided_tour": true,
    })
}

async fn register(app: &TestApp, payload: Value) -> axum::response::Response {
    app.request(Method::POST, "/tour-registrations", Some(payload), &[])
        .await
}

#[tokio::test]
async fn availability_reports_full_capacity_when_unbooked() {
    let app = TestApp::new().await;

    let uri = format!(
        "/tour-registrations/availability?preferred_date=2026-09-15&preferred_slot={}",
        urlencoded(MORNING_SLOT)
    );
    let response = app.request(Method::GET, &uri, None, &[]).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["capacity"], 20);
    assert_eq!(body["booked"], 0);
    assert_eq!(body["remaining"], 20);
}

#[tokio::test]
async fn registration_reduces_remaining_capacity() {
    let app = TestApp::new().await;

    let response = register(&app, registration_payload(AFTERNOON_SLOT, 2, 10)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = response_json(response).await;
    assert_eq!(body["contact_name"], "Meera Iyer");
    assert_eq!(body["country_code"], "91");

    let uri = format!(
        "/tour-registrations/availability?preferred_date=2026-09-15&preferred_slot={}",
        urlencoded(AFTERNOON_SLOT)
    );
    let response = app.request(Method::GET, &uri, None, &[]).await;
    let body = response_json(response).await;
    assert_eq!(body["capacity"], 15);
    assert_eq!(body["booked"], 12);
    assert_eq!(body["remaining"], 3);
}

#[tokio::test]
async fn group_larger_than_remaining_is_rejected() {
    let app = TestApp::new().await;

    let response = register(&app, registration_payload(AFTERNOON_SLOT, 3, 10)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // 2 seats left; a group of 3 does not fit
    let response = register(&app, registration_payload(AFTERNOON_SLOT, 3, 0)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "Only 2 spots remain for the selected slot. Please adjust your group size or choose another date."
    );
    assert_eq!(body["details"], "preferred_slot");

    // The remaining 2 seats are still bookable
    let response = register(&app, registration_payload(AFTERNOON_SLOT, 2, 0)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn fully_booked_slot_is_rejected_outright() {
    let app = TestApp::new().await;

    let response = register(&app, registration_payload(AFTERNOON_SLOT, 5, 10)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = register(&app, registration_payload(AFTERNOON_SLOT, 1, 0)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "The selected slot is fully booked for this date. Please choose another day or time."
    );
}

#[tokio::test]
async fn same_slot_on_another_date_is_unaffected() {
    let app = TestApp::new().await;

    let response = register(&app, registration_payload(AFTERNOON_SLOT, 5, 10)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut payload = registration_payload(AFTERNOON_SLOT, 5, 10);
    payload["preferred_date"] = json!("2026-09-16");
    let response = register(&app, payload).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn seats_claimed_by_other_transactions_count_against_capacity() {
    let app = TestApp::new().await;

    // A registration in flight elsewhere holds 14 of the 15 afternoon seats;
    // the counter, not the registration rows, is what the claim checks.
    tour_slot_occupancy::ActiveModel {
        id: Set(Uuid::new_v4()),
        slot_date: Set(NaiveDate::from_ymd_opt(2026, 9, 15).unwrap()),
        slot_label: Set(AFTERNOON_SLOT.to_string()),
        booked: Set(14),
    }
    .insert(&*app.state.db)
    .await
    .expect("failed to seed occupancy counter");

    let response = register(&app, registration_payload(AFTERNOON_SLOT, 2, 0)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "Only 1 spots remain for the selected slot. Please adjust your group size or choose another date."
    );
    assert_eq!(body["details"], "preferred_slot");

    // The last seat is still claimable
    let response = register(&app, registration_payload(AFTERNOON_SLOT, 1, 0)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn oversized_attendee_counts_are_rejected_without_panicking() {
    let app = TestApp::new().await;

    let mut payload = registration_payload(MORNING_SLOT, 0, 1);
    payload["adults_count"] = json!(i32::MAX);

    let response = register(&app, payload).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn at_least_one_attendee_is_required() {
    let app = TestApp::new().await;

    let response = register(&app, registration_payload(MORNING_SLOT, 0, 0)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "Please provide at least one attendee for the visit."
    );
    assert_eq!(body["details"], "adults_count");
}

#[tokio::test]
async fn unknown_slot_labels_are_uncapped() {
    let app = TestApp::new().await;

    let slot = "Evening Lecture (06:00 PM)";
    let response = register(&app, registration_payload(slot, 30, 40)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let uri = format!(
        "/tour-registrations/availability?preferred_date=2026-09-15&preferred_slot={}",
        urlencoded(slot)
    );
    let response = app.request(Method::GET, &uri, None, &[]).await;
    let body = response_json(response).await;
    assert!(body["capacity"].is_null());
    assert_eq!(body["booked"], 70);
    assert!(body["remaining"].is_null());
}

#[tokio::test]
async fn admin_listing_requires_credentials() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/admin/tour-registrations", None, &[])
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn admin_listing_returns_registrations() {
    let app = TestApp::new().await;

    for i in 0..3 {
        let mut payload = registration_payload(MORNING_SLOT, 1, 0);
        payload["contact_name"] = json!(format!("Visitor {}", i));
        let response = register(&app, payload).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let auth = app.admin_auth_header();
    let response = app
        .request(
            Method::GET,
            "/admin/tour-registrations",
            None,
            &[("authorization", auth.as_str())],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["pagination"]["per_page"], 15);
    assert_eq!(body["pagination"]["total"], 3);
}

/// Percent-encode a slot label for use in a query string.
fn urlencoded(value: &str) -> String {
    let mut out = String::new();
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
