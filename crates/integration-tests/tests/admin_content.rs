//! Integration tests for FAQ management and dashboard statistics.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use taskmaster_integration_tests::TestApp;

fn questions(list: &Value) -> Vec<(u64, &str)> {
    list["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| (e["index"].as_u64().unwrap(), e["question"].as_str().unwrap()))
        .collect()
}

fn faq_root() -> Value {
    json!({
        "faqs": {
            "hardware": [
                { "question": "Do you fix laptops?", "answer": "Yes." },
                { "question": "Do you fix phones?", "answer": "Most models." },
                { "question": "Do you fix printers?", "answer": "Sometimes." }
            ],
            "software": { "0": { "question": "Can you install Windows?", "answer": "Yes." } }
        }
    })
}

// =============================================================================
// FAQs
// =============================================================================

#[tokio::test]
async fn test_faq_catalog_lists_both_categories() {
    let app = TestApp::signed_in(faq_root()).await;

    let response = app.get("/api/faqs").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(questions(&response.body["hardware"]).len(), 3);
    assert_eq!(
        questions(&response.body["software"]),
        vec![(0, "Can you install Windows?")]
    );
}

#[tokio::test]
async fn test_faq_add_appends() {
    let app = TestApp::signed_in(faq_root()).await;

    let response = app
        .json(
            Method::POST,
            "/api/faqs/software",
            &json!({ "question": "Do you recover data?", "answer": "Often." }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(
        questions(&response.body),
        vec![(0, "Can you install Windows?"), (1, "Do you recover data?")]
    );
}

#[tokio::test]
async fn test_faq_add_rejects_blank() {
    let app = TestApp::signed_in(faq_root()).await;

    let response = app
        .json(
            Method::POST,
            "/api/faqs/hardware",
            &json!({ "question": "  ", "answer": "x" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.fakes.store.writes(), 0);
}

#[tokio::test]
async fn test_faq_update_in_place() {
    let app = TestApp::signed_in(faq_root()).await;

    let response = app
        .json(
            Method::PUT,
            "/api/faqs/hardware/1",
            &json!({ "question": "Do you fix tablets?", "answer": "Yes." }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        app.fakes.store.snapshot("faqs/hardware/1"),
        Some(json!({ "question": "Do you fix tablets?", "answer": "Yes." }))
    );
    assert_eq!(questions(&response.body)[1], (1, "Do you fix tablets?"));
}

#[tokio::test]
async fn test_faq_delete_keeps_list_dense() {
    let app = TestApp::signed_in(faq_root()).await;

    let response = app.call(Method::DELETE, "/api/faqs/hardware/0").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        questions(&response.body),
        vec![(0, "Do you fix phones?"), (1, "Do you fix printers?")]
    );
    assert_eq!(app.fakes.store.snapshot("faqs/hardware/2"), None);
}

#[tokio::test]
async fn test_faq_missing_index_and_unknown_category() {
    let app = TestApp::signed_in(faq_root()).await;

    let missing = app.call(Method::DELETE, "/api/faqs/hardware/7").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.error(), Some("FAQ not found"));

    let unknown = app.get("/api/faqs/gardening/0").await;
    assert_eq!(unknown.status, StatusCode::METHOD_NOT_ALLOWED);

    let unknown_delete = app.call(Method::DELETE, "/api/faqs/gardening/0").await;
    assert_eq!(unknown_delete.status, StatusCode::NOT_FOUND);
    assert_eq!(app.fakes.store.writes(), 0);
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_stats() {
    let app = TestApp::signed_in(json!({
        "users": { "u1": { "email": "a@x.io" }, "u2": { "email": "b@x.io" } },
        "companies": {
            "c1": { "services": { "s1": { "serviceName": "A" }, "s2": { "serviceName": "B" } } },
            "c2": { "services": { "s3": { "serviceName": "C" } } },
            "c3": {}
        },
        "bookings": {
            "b1": { "status": "pending" },
            "b2": { "status": "pending" },
            "b3": { "status": "completed" },
            "b4": { "status": "absent" },
            "b5": {}
        },
        "messages": { "m1": { "message": "hi" } }
    }))
    .await;

    let response = app.get("/api/dashboard").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({
            "totalUsers": 2,
            "totalCompanies": 2,
            "totalServices": 3,
            "totalBookings": 4,
            "pendingBookings": 2,
            "completedBookings": 1,
            "otherBookings": 1,
            "totalMessages": 1
        })
    );
}

#[tokio::test]
async fn test_dashboard_empty_store() {
    let app = TestApp::signed_in(json!({})).await;

    let response = app.get("/api/dashboard").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["totalUsers"], json!(0));
    assert_eq!(response.body["totalBookings"], json!(0));
}
