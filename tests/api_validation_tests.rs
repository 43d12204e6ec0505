// SPDX-License-Identifier: MIT

//! API input validation tests.
//!
//! These run against an offline mock store, so they only cover paths
//! that are rejected before any database access.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_rejects_short_phone() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/register",
            json!({ "name": "Alice", "phone": "123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_empty_name() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/register",
            json!({ "name": "", "phone": "+14155550123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_questions_rejects_malformed_week_id() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/questions?week_id=banana")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_rejects_malformed_week_id() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/submit",
            json!({
                "user_id": "+14155550123",
                "week_id": "2026-13",
                "answers": {},
                "time_taken": 30
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_rejects_negative_time() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/submit",
            json!({
                "user_id": "+14155550123",
                "week_id": "2026-W05",
                "answers": {},
                "time_taken": -5
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_leaderboard_rejects_unknown_type() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/leaderboard?type=bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_config_rejects_zero_timer() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/admin/config",
            json!({ "timer_duration_minutes": 0, "quiz_active": true }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_question_rejects_answer_not_in_options() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/admin/questions",
            json!({
                "id": "q1",
                "text": "What is the capital of France?",
                "options": ["London", "Berlin", "Paris", "Madrid"],
                "answer": "Rome",
                "order": 1,
                "week_id": "2026-W05"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_question_rejects_wrong_option_count() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/admin/questions",
            json!({
                "id": "q1",
                "text": "Pick one",
                "options": ["A", "B"],
                "answer": "A",
                "order": 1,
                "week_id": "2026-W05"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_rejects_out_of_range_count() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/admin/questions/generate",
            json!({ "count": 500 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_without_api_key_is_bad_gateway() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json("/api/admin/questions/generate", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_security_headers_present() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
}
