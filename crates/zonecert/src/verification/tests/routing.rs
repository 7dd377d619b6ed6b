use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::{business_id, date, fixture, snapshot, IN_ZONE};
use crate::verification::domain::TriggeredBy;
use crate::verification::router::verification_router;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is json")
}

#[tokio::test]
async fn post_verification_returns_record_for_known_business() {
    let fx = fixture(vec![snapshot("ABC123DEF456", IN_ZONE)]);
    let app = verification_router(fx.service.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/verifications")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "business_id": "abc123def456", "as_of": "2025-06-01" }).to_string(),
        ))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("handler responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["business_id"], "ABC123DEF456");
    assert_eq!(body["status"], "compliant");
    assert_eq!(body["risk_level"], "low");
    assert_eq!(fx.store.records().len(), 1);
}

#[tokio::test]
async fn post_verification_maps_unknown_business_to_404() {
    let fx = fixture(vec![snapshot("ABC123DEF456", IN_ZONE)]);
    let app = verification_router(fx.service.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/verifications")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "business_id": "ZZZ999ZZZ999" }).to_string(),
        ))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("handler responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["business_id"], "ZZZ999ZZZ999");
}

#[tokio::test]
async fn post_verification_rejects_malformed_identifier() {
    let fx = fixture(vec![snapshot("ABC123DEF456", IN_ZONE)]);
    let app = verification_router(fx.service.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/verifications")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "business_id": "nope" }).to_string()))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("handler responds");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(fx.store.records().is_empty());
}

#[tokio::test]
async fn get_verifications_filters_by_business() {
    let fx = fixture(vec![
        snapshot("ABC123DEF456", IN_ZONE),
        snapshot("XYZ789GHI012", IN_ZONE),
    ]);
    let operator = TriggeredBy::Operator("tester".to_string());
    let as_of = date(2025, 6, 1);
    fx.service
        .verify(&business_id("ABC123DEF456"), as_of, operator.clone())
        .expect("ok");
    fx.service
        .verify(&business_id("XYZ789GHI012"), as_of, operator)
        .expect("ok");

    let app = verification_router(fx.service.clone());
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/verifications?business_id=abc123def456")
        .body(Body::empty())
        .expect("request builds");

    let response = app.oneshot(request).await.expect("handler responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let rows = body.as_array().expect("array body");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["business_id"], "ABC123DEF456");
}
