//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module contains integration tests for the HTTP API.
// It drives the router in-process and verifies status codes and bodies.
//--------------------------------------------------------------------------------------------------

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use hyper::Response;
use serde_json::{Value, from_slice, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use stall_reviews::{
    Api, AppState, DisconnectedBroker, EventPublisher, EventRoutes, InMemoryReviewStore,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_test_writer()
        .try_init();
}

/// Sets up a test router over an empty in-memory store.
/// The broker is disconnected, so every event is dropped.
fn setup_test_router() -> Router {
    let publisher = Arc::new(EventPublisher::new(
        Arc::new(DisconnectedBroker::new("not started in tests")),
        EventRoutes::default(),
        Duration::from_millis(50),
    ));
    let state = AppState::with_store(Arc::new(InMemoryReviewStore::new()), publisher);

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    Api::new(addr, Arc::new(state)).routes()
}

/// Helper to parse JSON responses
async fn parse_json_response(response: Response<Body>) -> Value {
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024) // 1MB limit
        .await
        .unwrap();

    from_slice(&body_bytes).unwrap()
}

fn json_request(method: &str, uri: &str, user: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user).header("X-Username", user);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty_request(method: &str, uri: &str, user: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("X-User-Id", user);
    }
    builder.body(Body::empty()).unwrap()
}

fn admin_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-User-Id", "admin-1")
        .header("X-User-Role", "ROLE_ADMIN")
        .header("content-type", "application/json");
    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn create_review(app: &Router, user: &str, body: Value) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/reviews", Some(user), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    parse_json_response(response).await
}

#[tokio::test]
async fn test_health_endpoint() {
    // Setup
    let app = setup_test_router();

    // Execute
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Verify
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_get_review() {
    let app = setup_test_router();

    let created = create_review(
        &app,
        "alice",
        json!({
            "stallId": 7,
            "stallName": "Noodle Bar",
            "rating": 4,
            "comment": "great broth",
            "totalCost": "30.00",
            "numberOfPeople": 3
        }),
    )
    .await;

    assert_eq!(created["stallId"], 7);
    assert_eq!(created["userId"], "alice");
    assert_eq!(created["likesCount"], 0);
    assert_eq!(created["isLikedByCurrentUser"], false);

    let id = created["id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/api/reviews/{}", id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = parse_json_response(response).await;
    assert_eq!(fetched["comment"], "great broth");
}

#[tokio::test]
async fn test_create_review_validation() {
    let app = setup_test_router();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/reviews", Some("alice"), json!({"stallId": 1, "rating": 6})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_json_response(response).await;
    assert_eq!(body["error"]["code"], 400);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/reviews", Some("alice"), json!({"rating": "five"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_review_requires_identity() {
    let app = setup_test_router();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/reviews", None, json!({"stallId": 1, "rating": 5})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_only_author_can_update_or_delete() {
    let app = setup_test_router();
    let created = create_review(&app, "alice", json!({"stallId": 2, "rating": 5})).await;
    let uri = format!("/api/reviews/{}", created["id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(json_request("PUT", &uri, Some("bob"), json!({"rating": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri, Some("bob")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // untouched
    let response = app.clone().oneshot(empty_request("GET", &uri, None)).await.unwrap();
    assert_eq!(parse_json_response(response).await["rating"], 5);

    let response = app
        .clone()
        .oneshot(json_request("PUT", &uri, Some("alice"), json!({"rating": 2})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_json_response(response).await["rating"], 2);

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &uri, Some("alice")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(empty_request("GET", &uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let app = setup_test_router();

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/api/reviews/{}", uuid::Uuid::new_v4()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/reviews/not-a-uuid", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_like_toggled_twice() {
    let app = setup_test_router();
    let created = create_review(&app, "alice", json!({"stallId": 3, "rating": 4})).await;
    let id = created["id"].as_str().unwrap();
    let like_uri = format!("/api/reviews/{}/like", id);

    let response = app
        .clone()
        .oneshot(empty_request("POST", &like_uri, Some("bob")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = parse_json_response(response).await;
    assert_eq!(first, json!({"isLiked": true, "likeCount": 1}));

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/api/reviews/{}", id), Some("bob")))
        .await
        .unwrap();
    let review = parse_json_response(response).await;
    assert_eq!(review["likesCount"], 1);
    assert_eq!(review["isLikedByCurrentUser"], true);

    let response = app
        .clone()
        .oneshot(empty_request("POST", &like_uri, Some("bob")))
        .await
        .unwrap();
    let second = parse_json_response(response).await;
    assert_eq!(second, json!({"isLiked": false, "likeCount": 0}));

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/api/reviews/{}/like-count", id), None))
        .await
        .unwrap();
    assert_eq!(parse_json_response(response).await["likeCount"], 0);

    let response = app
        .clone()
        .oneshot(empty_request("GET", &format!("/api/reviews/{}/is-liked", id), Some("bob")))
        .await
        .unwrap();
    assert_eq!(parse_json_response(response).await["isLiked"], false);
}

#[tokio::test]
async fn test_duplicate_report_rejected() {
    let app = setup_test_router();
    let created = create_review(&app, "alice", json!({"stallId": 4, "rating": 1})).await;
    let uri = format!("/api/reviews/{}/report", created["id"].as_str().unwrap());
    let report = json!({"reason": "SPAM", "description": "advertising"});

    let response = app
        .clone()
        .oneshot(json_request("POST", &uri, Some("bob"), report.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let filed = parse_json_response(response).await;
    assert_eq!(filed["status"], "PENDING");

    let response = app
        .clone()
        .oneshot(json_request("POST", &uri, Some("bob"), report))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_json_response(response).await;
    assert_eq!(body["error"]["message"], "You have already reported this review");
}

#[tokio::test]
async fn test_stall_listing_and_statistics() {
    let app = setup_test_router();
    create_review(&app, "a", json!({"stallId": 9, "rating": 5, "totalCost": "20", "numberOfPeople": 2})).await;
    create_review(&app, "b", json!({"stallId": 9, "rating": 3, "totalCost": "30", "numberOfPeople": 3})).await;
    // no party size, so no price sample
    create_review(&app, "c", json!({"stallId": 9, "rating": 1, "totalCost": "9"})).await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/stalls/9/reviews?page=0&size=2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = parse_json_response(response).await;
    assert_eq!(page["totalElements"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["content"].as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/stalls/9/stats", None))
        .await
        .unwrap();
    let stats = parse_json_response(response).await;
    assert_eq!(stats["averageRating"], 3.0);
    assert_eq!(stats["totalReviews"], 3);
    assert_eq!(stats["averagePrice"], 10.0);
    assert_eq!(stats["totalPriceReviews"], 2);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/stalls/9/rating-distribution", None))
        .await
        .unwrap();
    let distribution = parse_json_response(response).await;
    assert_eq!(distribution["distribution"], json!({"1": 1, "2": 0, "3": 1, "4": 0, "5": 1}));

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/stalls/9/reviews?sortBy=price", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = setup_test_router();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/admin/stats", Some("bob")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/admin/stats", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/api/admin/stats", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_json_response(response).await["totalReviews"], 0);
}

#[tokio::test]
async fn test_admin_bulk_delete() {
    let app = setup_test_router();
    let a = create_review(&app, "alice", json!({"stallId": 1, "rating": 5})).await;
    let b = create_review(&app, "bob", json!({"stallId": 1, "rating": 4})).await;
    let c = create_review(&app, "carol", json!({"stallId": 2, "rating": 3})).await;

    let response = app
        .clone()
        .oneshot(admin_request(
            "DELETE",
            "/api/admin/reviews",
            Some(json!([a["id"], b["id"], c["id"], a["id"]])),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = parse_json_response(response).await;
    assert_eq!(outcome["deleted"].as_array().unwrap().len(), 3);
    assert_eq!(outcome["affectedStalls"], json!([1, 2]));

    let response = app
        .clone()
        .oneshot(admin_request("DELETE", "/api/admin/reviews", Some(json!([]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_search_and_report_handling() {
    let app = setup_test_router();
    let review = create_review(
        &app,
        "alice",
        json!({"stallId": 5, "stallName": "Satay Corner", "rating": 2, "comment": "too salty"}),
    )
    .await;
    create_review(&app, "bob", json!({"stallId": 6, "rating": 5, "comment": "perfect"})).await;
    let review_id = review["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/api/admin/reviews?keyword=SALTY", None))
        .await
        .unwrap();
    let page = parse_json_response(response).await;
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["content"][0]["id"], review_id);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/reviews/{}/report", review_id),
            Some("bob"),
            json!({"reason": "OFFENSIVE", "description": "rude"}),
        ))
        .await
        .unwrap();
    let report = parse_json_response(response).await;
    let report_id = report["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/api/admin/reports?status=PENDING", None))
        .await
        .unwrap();
    assert_eq!(parse_json_response(response).await["totalElements"], 1);

    let handle_uri = format!("/api/admin/reports/{}/handle", report_id);
    let response = app
        .clone()
        .oneshot(admin_request(
            "PUT",
            &handle_uri,
            Some(json!({"status": "RESOLVED", "handleNote": "comment edited"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let handled = parse_json_response(response).await;
    assert_eq!(handled["status"], "RESOLVED");
    assert_eq!(handled["handledBy"], "admin-1");

    let response = app
        .clone()
        .oneshot(admin_request("PUT", &handle_uri, Some(json!({"status": "PENDING"}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(admin_request("GET", &format!("/api/admin/reviews/{}/reports", review_id), None))
        .await
        .unwrap();
    assert_eq!(parse_json_response(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_republish_is_accepted_without_broker() {
    let app = setup_test_router();

    let response = app
        .clone()
        .oneshot(admin_request("POST", "/api/admin/stalls/42/republish", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(parse_json_response(response).await, json!({"stallId": 42}));
}
