use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request builds")
}

fn post(uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::post(uri).header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    }
}

#[tokio::test]
async fn ratio_route_requires_a_session() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(get("/api/v1/ratio/classroom/sunflowers", None))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "missing bearer token");
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(get("/api/v1/ratio/overview", Some("stale-token")))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn parents_cannot_read_ratios() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(get("/api/v1/ratio/classroom/sunflowers", Some("parent-token")))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn teacher_reads_classroom_ratio() {
    let (service, _) = build_service();
    check_in(&service, &["c-ava", "c-ben"]);
    sign_in(&service, &["s-maya"]);

    let response = router_with_service(service)
        .oneshot(get(
            "/api/v1/ratio/classroom/sunflowers?as_of=2025-03-03",
            Some("teacher-token"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["classroom_id"], "sunflowers");
    assert_eq!(payload["as_of"], "2025-03-03");
    assert_eq!(payload["status"]["children_count"], 2);
    assert_eq!(payload["status"]["staff_count"], 1);
    assert_eq!(payload["status"]["required_ratio"]["children_per_staff"], 4);
    assert_eq!(payload["status"]["required_ratio"]["dominant_group"], "infant");
    assert_eq!(payload["status"]["status_indicator"], "good");
    assert_eq!(payload["status_colour"], "green");
}

#[tokio::test]
async fn unknown_classroom_is_not_found() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(get("/api/v1/ratio/classroom/attic", Some("director-token")))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_as_of_is_rejected() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(get(
            "/api/v1/ratio/overview?as_of=03/03/2025",
            Some("director-token"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn overview_lists_every_classroom() {
    let (service, _) = build_service();
    check_in(&service, &["c-dev"]);

    let response = router_with_service(service)
        .oneshot(get(
            "/api/v1/ratio/overview?as_of=2025-03-03",
            Some("admin-token"),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["classrooms"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["total_children"], 1);
    assert_eq!(payload["over_ratio_classrooms"], 1);
}

#[tokio::test]
async fn check_in_route_records_and_rejects_repeats() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let first = router
        .clone()
        .oneshot(post(
            "/api/v1/attendance/children/c-ava/check-in",
            "teacher-token",
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(first.status(), StatusCode::OK);
    let payload = read_json_body(first).await;
    assert_eq!(payload["subject"], "child");
    assert_eq!(payload["state"], "checked_in");

    let second = router
        .oneshot(post(
            "/api/v1/attendance/children/c-ava/check-in",
            "teacher-token",
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn teachers_cannot_change_assignments() {
    let (service, _) = build_service();
    let response = router_with_service(service)
        .oneshot(post(
            "/api/v1/classrooms/oak/assignments",
            "teacher-token",
            Some(json!({ "staff_id": "s-priya" })),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn director_assigns_and_removes_staff() {
    let (service, _) = build_service();
    let router = router_with_service(service);

    let created = router
        .clone()
        .oneshot(post(
            "/api/v1/classrooms/oak/assignments",
            "director-token",
            Some(json!({ "staff_id": "s-priya" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let payload = read_json_body(created).await;
    assert_eq!(payload["state"], "active");
    assert!(payload.get("removed_at").is_none());

    let removed = router
        .oneshot(
            Request::delete("/api/v1/classrooms/oak/assignments/s-priya")
                .header(header::AUTHORIZATION, "Bearer director-token")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(removed.status(), StatusCode::OK);
    let payload = read_json_body(removed).await;
    assert_eq!(payload["state"], "removed");
    assert!(payload.get("removed_at").is_some());
}
