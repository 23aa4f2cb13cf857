use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use libris_accounts::{create_module, UserDirectory};

async fn app() -> Router {
    let pool = libris_db::connect_in_memory().await.unwrap();
    let module = create_module(UserDirectory::new(pool.clone()));
    let migrations: Vec<_> = module
        .migrations()
        .into_iter()
        .map(|m| (module.name().to_string(), m))
        .collect();
    libris_db::migrate(&pool, &migrations).await.unwrap();
    Router::new().nest("/api", module.routes())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn register_fetch_and_delete() {
    let app = app().await;

    let response = send(
        &app,
        "POST",
        "/api/users/",
        Some(json!({"username": "tester", "password": "pass"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["username"], "tester");
    assert!(created.get("password").is_none());
    assert!(created.get("password_hash").is_none());

    let uri = format!("/api/users/{}/", created["id"]);
    let response = send(&app, "GET", &uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, created);

    let response = send(&app, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, "GET", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_password_is_reported_per_field() {
    let app = app().await;

    let response = send(&app, "POST", "/api/users/", Some(json!({"username": "tester"}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(
        body["error"]["details"],
        json!([{"field": "password", "error": "This field is required."}])
    );
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let app = app().await;
    let response = send(&app, "GET", "/api/users/abc/", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
