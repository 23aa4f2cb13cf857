use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use libris_accounts::CreateUser;
use libris_app::Application;
use libris_kernel::settings::Settings;

struct TestApp {
    router: Router,
    publisher: i64,
}

async fn spawn_app() -> TestApp {
    let pool = libris_db::connect_in_memory().await.unwrap();
    let app = Application::with_pool(Settings::default(), pool);
    app.start().await.unwrap();

    let publisher = app
        .users()
        .create_user(&CreateUser::new("tester", "pass"))
        .await
        .unwrap()
        .id;

    TestApp {
        router: app.router(),
        publisher,
    }
}

impl TestApp {
    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn create_book(&self, name: &str, description: &str) -> Value {
        let response = self
            .send(
                "POST",
                "/api/books/",
                Some(json!({
                    "name": name,
                    "description": description,
                    "publisher": self.publisher,
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        json_body(response).await
    }
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn detail_uri(book: &Value) -> String {
    format!("/api/books/{}/", book["id"])
}

#[tokio::test]
async fn list_starts_empty() {
    let app = spawn_app().await;
    let response = app.send("GET", "/api/books/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn create_then_list() {
    let app = spawn_app().await;
    let created = app
        .create_book("Testing is Fun!!!", "when the right tools are available")
        .await;

    assert_eq!(created["name"], "Testing is Fun!!!");
    assert_eq!(created["description"], "when the right tools are available");
    assert_eq!(created["publisher"], app.publisher);

    let response = app.send("GET", "/api/books/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([created]));
}

#[tokio::test]
async fn detail_serializes_exactly_four_keys() {
    let app = spawn_app().await;
    let created = app
        .create_book("Title of Blog", "Words about the blog")
        .await;

    let response = app.send("GET", &detail_uri(&created), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "id": created["id"],
            "name": "Title of Blog",
            "description": "Words about the blog",
            "publisher": app.publisher,
        })
    );
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let app = spawn_app().await;
    for method in ["GET", "DELETE"] {
        let response = app.send(method, "/api/books/404/", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "not_found");
    }

    let response = app
        .send(
            "PUT",
            "/api/books/404/",
            Some(json!({"name": "x", "description": "y", "publisher": app.publisher})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_replaces_fields() {
    let app = spawn_app().await;
    let created = app
        .create_book("Title of Blog", "Words about the blog")
        .await;

    let response = app
        .send(
            "PUT",
            &detail_uri(&created),
            Some(json!({
                "name": "Testing is Still Fun!!!",
                "description": created["description"],
                "publisher": created["publisher"],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["name"], "Testing is Still Fun!!!");

    let response = app.send("GET", "/api/books/", None).await;
    let books = json_body(response).await;
    assert_eq!(books.as_array().unwrap().len(), 1);
    assert_eq!(books[0]["name"], "Testing is Still Fun!!!");
}

#[tokio::test]
async fn put_requires_every_field() {
    let app = spawn_app().await;
    let created = app.create_book("Dune", "Spice").await;

    let response = app
        .send("PUT", &detail_uri(&created), Some(json!({"name": "Dune Messiah"})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(
        body["error"]["details"],
        json!([
            {"field": "description", "error": "This field is required."},
            {"field": "publisher", "error": "This field is required."},
        ])
    );
}

#[tokio::test]
async fn patch_keeps_unspecified_fields() {
    let app = spawn_app().await;
    let created = app.create_book("Dune", "Spice").await;

    let response = app
        .send(
            "PATCH",
            &detail_uri(&created),
            Some(json!({"description": "Desert planet"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = json_body(response).await;
    assert_eq!(updated["name"], "Dune");
    assert_eq!(updated["description"], "Desert planet");
    assert_eq!(updated["publisher"], app.publisher);
}

#[tokio::test]
async fn patch_rejects_null_fields() {
    let app = spawn_app().await;
    let created = app.create_book("Dune", "Spice").await;

    let response = app
        .send("PATCH", &detail_uri(&created), Some(json!({"name": null})))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"]["details"],
        json!([{"field": "name", "error": "This field may not be null."}])
    );

    let response = app.send("GET", &detail_uri(&created), None).await;
    assert_eq!(json_body(response).await, created);
}

#[tokio::test]
async fn delete_returns_no_content() {
    let app = spawn_app().await;
    let created = app.create_book("Title of Blog", "Words about the blog").await;

    let response = app.send("DELETE", &detail_uri(&created), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send("GET", &detail_uri(&created), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.send("DELETE", &detail_uri(&created), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_name_is_rejected() {
    let app = spawn_app().await;
    let response = app
        .send(
            "POST",
            "/api/books/",
            Some(json!({
                "name": "x".repeat(65),
                "description": "too long",
                "publisher": app.publisher,
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(
        body["error"]["details"],
        json!([{"field": "name", "error": "Ensure this field has no more than 64 characters."}])
    );

    let response = app.send("GET", "/api/books/", None).await;
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn unknown_publisher_is_a_field_error() {
    let app = spawn_app().await;
    let response = app
        .send(
            "POST",
            "/api/books/",
            Some(json!({"name": "Orphan", "description": "No owner", "publisher": 9999})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"]["details"][0]["field"], "publisher");
}

#[tokio::test]
async fn malformed_payloads_are_bad_requests() {
    let app = spawn_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/books/")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "bad_request");

    let response = app
        .send(
            "POST",
            "/api/books/",
            Some(json!({"name": "Dune", "description": "Spice", "publisher": "tester"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send("GET", "/api/books/first/", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_publisher_removes_their_books() {
    let app = spawn_app().await;
    app.create_book("Dune", "Spice").await;
    app.create_book("Emma", "Matchmaking").await;

    let response = app
        .send("DELETE", &format!("/api/users/{}/", app.publisher), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send("GET", "/api/books/", None).await;
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn openapi_document_lists_book_routes() {
    let app = spawn_app().await;
    let response = app.send("GET", "/docs/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let spec = json_body(response).await;
    assert!(spec["paths"]["/api/books/"]["post"].is_object());
    assert!(spec["paths"]["/api/books/{id}/"]["patch"].is_object());
    assert!(spec["paths"]["/api/users/{id}/"]["delete"].is_object());
}
