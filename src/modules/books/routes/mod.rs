//! HTTP resource for books: list/create on `/books/`, detail on `/books/{id}/`.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use validator::Validate;

use libris_http::AppResult;

use super::{
    models::{Book, BookChanges, BookInput},
    store::BookStore,
};

pub fn router(store: BookStore) -> Router {
    Router::new()
        .route("/books/", get(list_books).post(create_book))
        .route(
            "/books/{id}/",
            get(get_book)
                .put(replace_book)
                .patch(update_book)
                .delete(delete_book),
        )
        .with_state(store)
}

async fn list_books(State(store): State<BookStore>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(store.list().await?))
}

async fn create_book(
    State(store): State<BookStore>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let Json(input) = payload?;
    let book = store.create(&input).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn get_book(
    State(store): State<BookStore>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Book>> {
    let Path(id) = id?;
    Ok(Json(store.get(id).await?))
}

/// `PUT`: every field must be present
async fn replace_book(
    State(store): State<BookStore>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    // Unknown ids answer 404 even when the body is also invalid.
    store.get(id).await?;
    input.validate()?;
    Ok(Json(store.update(id, &input.into()).await?))
}

/// `PATCH`: only the supplied fields change
async fn update_book(
    State(store): State<BookStore>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookChanges>, JsonRejection>,
) -> AppResult<Json<Book>> {
    let Path(id) = id?;
    let Json(changes) = payload?;
    Ok(Json(store.update(id, &changes).await?))
}

async fn delete_book(
    State(store): State<BookStore>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
