//! `/users/` endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use libris_http::AppResult;

use crate::{
    directory::UserDirectory,
    models::{CreateUser, User},
};

pub fn router(directory: UserDirectory) -> Router {
    Router::new()
        .route("/users/", post(create_user))
        .route("/users/{id}/", get(get_user).delete(delete_user))
        .with_state(directory)
}

async fn create_user(
    State(directory): State<UserDirectory>,
    payload: Result<Json<CreateUser>, JsonRejection>,
) -> AppResult<(StatusCode, Json<User>)> {
    let Json(input) = payload?;
    let user = directory.create_user(&input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(directory): State<UserDirectory>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<User>> {
    let Path(id) = id?;
    Ok(Json(directory.get(id).await?))
}

async fn delete_user(
    State(directory): State<UserDirectory>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    directory.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
