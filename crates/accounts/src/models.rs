use serde::{Deserialize, Serialize};
use validator::Validate;

/// A registered account. The password hash never leaves the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.username)
    }
}

/// Request model for registering a user.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(
        required(message = "This field is required."),
        custom(function = "libris_http::validation::not_blank"),
        length(max = 150, message = "Ensure this field has no more than 150 characters.")
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "libris_http::validation::not_blank")
    )]
    pub password: Option<String>,
}

impl CreateUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }
}
