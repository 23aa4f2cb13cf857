//! Account storage: registration, lookup, removal and password checks.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde_json::json;
use sqlx::{Row, SqlitePool};
use validator::Validate;

use libris_http::{AppError, AppResult};

use crate::models::{CreateUser, User};

#[derive(Clone)]
pub struct UserDirectory {
    pool: SqlitePool,
}

impl UserDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a user, storing an argon2 hash of the password
    pub async fn create_user(&self, input: &CreateUser) -> AppResult<User> {
        input.validate()?;
        let (Some(username), Some(password)) = (&input.username, &input.password) else {
            return Err(AppError::bad_request("username and password are required"));
        };

        let password_hash = hash_password(password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES (?1, ?2)
            RETURNING id, username
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::conflict(
                vec![json!({
                    "field": "username",
                    "error": "A user with that username already exists."
                })],
                "Username already exists",
            ),
            other => AppError::from(other),
        })?;

        tracing::info!(user_id = user.id, username = %user.username, "user created");
        Ok(user)
    }

    /// Get user by ID
    pub async fn get(&self, id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT id, username FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User with id {} not found", id)))
    }

    /// Referential lookup used to validate foreign keys
    pub async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Remove a user. Rows referencing the user with `ON DELETE CASCADE`
    /// are removed by the database in the same statement.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User with id {} not found", id)));
        }

        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    /// Resolve a user from credentials
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid username or password"))?;

        let stored: String = row.try_get("password_hash")?;
        let parsed_hash = PasswordHash::new(&stored)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid password hash: {}", e)))?;

        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            tracing::warn!(%username, "authentication failed");
            return Err(AppError::unauthorized("Invalid username or password"));
        }

        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
        })
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}
