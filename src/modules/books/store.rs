//! Persistence for `Book` records.

use sqlx::SqlitePool;
use validator::Validate;

use libris_accounts::UserDirectory;
use libris_http::{AppError, AppResult};

use super::models::{Book, BookChanges, BookInput};

#[derive(Clone)]
pub struct BookStore {
    pool: SqlitePool,
    users: UserDirectory,
}

impl BookStore {
    pub fn new(pool: SqlitePool, users: UserDirectory) -> Self {
        Self { pool, users }
    }

    /// Create a book owned by an existing user
    pub async fn create(&self, input: &BookInput) -> AppResult<Book> {
        input.validate()?;
        let (Some(name), Some(description), Some(publisher)) =
            (&input.name, &input.description, input.publisher)
        else {
            return Err(AppError::bad_request("name, description and publisher are required"));
        };
        self.ensure_publisher(publisher).await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (name, description, publisher_id)
            VALUES (?1, ?2, ?3)
            RETURNING id, name, description, publisher_id
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(publisher)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| publisher_violation(e, publisher))?;

        tracing::info!(book_id = book.id, publisher = book.publisher, "book created");
        Ok(book)
    }

    /// Get book by ID
    pub async fn get(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, name, description, publisher_id FROM books WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| book_not_found(id))
    }

    /// All books in insertion order
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, name, description, publisher_id FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Apply the supplied fields; the rest keep their stored values.
    /// An unknown id is reported before any validation failure.
    pub async fn update(&self, id: i64, changes: &BookChanges) -> AppResult<Book> {
        let current = self.get(id).await?;
        let merged = changes.apply_to(&current)?;
        merged.validate()?;
        let (Some(name), Some(description), Some(publisher)) =
            (&merged.name, &merged.description, merged.publisher)
        else {
            return Err(AppError::bad_request("name, description and publisher are required"));
        };
        if changes.supplies_publisher() {
            self.ensure_publisher(publisher).await?;
        }

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET name = ?2, description = ?3, publisher_id = ?4
            WHERE id = ?1
            RETURNING id, name, description, publisher_id
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(publisher)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| publisher_violation(e, publisher))?
        .ok_or_else(|| book_not_found(id))?;

        tracing::info!(book_id = book.id, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(book_not_found(id));
        }

        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    async fn ensure_publisher(&self, publisher: i64) -> AppResult<()> {
        if self.users.exists(publisher).await? {
            Ok(())
        } else {
            Err(unknown_publisher(publisher))
        }
    }
}

fn book_not_found(id: i64) -> AppError {
    AppError::not_found(format!("Book with id {} not found", id))
}

fn unknown_publisher(publisher: i64) -> AppError {
    AppError::invalid_field(
        "publisher",
        format!("Invalid pk \"{}\" - object does not exist.", publisher),
    )
}

/// The publisher can vanish between the existence check and the write;
/// the foreign key then rejects the statement.
fn publisher_violation(error: sqlx::Error, publisher: i64) -> AppError {
    match error {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => unknown_publisher(publisher),
        other => AppError::from(other),
    }
}
