pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Migration, Module};
use serde_json::json;

pub use models::{Book, BookChanges, BookInput};
pub use store::BookStore;

/// Books module: the catalog resource
pub struct BooksModule {
    store: BookStore,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self { store }
    }
}

/// Schema owned by the books module. Depends on the `users` table.
pub fn migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_init",
        up: r#"
            CREATE TABLE books (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                name         VARCHAR(64) NOT NULL,
                description  TEXT NOT NULL,
                publisher_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX books_publisher_id ON books (publisher_id);
            "#,
    }]
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.store.count().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        });
        let book = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        });
        let body = |schema: &str| {
            json!({
                "required": true,
                "content": {
                    "application/json": {
                        "schema": { "$ref": format!("#/components/schemas/{}", schema) }
                    }
                }
            })
        };
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);

        Some(json!({
            "paths": {
                "/books/": {
                    "get": {
                        "summary": "List books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "List of books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": { "description": "Internal server error", "content": error }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": body("BookInput"),
                        "responses": {
                            "201": { "description": "Book created", "content": book },
                            "400": { "description": "Validation error", "content": error }
                        }
                    }
                },
                "/books/{id}/": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "200": { "description": "Book", "content": book },
                            "404": { "description": "Book not found", "content": error }
                        }
                    },
                    "put": {
                        "summary": "Replace a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "requestBody": body("BookInput"),
                        "responses": {
                            "200": { "description": "Book updated", "content": book },
                            "400": { "description": "Validation error", "content": error },
                            "404": { "description": "Book not found", "content": error }
                        }
                    },
                    "patch": {
                        "summary": "Update some fields of a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "requestBody": body("BookChanges"),
                        "responses": {
                            "200": { "description": "Book updated", "content": book },
                            "400": { "description": "Validation error", "content": error },
                            "404": { "description": "Book not found", "content": error }
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": id_param,
                        "responses": {
                            "204": { "description": "Book deleted" },
                            "404": { "description": "Book not found", "content": error }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "integer",
                                "format": "int64",
                                "description": "Unique identifier for the book"
                            },
                            "name": {
                                "type": "string",
                                "maxLength": 64,
                                "description": "Title of the book"
                            },
                            "description": {
                                "type": "string",
                                "description": "Free-form description"
                            },
                            "publisher": {
                                "type": "integer",
                                "format": "int64",
                                "description": "Id of the user that owns the book"
                            }
                        },
                        "required": ["id", "name", "description", "publisher"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "maxLength": 64 },
                            "description": { "type": "string" },
                            "publisher": { "type": "integer", "format": "int64" }
                        },
                        "required": ["name", "description", "publisher"]
                    },
                    "BookChanges": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string", "maxLength": 64 },
                            "description": { "type": "string" },
                            "publisher": { "type": "integer", "format": "int64" }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        migrations()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: BookStore) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
