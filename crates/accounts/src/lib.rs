//! Account identity for Libris. The `users` core module owns the `users`
//! table that catalog tables reference by id.

pub mod directory;
pub mod models;
mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use libris_kernel::{InitCtx, Migration, Module};
use serde_json::json;

pub use directory::UserDirectory;
pub use models::{CreateUser, User};

/// Users module: account registration, lookup and removal
pub struct UsersModule {
    directory: UserDirectory,
}

impl UsersModule {
    pub fn new(directory: UserDirectory) -> Self {
        Self { directory }
    }
}

/// Schema owned by the users module
pub fn migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_init",
        up: r#"
            CREATE TABLE users (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                username      VARCHAR(150) NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            );
            "#,
    }]
}

#[async_trait]
impl Module for UsersModule {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "users module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.directory.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        });
        let user = json!({
            "application/json": {
                "schema": { "$ref": "#/components/schemas/User" }
            }
        });
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        }]);

        Some(json!({
            "paths": {
                "/users/": {
                    "post": {
                        "summary": "Register a user",
                        "tags": ["Users"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/CreateUser" }
                                }
                            }
                        },
                        "responses": {
                            "201": { "description": "User created", "content": user },
                            "400": { "description": "Validation error", "content": error },
                            "409": { "description": "Username already exists", "content": error }
                        }
                    }
                },
                "/users/{id}/": {
                    "get": {
                        "summary": "Get a user",
                        "tags": ["Users"],
                        "parameters": id_param,
                        "responses": {
                            "200": { "description": "User", "content": user },
                            "404": { "description": "User not found", "content": error }
                        }
                    },
                    "delete": {
                        "summary": "Delete a user and every book it publishes",
                        "tags": ["Users"],
                        "parameters": id_param,
                        "responses": {
                            "204": { "description": "User deleted" },
                            "404": { "description": "User not found", "content": error }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "User": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "integer",
                                "format": "int64",
                                "description": "Unique identifier for the user"
                            },
                            "username": {
                                "type": "string",
                                "description": "Login name"
                            }
                        },
                        "required": ["id", "username"]
                    },
                    "CreateUser": {
                        "type": "object",
                        "properties": {
                            "username": { "type": "string", "maxLength": 150 },
                            "password": { "type": "string", "format": "password" }
                        },
                        "required": ["username", "password"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        migrations()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "users module stopped");
        Ok(())
    }
}

/// Create a new instance of the users module
pub fn create_module(directory: UserDirectory) -> Arc<dyn Module> {
    Arc::new(UsersModule::new(directory))
}
