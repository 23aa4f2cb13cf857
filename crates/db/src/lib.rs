//! SQLite connection pool and module migration runner.

use std::str::FromStr;

use anyhow::Context;
use libris_kernel::{settings::DatabaseSettings, Migration};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Open a pool for the configured database. Foreign keys are enforced on every
/// connection, which `ON DELETE CASCADE` relies on.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&settings.url)
        .with_context(|| format!("invalid database url '{}'", settings.url))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to database '{}'", settings.url))?;

    tracing::info!(target: "libris-db", url = %settings.url, "database pool ready");
    Ok(pool)
}

/// Open a private in-memory database. The pool holds exactly one connection
/// that never expires, since each SQLite memory connection is its own database.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .context("invalid in-memory database url")?
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("failed to open in-memory database")
}

/// Apply every migration not yet recorded in `_migrations`, in the given order.
/// Returns the number of migrations applied by this call.
pub async fn migrate(pool: &SqlitePool, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            module     TEXT NOT NULL,
            id         TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (module, id)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("failed to create migration ledger")?;

    let mut applied = 0;
    for (module, migration) in migrations {
        let done: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE module = ?1 AND id = ?2)",
        )
        .bind(module.as_str())
        .bind(migration.id)
        .fetch_one(pool)
        .await
        .context("failed to read migration ledger")?;

        if done {
            tracing::debug!(target: "libris-db", %module, id = migration.id, "migration already applied");
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(migration.up)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("migration '{}/{}' failed", module, migration.id))?;
        sqlx::query("INSERT INTO _migrations (module, id) VALUES (?1, ?2)")
            .bind(module.as_str())
            .bind(migration.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(target: "libris-db", %module, id = migration.id, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
