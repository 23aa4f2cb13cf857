//! Application lifecycle: connect, migrate, init, start, serve, stop.

use anyhow::Context;
use axum::Router;
use libris_accounts::UserDirectory;
use libris_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sqlx::SqlitePool;

use crate::modules;

pub struct Application {
    settings: Settings,
    pool: SqlitePool,
    registry: ModuleRegistry,
}

impl Application {
    /// Connect to the configured database and register every module
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let pool = libris_db::connect(&settings.database).await?;
        Ok(Self::with_pool(settings, pool))
    }

    /// Register every module against an existing pool
    pub fn with_pool(settings: Settings, pool: SqlitePool) -> Self {
        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &pool);

        tracing::info!(
            core = registry.core_module_count(),
            custom = registry.custom_module_count(),
            "modules registered"
        );

        Self {
            settings,
            pool,
            registry,
        }
    }

    /// Apply pending module migrations, returning how many ran
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let migrations = self.registry.collect_migrations();
        let applied = libris_db::migrate(&self.pool, &migrations)
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, total = migrations.len(), "migrations complete");
        Ok(applied)
    }

    /// Migrate, then initialize and start core and custom modules
    pub async fn start(&self) -> anyhow::Result<()> {
        self.migrate().await?;

        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.init_core_modules(&ctx).await?;
        self.registry.init_custom_modules(&ctx).await?;
        self.registry.start_core_modules(&ctx).await?;
        self.registry.start_custom_modules(&ctx).await?;
        Ok(())
    }

    /// Stop custom modules, then core modules, then close the pool
    pub async fn stop(&self) -> anyhow::Result<()> {
        self.registry.stop_custom_modules().await?;
        self.registry.stop_core_modules().await?;
        self.pool.close().await;
        Ok(())
    }

    /// Full lifecycle around the HTTP server; returns after graceful shutdown
    pub async fn run(self) -> anyhow::Result<()> {
        self.start().await?;

        let served = libris_http::start_server(&self.registry, &self.settings).await;
        let stopped = self.stop().await;

        served?;
        stopped?;
        tracing::info!("libris-app shut down");
        Ok(())
    }

    /// The complete HTTP router, middleware included
    pub fn router(&self) -> Router {
        libris_http::build_router(&self.registry, &self.settings)
    }

    pub fn users(&self) -> UserDirectory {
        UserDirectory::new(self.pool.clone())
    }
}
