use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Migration, Module};

/// Core module initialization order (excluding HTTP server)
const CORE_MODULE_ORDER: &[&str] = &[
    "users", // Account identity, referenced by every catalog table
             // Note: HTTP server is started separately after all modules are initialized
];

/// Module registry for managing module lifecycle with core/custom separation
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    /// Create a new module registry
    pub fn new() -> Self {
        Self {
            core_modules: Vec::new(),
            custom_modules: Vec::new(),
        }
    }

    /// Register a core module with the registry
    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        if !CORE_MODULE_ORDER.contains(&module.name()) {
            tracing::warn!(
                module = module.name(),
                "core module has no fixed position, it runs after the ordered core modules"
            );
        }
        self.core_modules.push(module);
    }

    /// Register a custom module with the registry
    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// Get all registered modules (core + custom)
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        let mut all_modules = Vec::new();
        all_modules.extend(self.core_modules.iter());
        all_modules.extend(self.custom_modules.iter());
        all_modules
    }

    /// Get the number of core modules
    pub fn core_module_count(&self) -> usize {
        self.core_modules.len()
    }

    /// Get the number of custom modules
    pub fn custom_module_count(&self) -> usize {
        self.custom_modules.len()
    }

    /// Core modules in lifecycle order, followed by any core module missing
    /// from `CORE_MODULE_ORDER` in registration order
    fn ordered_core(&self) -> Vec<&Arc<dyn Module>> {
        let mut ordered: Vec<_> = CORE_MODULE_ORDER
            .iter()
            .filter_map(|&module_name| self.core_modules.iter().find(|m| m.name() == module_name))
            .collect();
        ordered.extend(
            self.core_modules
                .iter()
                .filter(|m| !CORE_MODULE_ORDER.contains(&m.name())),
        );
        ordered
    }

    /// Initialize core modules in the correct order
    pub async fn init_core_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            "initializing core modules in order: {:?}",
            CORE_MODULE_ORDER
        );

        for module in self.ordered_core() {
            tracing::info!(module = module.name(), "initializing core module");

            module.init(ctx).await.with_context(|| {
                format!("failed to initialize core module '{}'", module.name())
            })?;
        }

        Ok(())
    }

    /// Initialize custom modules
    pub async fn init_custom_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("initializing {} custom modules", self.custom_modules.len());

        for module in &self.custom_modules {
            tracing::info!(module = module.name(), "initializing custom module");

            module.init(ctx).await.with_context(|| {
                format!("failed to initialize custom module '{}'", module.name())
            })?;
        }

        Ok(())
    }

    /// Start core modules in the correct order
    pub async fn start_core_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("starting core modules in order: {:?}", CORE_MODULE_ORDER);

        for module in self.ordered_core() {
            tracing::info!(module = module.name(), "starting core module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start core module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Start custom modules
    pub async fn start_custom_modules(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!("starting {} custom modules", self.custom_modules.len());

        for module in &self.custom_modules {
            tracing::info!(module = module.name(), "starting custom module");

            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start custom module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop custom modules first (reverse order)
    pub async fn stop_custom_modules(&self) -> anyhow::Result<()> {
        tracing::info!("stopping {} custom modules", self.custom_modules.len());

        for module in self.custom_modules.iter().rev() {
            tracing::info!(module = module.name(), "stopping custom module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop custom module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Stop core modules in reverse order
    pub async fn stop_core_modules(&self) -> anyhow::Result<()> {
        tracing::info!("stopping core modules in reverse order");

        for module in self.ordered_core().into_iter().rev() {
            tracing::info!(module = module.name(), "stopping core module");

            module
                .stop()
                .await
                .with_context(|| format!("failed to stop core module '{}'", module.name()))?;
        }

        Ok(())
    }

    /// Collect all migrations: core modules in lifecycle order, then custom
    /// modules in registration order. Tables owned by core modules therefore
    /// exist before custom tables reference them.
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations = Vec::new();

        for module in self
            .ordered_core()
            .into_iter()
            .chain(self.custom_modules.iter())
        {
            for migration in module.migrations() {
                migrations.push((module.name().to_string(), migration));
            }
        }

        migrations
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
