pub mod books;

use libris_accounts::UserDirectory;
use libris_kernel::ModuleRegistry;
use sqlx::SqlitePool;

/// Register all project modules with the registry, wiring each one to the pool
pub fn register_all(registry: &mut ModuleRegistry, pool: &SqlitePool) {
    let users = UserDirectory::new(pool.clone());

    registry.register_core(libris_accounts::create_module(users.clone()));
    registry.register_custom(books::create_module(books::BookStore::new(
        pool.clone(),
        users,
    )));
}
