//! Libris application library
//!
//! Wires the catalog modules into the module registry and drives the
//! application lifecycle shared by the server binary and the CLI.

pub mod app;
pub mod modules;

pub use app::Application;
