// CardForge shared library
// Models, repositories, schema migrations, and utilities for the card
// authoring application. The GUI shell consumes this crate; nothing in
// here depends on a particular UI toolkit.

pub mod migrations;
pub mod models;
pub mod repositories;
pub mod utils;

// Re-export the common surface for consumers
pub use migrations::{
    ensure_up_to_date, verify_database_integrity, IntegrityReport, MigrationError,
    MigrationReport, SchemaVersion, TemplateReconcileSummary, CURRENT_VERSION,
};
pub use models::*;
pub use repositories::{ActorRepository, CardRepository};
pub use utils::database::Database;
pub use utils::settings::{AppSettings, SettingsStore};
