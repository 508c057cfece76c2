/// Database layer
///
/// Site state and probe history live in a local LibSQL (SQLite) file.
/// The monitor engine only talks to it through the [`SiteStore`] trait.

pub mod error;
pub mod migrations;
pub mod models;
pub mod repository;

pub use error::StoreError;
pub use models::MonitoredSite;
pub use repository::{LibsqlStore, SiteStore};

use anyhow::Result;

/// Initialize database with schema
pub async fn initialize_database(conn: &libsql::Connection) -> Result<()> {
    migrations::run_migrations(conn).await
}
