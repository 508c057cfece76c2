use std::path::Path;
use std::time::Duration;

use deadpool::managed::{self, Pool, RecycleResult};
use libsql::{Connection, Database, Error as LibsqlError};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LibsqlManager {
    database: Database,
}

impl LibsqlManager {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

impl managed::Manager for LibsqlManager {
    type Type = Connection;
    type Error = LibsqlError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        let conn = self.database.connect()?;
        // SQLite keeps this per connection; history cascades depend on it
        conn.execute("PRAGMA foreign_keys = ON", ()).await?;
        // Wait out the retention job instead of failing the write
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    async fn recycle(
        &self,
        conn: &mut Self::Type,
        _: &managed::Metrics,
    ) -> RecycleResult<Self::Error> {
        conn.query("SELECT 1", ()).await?.next().await?.ok_or(LibsqlError::QueryReturnedNoRows)?;
        Ok(())
    }
}

pub type LibsqlPool = Pool<LibsqlManager>;

/// Open (or create) the local database file and wrap it in a connection pool.
pub async fn open_pool(path: impl AsRef<Path>) -> anyhow::Result<LibsqlPool> {
    let database = libsql::Builder::new_local(path.as_ref()).build().await?;
    let pool = Pool::builder(LibsqlManager::new(database))
        .config(managed::PoolConfig::default())
        .build()?;
    Ok(pool)
}
