use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Query(#[from] libsql::Error),

    #[error("Could not get a database connection: {0}")]
    Pool(#[from] deadpool::managed::PoolError<libsql::Error>),

    #[error("Site {0} does not exist")]
    UnknownSite(i64),

    #[error("Site URL must not be empty")]
    InvalidUrl,
}
