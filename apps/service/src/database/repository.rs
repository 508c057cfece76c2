use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Row, params};

use super::error::StoreError;
use super::models::{DEFAULT_SITE_NAME, HistoryRecord, MonitoredSite, from_unix};
use crate::monitoring::types::CheckResult;
use crate::pool::{LibsqlManager, LibsqlPool};

type StoreResult<T> = Result<T, StoreError>;

/// Storage contract for monitored sites and their probe history
#[async_trait]
pub trait SiteStore: Send + Sync {
    /// Active sites in stored order (ascending id)
    async fn active_sites(&self) -> StoreResult<Vec<MonitoredSite>>;

    /// Write the current-state triple and append the history row in one transaction
    async fn record_check(
        &self,
        site_id: i64,
        result: &CheckResult,
        checked_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Insert a site; `None` when the URL is already tracked
    async fn add_site(&self, name: Option<&str>, url: &str) -> StoreResult<Option<i64>>;

    async fn list_sites(&self) -> StoreResult<Vec<MonitoredSite>>;

    async fn get_site(&self, id: i64) -> StoreResult<Option<MonitoredSite>>;

    async fn set_active(&self, id: i64, active: bool) -> StoreResult<()>;

    /// Delete a site; its history goes with it
    async fn delete_site(&self, id: i64) -> StoreResult<()>;

    /// Most recent history rows for a site, newest first
    async fn history_for(&self, site_id: i64, limit: usize) -> StoreResult<Vec<HistoryRecord>>;

    /// Delete history rows checked before `cutoff`, returning how many went
    async fn purge_history_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

const SITE_COLUMNS: &str =
    "id, name, url, active, status, response_time, last_checked_at, created_at";

/// LibSQL-backed store
pub struct LibsqlStore {
    pool: LibsqlPool,
}

impl LibsqlStore {
    pub fn new(pool: LibsqlPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool
    async fn get_conn(&self) -> StoreResult<deadpool::managed::Object<LibsqlManager>> {
        Ok(self.pool.get().await?)
    }

    async fn query_sites(&self, filter: &str) -> StoreResult<Vec<MonitoredSite>> {
        let conn = self.get_conn().await?;
        let sql = format!("SELECT {SITE_COLUMNS} FROM sites {filter} ORDER BY id ASC");
        let mut rows = conn.query(&sql, ()).await?;

        let mut sites = Vec::new();
        while let Some(row) = rows.next().await? {
            sites.push(site_from_row(&row)?);
        }
        Ok(sites)
    }
}

fn site_from_row(row: &Row) -> StoreResult<MonitoredSite> {
    Ok(MonitoredSite {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        active: row.get::<i64>(3)? != 0,
        status: row.get(4)?,
        response_time: row.get(5)?,
        last_checked_at: row.get::<Option<i64>>(6)?.map(from_unix),
        created_at: from_unix(row.get(7)?),
    })
}

#[async_trait]
impl SiteStore for LibsqlStore {
    async fn active_sites(&self) -> StoreResult<Vec<MonitoredSite>> {
        self.query_sites("WHERE active = 1").await
    }

    async fn record_check(
        &self,
        site_id: i64,
        result: &CheckResult,
        checked_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let conn = self.get_conn().await?;
        let label = result.status_label();
        let checked_at = checked_at.timestamp();

        let tx = conn.transaction().await?;
        let updated = tx
            .execute(
                "UPDATE sites SET status = ?, response_time = ?, last_checked_at = ? WHERE id = ?",
                params![label.clone(), result.elapsed_seconds, checked_at, site_id],
            )
            .await?;

        if updated == 0 {
            // Deleted while the tick was running
            tx.rollback().await?;
            return Err(StoreError::UnknownSite(site_id));
        }

        tx.execute(
            "INSERT INTO history (site_id, status, response_time, checked_at) VALUES (?, ?, ?, ?)",
            params![site_id, label, result.elapsed_seconds, checked_at],
        )
        .await?;
        tx.commit().await?;

        Ok(())
    }

    async fn add_site(&self, name: Option<&str>, url: &str) -> StoreResult<Option<i64>> {
        let url = url.trim();
        if url.is_empty() {
            return Err(StoreError::InvalidUrl);
        }
        let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(DEFAULT_SITE_NAME);

        let conn = self.get_conn().await?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO sites (name, url, created_at) VALUES (?, ?, ?)",
                params![name, url, Utc::now().timestamp()],
            )
            .await?;

        if inserted == 0 { Ok(None) } else { Ok(Some(conn.last_insert_rowid())) }
    }

    async fn list_sites(&self) -> StoreResult<Vec<MonitoredSite>> {
        self.query_sites("").await
    }

    async fn get_site(&self, id: i64) -> StoreResult<Option<MonitoredSite>> {
        let conn = self.get_conn().await?;
        let sql = format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?");
        let mut rows = conn.query(&sql, params![id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(site_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn set_active(&self, id: i64, active: bool) -> StoreResult<()> {
        let conn = self.get_conn().await?;
        let updated = conn
            .execute("UPDATE sites SET active = ? WHERE id = ?", params![active as i64, id])
            .await?;

        if updated == 0 { Err(StoreError::UnknownSite(id)) } else { Ok(()) }
    }

    async fn delete_site(&self, id: i64) -> StoreResult<()> {
        let conn = self.get_conn().await?;
        let deleted = conn.execute("DELETE FROM sites WHERE id = ?", params![id]).await?;

        if deleted == 0 { Err(StoreError::UnknownSite(id)) } else { Ok(()) }
    }

    async fn history_for(&self, site_id: i64, limit: usize) -> StoreResult<Vec<HistoryRecord>> {
        let conn = self.get_conn().await?;
        let mut rows = conn
            .query(
                "SELECT id, site_id, status, response_time, checked_at FROM history \
                 WHERE site_id = ? ORDER BY checked_at DESC, id DESC LIMIT ?",
                params![site_id, limit as i64],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(HistoryRecord {
                id: row.get(0)?,
                site_id: row.get(1)?,
                status: row.get(2)?,
                response_time: row.get(3)?,
                checked_at: from_unix(row.get(4)?),
            });
        }
        Ok(records)
    }

    async fn purge_history_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let conn = self.get_conn().await?;
        let deleted = conn
            .execute("DELETE FROM history WHERE checked_at < ?", params![cutoff.timestamp()])
            .await?;
        Ok(deleted)
    }
}
