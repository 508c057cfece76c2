//! Bulk import of sites from a plain-text URL list.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::database::{SiteStore, StoreError};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub duplicates: usize,
}

/// One URL per line; surrounding whitespace trimmed, blank lines skipped
pub fn parse_url_list(contents: &str) -> Vec<&str> {
    contents.lines().map(str::trim).filter(|line| !line.is_empty()).collect()
}

/// Insert every URL with the default name, ignoring ones already tracked
pub async fn import_urls(store: &dyn SiteStore, contents: &str) -> Result<ImportSummary, StoreError> {
    let mut summary = ImportSummary::default();

    for url in parse_url_list(contents) {
        match store.add_site(None, url).await? {
            Some(id) => {
                info!("Imported {} as site {}", url, id);
                summary.added += 1;
            }
            None => summary.duplicates += 1,
        }
    }

    Ok(summary)
}

pub async fn import_file(store: &dyn SiteStore, path: &Path) -> Result<ImportSummary> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read URL list {}", path.display()))?;

    if parse_url_list(&contents).is_empty() {
        warn!("{} contains no URLs", path.display());
    }

    Ok(import_urls(store, &contents).await?)
}
