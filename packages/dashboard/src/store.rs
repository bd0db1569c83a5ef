//! Cache-wrapped incident loading.
//!
//! [`IncidentStore::load`] never fails: a fetch or processing error is
//! logged and returned as an empty table with an error [`Notice`]. Failed
//! loads are not cached, so the next interaction tries again.

use chrono::{DateTime, Utc};
use crime_explorer_source::socrata::{build_client, fetch_records};
use crime_explorer_source::{SourceError, normalize::normalize};
use crime_explorer_source_models::IncidentTable;

use crate::DashboardError;
use crate::cache::TtlCache;
use crate::config::DashboardConfig;
use crate::notice::{Notice, NoticeKind};

#[derive(Debug, Clone)]
struct CachedTable {
    table: IncidentTable,
    fetched_at: DateTime<Utc>,
}

/// Result of one load. `table` is empty whenever `notice` is an error.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: IncidentTable,
    /// When the table was fetched; `None` if the load failed.
    pub fetched_at: Option<DateTime<Utc>>,
    pub notice: Option<Notice>,
}

impl LoadedTable {
    fn failed(err: &SourceError) -> Self {
        Self {
            table: IncidentTable::empty(),
            fetched_at: None,
            notice: Some(Notice::from_source_error(err)),
        }
    }

    fn loaded(cached: CachedTable) -> Self {
        let notice = cached
            .table
            .is_empty()
            .then(|| NoticeKind::EmptyDataset.into());
        Self {
            table: cached.table,
            fetched_at: Some(cached.fetched_at),
            notice,
        }
    }
}

/// Process-lifetime store of the normalized incident table.
pub struct IncidentStore {
    config: DashboardConfig,
    client: reqwest::Client,
    cache: TtlCache<CachedTable>,
}

impl IncidentStore {
    /// Creates a store whose HTTP client uses the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Source`] if the HTTP client cannot be
    /// built.
    pub fn new(config: DashboardConfig) -> Result<Self, DashboardError> {
        let client = build_client(config.fetch_timeout())?;
        let cache = TtlCache::new(config.cache_ttl());
        Ok(Self {
            config,
            client,
            cache,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Returns the cached table, fetching and normalizing it on a miss.
    pub async fn load(&self) -> LoadedTable {
        let url = self.config.request_url();
        let result = self
            .cache
            .get_or_try_compute(&url, || fetch_table(&self.client, &url))
            .await;

        match result {
            Ok(cached) => LoadedTable::loaded(cached),
            Err(err) => {
                log::error!("Failed to load incidents: {err}");
                LoadedTable::failed(&err)
            }
        }
    }

    /// Discards the cached table and loads it again.
    pub async fn refresh(&self) -> LoadedTable {
        let url = self.config.request_url();
        if self.cache.invalidate(&url).await {
            log::info!("Discarded cached incidents for {url}");
        }
        self.load().await
    }
}

async fn fetch_table(client: &reqwest::Client, url: &str) -> Result<CachedTable, SourceError> {
    let records = fetch_records(client, url).await?;
    let table = normalize(&records)?;
    Ok(CachedTable {
        table,
        fetched_at: Utc::now(),
    })
}
