//! Vinyl record price tracker.
//!
//! Scrapes product pages for artist, album and price, keeps one row per
//! record and one price observation per record per day in DuckDB, and
//! answers latest-price and price-history queries.
//!
//! # Quick start
//!
//! ```no_run
//! use vinyl_tracker::VinylTracker;
//!
//! # async fn run() -> vinyl_tracker::Result<()> {
//! let tracker = VinylTracker::builder().database_path("records.duckdb").build()?;
//!
//! let collector = tracker.collector()?;
//! let urls = vinyl_tracker::page::read_url_list("input.txt")?;
//! let scraped = collector.collect(&urls).await?;
//! tracker.ingest(&scraped)?;
//!
//! for row in tracker.prices().latest()? {
//!     println!("{} - {}: {}", row.artist, row.album, row.price);
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod async_client;
pub mod collector;
pub mod config;
pub mod connection;
pub mod display;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod page;
pub mod queries;
pub mod server;
pub mod sql_builder;

pub use async_client::AsyncVinylTracker;
pub use collector::Collector;
pub use config::Config;
pub use connection::Connection;
pub use error::{Result, TrackerError};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use models::{LatestPrice, ParsedRecord, PriceHistory, PricePoint, PriceTrend, RecordEntity, SortKey};
pub use sql_builder::SqlBuilder;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// VinylTrackerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`VinylTracker`] instance.
pub struct VinylTrackerBuilder {
    database_path: Option<PathBuf>,
    timeout: Duration,
    concurrency: usize,
    user_agent: String,
}

impl Default for VinylTrackerBuilder {
    fn default() -> Self {
        Self {
            database_path: None,
            timeout: collector::DEFAULT_TIMEOUT,
            concurrency: collector::DEFAULT_CONCURRENCY,
            user_agent: config::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl VinylTrackerBuilder {
    /// Start from the values of a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self {
            database_path: Some(config.database.path.clone()),
            timeout: config.scrape.timeout(),
            concurrency: config.scrape.concurrency,
            user_agent: config.scrape.user_agent.clone(),
        }
    }

    /// Set the DuckDB database file. `:memory:` keeps everything in memory.
    ///
    /// If not set, the platform data directory is used (e.g.
    /// `~/.local/share/vinyl-tracker/records.duckdb` on Linux).
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use an in-memory database.
    pub fn in_memory(self) -> Self {
        self.database_path(config::IN_MEMORY)
    }

    /// Set the per-page fetch timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many pages may be fetched at once. Defaults to 10.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the User-Agent header sent with page requests.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Open the database (creating the schema if needed) and build the tracker.
    pub fn build(self) -> Result<VinylTracker> {
        if self.concurrency == 0 {
            return Err(TrackerError::InvalidArgument(
                "concurrency must be at least 1".into(),
            ));
        }
        let path = self
            .database_path
            .unwrap_or_else(config::default_database_path);
        let conn = Connection::open(&path)?;
        Ok(VinylTracker {
            conn,
            database_path: path,
            timeout: self.timeout,
            concurrency: self.concurrency,
            user_agent: self.user_agent,
        })
    }
}

// ---------------------------------------------------------------------------
// VinylTracker
// ---------------------------------------------------------------------------

/// The main entry point: owns the store connection and the scrape settings.
///
/// Created via [`VinylTracker::builder()`].
pub struct VinylTracker {
    conn: Connection,
    database_path: PathBuf,
    timeout: Duration,
    concurrency: usize,
    user_agent: String,
}

impl VinylTracker {
    /// Create a new builder for configuring the tracker.
    pub fn builder() -> VinylTrackerBuilder {
        VinylTrackerBuilder::default()
    }

    /// Access the record query interface.
    pub fn records(&self) -> queries::records::RecordQuery<'_> {
        queries::records::RecordQuery::new(&self.conn)
    }

    /// Access the price query interface.
    pub fn prices(&self) -> queries::prices::PriceQuery<'_> {
        queries::prices::PriceQuery::new(&self.conn)
    }

    /// Build an HTTP collector using this tracker's scrape settings.
    pub fn collector(&self) -> Result<Collector<HttpFetcher>> {
        let fetcher = HttpFetcher::new(&self.user_agent, self.timeout)?;
        Ok(Collector::new(fetcher)
            .concurrency(self.concurrency)
            .timeout(self.timeout))
    }

    /// Persist a batch of scraped records with today's date.
    ///
    /// Records are written one after another; the first failure stops the
    /// batch and earlier writes stay committed.
    pub fn ingest(&self, records: &[ParsedRecord]) -> Result<Vec<i64>> {
        let store = self.records();
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            ids.push(store.insert_with_price(record)?);
        }
        tracing::info!(records = ids.len(), "batch persisted");
        Ok(ids)
    }

    /// Path of the open database (`:memory:` for in-memory stores).
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for VinylTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VinylTracker(database={}, concurrency={}, timeout={}s)",
            self.database_path.display(),
            self.concurrency,
            self.timeout.as_secs()
        )
    }
}
