//! Async wrapper around [`VinylTracker`] for use in async runtimes.
//!
//! Store operations run on Tokio's blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the event loop free while DuckDB
//! works. Page collection stays on the async runtime.
//!
//! # Example
//!
//! ```no_run
//! use vinyl_tracker::{AsyncVinylTracker, VinylTracker};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tracker = AsyncVinylTracker::build(VinylTracker::builder().in_memory())
//!         .await
//!         .unwrap();
//!
//!     let latest = tracker.latest().await.unwrap();
//!     let history = tracker.run(|t| t.prices().history(1)).await.unwrap();
//! }
//! ```

use std::sync::{Arc, Mutex};

use crate::collector::Collector;
use crate::error::{Result, TrackerError};
use crate::fetcher::PageFetcher;
use crate::models::{LatestPrice, ParsedRecord, PriceHistory};
use crate::{VinylTracker, VinylTrackerBuilder};

/// Async wrapper around [`VinylTracker`].
///
/// The tracker is behind a [`Mutex`], so store calls from concurrent
/// handlers are serialized on the single connection. Cloning is cheap and
/// shares the same tracker.
#[derive(Clone)]
pub struct AsyncVinylTracker {
    inner: Arc<Mutex<VinylTracker>>,
}

impl AsyncVinylTracker {
    /// Wrap an already built tracker.
    pub fn new(tracker: VinylTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    /// Build a tracker on the blocking thread pool and wrap it.
    pub async fn build(builder: VinylTrackerBuilder) -> Result<Self> {
        tokio::task::spawn_blocking(move || builder.build().map(Self::new))
            .await
            .map_err(|e| TrackerError::Task(format!("Task join error: {e}")))?
    }

    /// Run a sync tracker operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&VinylTracker) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let tracker = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = tracker
                .lock()
                .map_err(|_| TrackerError::Task("tracker lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| TrackerError::Task(format!("Task join error: {e}")))?
    }

    /// Latest price per record.
    pub async fn latest(&self) -> Result<Vec<LatestPrice>> {
        self.run(|t| t.prices().latest()).await
    }

    /// Price history of one record, `None` if the id is unknown.
    pub async fn history(&self, record_id: i64) -> Result<Option<PriceHistory>> {
        self.run(move |t| t.prices().history(record_id)).await
    }

    /// Persist a batch of scraped records with today's date.
    pub async fn ingest(&self, records: Vec<ParsedRecord>) -> Result<Vec<i64>> {
        self.run(move |t| t.ingest(&records)).await
    }

    /// Collect `urls` and persist the result.
    ///
    /// Nothing is written unless the whole collection succeeds. Returns the
    /// freshly scraped records.
    pub async fn refresh<F: PageFetcher>(
        &self,
        collector: &Collector<F>,
        urls: &[String],
    ) -> Result<Vec<ParsedRecord>> {
        let scraped = collector.collect(urls).await?;
        self.ingest(scraped.clone()).await?;
        Ok(scraped)
    }
}
