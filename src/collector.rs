//! Concurrent page collection.
//!
//! One task per URL runs in a [`JoinSet`]; a [`Semaphore`] caps how many
//! fetches are in flight, every fetch runs under a timeout, and a watch
//! channel can cancel the whole run. The first failure aborts every other
//! task, so a run either yields every record or none.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

use crate::error::{Result, TrackerError};
use crate::fetcher::PageFetcher;
use crate::models::ParsedRecord;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a batch of URLs concurrently through a [`PageFetcher`].
pub struct Collector<F> {
    fetcher: Arc<F>,
    concurrency: usize,
    timeout: Duration,
}

impl<F> Clone for Collector<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            concurrency: self.concurrency,
            timeout: self.timeout,
        }
    }
}

impl<F: PageFetcher> Collector<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Maximum number of fetches in flight at once (at least 1).
    pub fn concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Time allowed for a single fetch, including the body download.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch every URL and return the records in completion order.
    pub async fn collect(&self, urls: &[String]) -> Result<Vec<ParsedRecord>> {
        let (_never_cancelled, shutdown) = watch::channel(false);
        self.collect_with_shutdown(urls, shutdown).await
    }

    /// Like [`collect`](Self::collect), but gives up with
    /// [`TrackerError::Cancelled`] once `shutdown` turns `true`.
    ///
    /// Any failed fetch, timeout, panicked task or blank page ends the run
    /// with that error; the remaining tasks are aborted.
    pub async fn collect_with_shutdown(
        &self,
        urls: &[String],
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<Vec<ParsedRecord>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }
        if *shutdown.borrow() {
            return Err(TrackerError::Cancelled);
        }

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for url in urls {
            let url = url.clone();
            let fetcher = Arc::clone(&self.fetcher);
            let permits = Arc::clone(&permits);
            let timeout = self.timeout;

            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| TrackerError::Cancelled)?;
                match tokio::time::timeout(timeout, fetcher.fetch(&url)).await {
                    Ok(result) => result.map(|record| (url, record)),
                    Err(_) => Err(TrackerError::Timeout { url }),
                }
            });
        }

        tracing::info!(urls = urls.len(), concurrency = self.concurrency, "collection started");

        let mut records = Vec::with_capacity(urls.len());
        let mut watching = true;

        while records.len() < urls.len() {
            tokio::select! {
                joined = tasks.join_next() => {
                    let Some(joined) = joined else {
                        break;
                    };
                    let (url, record) = joined.map_err(|e| TrackerError::Task(e.to_string()))??;
                    if record.is_blank() {
                        tracing::error!(url = %url, "every field empty, aborting collection");
                        return Err(TrackerError::Blocked { url });
                    }
                    tracing::debug!(url = %url, done = records.len() + 1, total = urls.len(), "page collected");
                    records.push(record);
                }
                changed = shutdown.changed(), if watching => {
                    match changed {
                        Ok(()) if *shutdown.borrow() => {
                            tracing::warn!(done = records.len(), total = urls.len(), "collection cancelled");
                            return Err(TrackerError::Cancelled);
                        }
                        Ok(()) => {}
                        // Sender gone: nobody can cancel any more.
                        Err(_) => watching = false,
                    }
                }
            }
        }

        tracing::info!(records = records.len(), "collection finished");
        Ok(records)
    }
}
