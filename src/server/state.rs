use std::path::PathBuf;

use crate::collector::Collector;
use crate::AsyncVinylTracker;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState<F> {
    /// Store access; blocking work is dispatched to a thread pool internally.
    pub tracker: AsyncVinylTracker,

    /// Collector used by `/refresh`.
    pub collector: Collector<F>,

    /// URL list re-read on every refresh, so edits apply without a restart.
    pub input: PathBuf,
}
