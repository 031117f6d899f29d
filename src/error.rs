#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Every field of a page came back empty; the session is assumed to be
    /// rate limited or blocked.
    #[error("Blank page at {url}: session looks blocked or rate limited")]
    Blocked { url: String },

    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("Collection cancelled")]
    Cancelled,

    #[error("Task error: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
