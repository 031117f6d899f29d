//! Page retrieval.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::ScrapeConfig;
use crate::error::Result;
use crate::models::ParsedRecord;
use crate::page;

/// Source of parsed product pages.
///
/// The collector only depends on this trait, so tests can stand in a fake
/// without touching the network.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetch `url` and extract its record fields.
    async fn fetch(&self, url: &str) -> Result<ParsedRecord>;
}

/// Fetches product pages over HTTP with a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &ScrapeConfig) -> Result<Self> {
        Self::new(&config.user_agent, config.timeout())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<ParsedRecord> {
        tracing::info!(url, "visiting");
        let resp = self.client.get(url).send().await?.error_for_status()?;
        let body = resp.text().await?;
        Ok(page::parse_page(&body, url))
    }
}
