use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ParsedRecord: Fields scraped from one product page
// ---------------------------------------------------------------------------

/// Artist, album and price extracted from a product page.
///
/// Has no identity of its own; the store resolves `(artist, album)` to a
/// record id when it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub artist: String,
    pub album: String,
    #[serde(rename = "amazon_url", default)]
    pub source_url: Option<String>,
    #[serde(rename = "amazon_price")]
    pub price: Decimal,
}

impl ParsedRecord {
    pub fn new(
        artist: impl Into<String>,
        album: impl Into<String>,
        source_url: Option<String>,
        price: Decimal,
    ) -> Self {
        Self {
            artist: artist.into(),
            album: album.into(),
            source_url,
            price,
        }
    }

    /// True when every extracted field is empty, which happens when the
    /// site serves a captcha or block page instead of the product.
    pub fn is_blank(&self) -> bool {
        self.artist.is_empty() && self.album.is_empty() && self.price.is_zero()
    }
}

// ---------------------------------------------------------------------------
// RecordEntity: Persisted artist/album identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntity {
    pub id: i64,
    pub artist: String,
    pub album: String,
}

// ---------------------------------------------------------------------------
// SortKey
// ---------------------------------------------------------------------------

/// Field used to order record listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    Artist,
    Album,
    Price,
}
