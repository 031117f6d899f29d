use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LatestPrice: Most recent observation per record (query result)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestPrice {
    pub id: i64,
    pub artist: String,
    pub album: String,
    pub price: Decimal,
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// PricePoint: Single dated observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

// ---------------------------------------------------------------------------
// PriceHistory: A record and all of its observations, oldest first
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub id: i64,
    pub artist: String,
    pub album: String,
    pub price_history: Vec<PricePoint>,
}

// ---------------------------------------------------------------------------
// PriceTrend: Aggregated price trend data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PriceTrend {
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub avg_price: Decimal,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub data_points: i64,
}
