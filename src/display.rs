//! Plain-text tables for the CLI.

use tabled::{Table, Tabled};

use crate::models::{LatestPrice, ParsedRecord, PriceHistory, PriceTrend};

#[derive(Tabled)]
struct LatestRow<'a> {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "ARTIST")]
    artist: &'a str,
    #[tabled(rename = "ALBUM")]
    album: &'a str,
    #[tabled(rename = "CURRENT PRICE")]
    price: String,
    #[tabled(rename = "AS OF")]
    date: String,
}

#[derive(Tabled)]
struct ScrapedRow<'a> {
    #[tabled(rename = "ARTIST")]
    artist: &'a str,
    #[tabled(rename = "ALBUM")]
    album: &'a str,
    #[tabled(rename = "PRICE")]
    price: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "PRICE")]
    price: String,
}

/// Table of the latest price per record.
pub fn latest_table(rows: &[LatestPrice]) -> String {
    let rows = rows.iter().map(|r| LatestRow {
        id: r.id,
        artist: &r.artist,
        album: &r.album,
        price: r.price.to_string(),
        date: r.date.to_string(),
    });
    Table::new(rows).to_string()
}

/// Table of freshly scraped records.
pub fn scraped_table(records: &[ParsedRecord]) -> String {
    let rows = records.iter().map(|r| ScrapedRow {
        artist: &r.artist,
        album: &r.album,
        price: r.price.to_string(),
    });
    Table::new(rows).to_string()
}

/// Heading line plus a table of one record's observations.
pub fn history_table(history: &PriceHistory) -> String {
    let rows = history.price_history.iter().map(|p| HistoryRow {
        date: p.date.to_string(),
        price: p.price.to_string(),
    });
    format!(
        "#{} {} - {}\n{}",
        history.id,
        history.artist,
        history.album,
        Table::new(rows)
    )
}

pub fn trend_summary(trend: &PriceTrend) -> String {
    format!(
        "min {}  max {}  avg {}  ({} observations, {} to {})",
        trend.min_price,
        trend.max_price,
        trend.avg_price,
        trend.data_points,
        trend.first_date,
        trend.last_date
    )
}
