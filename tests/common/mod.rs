//! Shared test fixtures for the vinyl-tracker integration tests.
//!
//! Provides `setup_tracker()` for an empty in-memory store and
//! `setup_sample_db()` which adds a few records with a short price history.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use vinyl_tracker::{ParsedRecord, VinylTracker};

/// An empty tracker backed by an in-memory DuckDB database.
pub fn setup_tracker() -> VinylTracker {
    VinylTracker::builder().in_memory().build().unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn price(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn record(artist: &str, album: &str, amount: &str) -> ParsedRecord {
    ParsedRecord::new(artist, album, None, price(amount))
}

/// A tracker holding three records:
///
/// | id | record                              | 2022-04-15 | 2022-04-16 |
/// |----|-------------------------------------|-----------:|-----------:|
/// | 1  | Tom Misch - What Kinda Music        | 30.00      | 25.00      |
/// | 2  | Jorja Smith - Lost & Found          | 100.00     |            |
/// | 3  | Loyle Carner - Not Waving, But Drowning |        | 25.00      |
pub fn setup_sample_db() -> VinylTracker {
    let tracker = setup_tracker();
    let store = tracker.records();

    store
        .insert_with_price_on(&record("Tom Misch", "What Kinda Music", "30"), date("2022-04-15"))
        .unwrap();
    store
        .insert_with_price_on(&record("Jorja Smith", "Lost & Found", "100"), date("2022-04-15"))
        .unwrap();
    store
        .insert_with_price_on(&record("Tom Misch", "What Kinda Music", "25"), date("2022-04-16"))
        .unwrap();
    store
        .insert_with_price_on(
            &record("Loyle Carner", "Not Waving, But Drowning", "25"),
            date("2022-04-16"),
        )
        .unwrap();

    tracker
}

/// Count rows in a table through the raw connection.
pub fn count_rows(tracker: &VinylTracker, table: &str) -> i64 {
    tracker
        .connection()
        .execute_scalar(&format!("SELECT COUNT(*) FROM {}", table), &[])
        .unwrap()
        .and_then(|v| v.as_i64())
        .unwrap()
}
