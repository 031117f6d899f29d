//! Record identity queries and the combined record + price write path.

use chrono::NaiveDate;

use crate::connection::Connection;
use crate::error::{Result, TrackerError};
use crate::models::{ParsedRecord, RecordEntity};
use crate::queries::prices::{today, PriceQuery};
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// RecordQuery
// ---------------------------------------------------------------------------

/// Query interface for the `records` table.
pub struct RecordQuery<'a> {
    conn: &'a Connection,
}

impl<'a> RecordQuery<'a> {
    /// Create a new `RecordQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Look up a record id by exact, case-sensitive artist and album.
    pub fn find_id(&self, artist: &str, album: &str) -> Result<Option<i64>> {
        let (sql, params) = SqlBuilder::new("records")
            .select(&["id"])
            .where_eq("artist", artist)
            .where_eq("album", album)
            .limit(1)
            .build();

        let value = self.conn.execute_scalar(&sql, &params)?;
        Ok(value.and_then(|v| v.as_i64()))
    }

    /// Insert a new record and return its id.
    ///
    /// Fails if the `(artist, album)` pair already exists; use
    /// [`insert_with_price`](Self::insert_with_price) for find-or-create.
    pub fn insert(&self, artist: &str, album: &str) -> Result<i64> {
        let value = self.conn.execute_scalar(
            "INSERT INTO records (artist, album) VALUES (?, ?) RETURNING id",
            &[artist.to_string(), album.to_string()],
        )?;
        value.and_then(|v| v.as_i64()).ok_or_else(|| {
            TrackerError::InvalidArgument(format!("insert of {} - {} returned no id", artist, album))
        })
    }

    /// Get a single record by id.
    pub fn get(&self, id: i64) -> Result<Option<RecordEntity>> {
        let (sql, params) = SqlBuilder::new("records")
            .select(&["id", "artist", "album"])
            .where_eq_as("id", "BIGINT", &id.to_string())
            .limit(1)
            .build();

        let rows: Vec<RecordEntity> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.into_iter().next())
    }

    /// List every record, oldest first.
    pub fn list(&self) -> Result<Vec<RecordEntity>> {
        let (sql, params) = SqlBuilder::new("records")
            .select(&["id", "artist", "album"])
            .order_by(&["id ASC"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Number of records in the store.
    pub fn count(&self) -> Result<i64> {
        let value = self.conn.execute_scalar("SELECT COUNT(*) FROM records", &[])?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }

    /// Find-or-create the record, then write today's price for it.
    pub fn insert_with_price(&self, record: &ParsedRecord) -> Result<i64> {
        self.insert_with_price_on(record, today())
    }

    /// Find-or-create the record, then write its price for `date`.
    ///
    /// Both steps share one transaction, so a record never exists without
    /// the price observation that created it.
    pub fn insert_with_price_on(&self, record: &ParsedRecord, date: NaiveDate) -> Result<i64> {
        self.conn.transaction(|conn| {
            let records = RecordQuery::new(conn);
            let record_id = match records.find_id(&record.artist, &record.album)? {
                Some(id) => id,
                None => {
                    let id = records.insert(&record.artist, &record.album)?;
                    tracing::debug!(id, artist = %record.artist, album = %record.album, "record created");
                    id
                }
            };
            PriceQuery::new(conn).upsert_price_on(record_id, date, record.price)?;
            Ok(record_id)
        })
    }
}
