//! Price observation writes and the latest-price / history queries.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::connection::Connection;
use crate::error::{Result, TrackerError};
use crate::models::{LatestPrice, PriceHistory, PricePoint, PriceTrend, SortKey};
use crate::queries::records::RecordQuery;
use crate::sql_builder::SqlBuilder;

/// Today's calendar date in local time; the day an observation is filed under.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// PriceQuery
// ---------------------------------------------------------------------------

/// Query interface for the `prices` table.
pub struct PriceQuery<'a> {
    conn: &'a Connection,
}

impl<'a> PriceQuery<'a> {
    /// Create a new `PriceQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Look up the observation id for a record on a given date.
    pub fn find_id(&self, record_id: i64, date: NaiveDate) -> Result<Option<i64>> {
        let (sql, params) = SqlBuilder::new("prices")
            .select(&["id"])
            .where_eq_as("record_id", "BIGINT", &record_id.to_string())
            .where_eq_as("date", "DATE", &date.to_string())
            .limit(1)
            .build();

        let value = self.conn.execute_scalar(&sql, &params)?;
        Ok(value.and_then(|v| v.as_i64()))
    }

    /// Write today's price for a record. See [`upsert_price_on`](Self::upsert_price_on).
    pub fn upsert_price(&self, record_id: i64, price: Decimal) -> Result<i64> {
        self.upsert_price_on(record_id, today(), price)
    }

    /// Write a record's price for `date` and return the observation id.
    ///
    /// An existing observation for the same day has its price overwritten;
    /// otherwise a new row is inserted.
    pub fn upsert_price_on(&self, record_id: i64, date: NaiveDate, price: Decimal) -> Result<i64> {
        if let Some(price_id) = self.find_id(record_id, date)? {
            self.conn.execute_statement(
                "UPDATE prices SET price = CAST(? AS DECIMAL(10, 2)) WHERE id = CAST(? AS BIGINT)",
                &[price.to_string(), price_id.to_string()],
            )?;
            tracing::info!(record_id, %date, %price, "price updated");
            return Ok(price_id);
        }

        let value = self.conn.execute_scalar(
            "INSERT INTO prices (date, price, record_id) \
             VALUES (CAST(? AS DATE), CAST(? AS DECIMAL(10, 2)), CAST(? AS BIGINT)) \
             RETURNING id",
            &[date.to_string(), price.to_string(), record_id.to_string()],
        )?;
        let price_id = value.and_then(|v| v.as_i64()).ok_or_else(|| {
            TrackerError::InvalidArgument(format!("price insert for record {} returned no id", record_id))
        })?;
        tracing::info!(record_id, %date, %price, "price written");
        Ok(price_id)
    }

    /// The price at the most recent observation date of every record,
    /// ordered by artist then album.
    ///
    /// Records without any observation are omitted.
    pub fn latest(&self) -> Result<Vec<LatestPrice>> {
        let (sql, params) = SqlBuilder::new("records r")
            .select(&[
                "r.id AS id",
                "r.artist AS artist",
                "r.album AS album",
                "CAST(p.price AS VARCHAR) AS price",
                "CAST(p.date AS VARCHAR) AS date",
            ])
            .join("JOIN prices p ON p.record_id = r.id")
            .where_clause(
                "p.date = (SELECT MAX(p2.date) FROM prices p2 WHERE p2.record_id = r.id)",
                &[],
            )
            .order_by(&["r.artist ASC", "r.album ASC"])
            .build();

        self.conn.execute_into(&sql, &params)
    }

    /// [`latest`](Self::latest), ordered by the given field instead.
    pub fn latest_sorted(&self, key: SortKey) -> Result<Vec<LatestPrice>> {
        let mut rows = self.latest()?;
        match key {
            SortKey::Artist => {}
            SortKey::Album => rows.sort_by(|a, b| a.album.cmp(&b.album)),
            SortKey::Price => rows.sort_by(|a, b| a.price.cmp(&b.price)),
        }
        Ok(rows)
    }

    /// Full price history of one record, oldest first.
    ///
    /// Returns `None` if no record has this id.
    pub fn history(&self, record_id: i64) -> Result<Option<PriceHistory>> {
        self.history_between(record_id, None, None)
    }

    /// Price history of one record restricted to an inclusive date range.
    pub fn history_between(
        &self,
        record_id: i64,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Option<PriceHistory>> {
        let Some(record) = RecordQuery::new(self.conn).get(record_id)? else {
            tracing::debug!(record_id, "no record with this id");
            return Ok(None);
        };

        let mut qb = SqlBuilder::new("prices");
        qb.select(&[
            "CAST(date AS VARCHAR) AS date",
            "CAST(price AS VARCHAR) AS price",
        ]);
        qb.where_eq_as("record_id", "BIGINT", &record_id.to_string());
        if let Some(df) = date_from {
            qb.where_date_gte("date", &df.to_string());
        }
        if let Some(dt) = date_to {
            qb.where_date_lte("date", &dt.to_string());
        }
        qb.order_by(&["date ASC"]);

        let (sql, params) = qb.build();
        let price_history: Vec<PricePoint> = self.conn.execute_into(&sql, &params)?;

        Ok(Some(PriceHistory {
            id: record.id,
            artist: record.artist,
            album: record.album,
            price_history,
        }))
    }

    /// Aggregated price statistics for one record.
    ///
    /// Returns `None` when the record has no observations (or does not exist).
    pub fn trend(&self, record_id: i64) -> Result<Option<PriceTrend>> {
        let (sql, params) = SqlBuilder::new("prices")
            .select(&[
                "CAST(MIN(price) AS VARCHAR) AS min_price",
                "CAST(MAX(price) AS VARCHAR) AS max_price",
                "CAST(CAST(AVG(price) AS DECIMAL(10, 2)) AS VARCHAR) AS avg_price",
                "CAST(MIN(date) AS VARCHAR) AS first_date",
                "CAST(MAX(date) AS VARCHAR) AS last_date",
                "COUNT(*) AS data_points",
            ])
            .where_eq_as("record_id", "BIGINT", &record_id.to_string())
            .group_by(&["record_id"])
            .build();

        // Grouped, so a record without observations yields no row at all.
        let rows: Vec<PriceTrend> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.into_iter().next())
    }
}
