//! Query modules for the record store.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and exposes methods
//! returning `Result<T>` with typed model payloads.

pub mod prices;
pub mod records;

pub use prices::PriceQuery;
pub use records::RecordQuery;
