pub mod price;
pub mod record;

pub use price::*;
pub use record::*;
