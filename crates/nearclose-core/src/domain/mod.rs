//! # Domain Models
//!
//! Canonical domain types for nearclose price lookups.
//!
//! All models validate their invariants at construction time, so a value that
//! exists is a value the analyzer may trust.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker in the provider's convention |
//! | [`PriceRecord`] | One trading day (date, close, optional OHLV) |
//! | [`PriceSeries`] | Ascending, duplicate-free daily records for a symbol |
//! | [`Quote`] | Current traded price |
//! | [`HistoryWindow`] | Trailing window of history ending at an as-of instant |
//! | [`UtcDateTime`] | UTC timestamp |
//! | [`TradingDate`] | Calendar date of a trading session |
//!
//! ```rust,ignore
//! use nearclose_core::{PriceRecord, PriceSeries, Symbol, TradingDate};
//!
//! let day = TradingDate::parse("2024-01-02")?;
//! let series = PriceSeries::new(
//!     Symbol::parse("BOVA11.SA")?,
//!     vec![PriceRecord::new(day, 118.40)?],
//! )?;
//! ```

mod models;
mod symbol;
mod timestamp;
mod window;

pub use models::{validate_currency_code, PriceRecord, PriceSeries, Quote};
pub(crate) use models::validate_non_negative;
pub use symbol::Symbol;
pub use timestamp::{TradingDate, UtcDateTime};
pub use window::HistoryWindow;
