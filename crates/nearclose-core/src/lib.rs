//! # Nearclose Core
//!
//! Price-proximity lookups: did a stock close near a target price in the last
//! five years, and how far is it from that target today?
//!
//! ## Overview
//!
//! - **Domain models** for symbols, daily records, series and quotes
//! - **Proximity analysis** as a pure function over an in-memory series
//! - **Market data sources** behind one async trait (Yahoo Finance, fixtures)
//! - **Lookup service** adding a per-call timeout, bounded retry and a tagged error
//! - **Spreadsheet export** of the raw history
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo, fixture) |
//! | [`analysis`] | Deviation, tolerance matches and closest close |
//! | [`data_source`] | Data source trait and request types |
//! | [`domain`] | Domain models |
//! | [`error`] | Core error types |
//! | [`export`] | Spreadsheet export |
//! | [`http_client`] | HTTP client abstraction |
//! | [`lookup`] | Lookup service, request, report and error taxonomy |
//! | [`notice`] | User-facing messages |
//! | [`retry`] | Retry policy and backoff |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nearclose_core::{LookupConfig, LookupRequest, LookupService, UtcDateTime, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = LookupService::new(Arc::new(YahooAdapter::default()), LookupConfig::default());
//!     let request = LookupRequest::parse("BOVA11.SA", "118.40", UtcDateTime::now())?;
//!
//!     let report = service.lookup(request).await?;
//!     for notice in report.notices() {
//!         println!("{notice}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / Web form │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Lookup Service  │────▶│ Retry + Timeout  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Data Source     │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest)        │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Proximity       │
//! │ Analysis        │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Lookups fail with a [`LookupError`] whose variant tells the caller what to
//! show:
//!
//! ```rust
//! use nearclose_core::LookupError;
//!
//! fn describe(error: &LookupError) -> &'static str {
//!     match error {
//!         LookupError::InvalidInput(_) => "fix the form",
//!         LookupError::DataUnavailable { .. } => "check the ticker",
//!         LookupError::QuoteUnavailable { .. } => "no current price",
//!         LookupError::Upstream(_) => "provider failure",
//!     }
//! }
//! ```

pub mod adapters;
pub mod analysis;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod export;
pub mod http_client;
pub mod lookup;
pub mod notice;
pub mod retry;
pub mod source;

// Adapter implementations
pub use adapters::{FixtureAdapter, YahooAdapter};

// Analysis
pub use analysis::{
    analyze, closest_record, within_tolerance, DeviationSummary, Direction, ProximityReport,
    Verdict, TOLERANCE,
};

// Data source trait and types
pub use data_source::{
    Endpoint, HistoryRequest, MarketDataSource, QuoteRequest, SourceError, SourceErrorKind,
    SourceFuture,
};

// Domain models
pub use domain::{
    validate_currency_code, HistoryWindow, PriceRecord, PriceSeries, Quote, Symbol, TradingDate,
    UtcDateTime,
};

// Error types
pub use error::{CoreError, ValidationError};

// Export
pub use export::{
    spreadsheet_bytes, write_spreadsheet, write_spreadsheet_file, EXPORT_CONTENT_TYPE,
    EXPORT_FILE_NAME,
};

// HTTP client types
pub use http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Lookup
pub use lookup::{
    parse_target_price, LookupConfig, LookupError, LookupReport, LookupRequest, LookupService,
    DEFAULT_HISTORY_YEARS,
};

// Notices
pub use notice::{Notice, NoticeLevel};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Source identifiers
pub use source::ProviderId;
