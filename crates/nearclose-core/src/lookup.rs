//! One ticker lookup: fetch five years of closes and the current price, then
//! run the proximity analysis.
//!
//! ```text
//! LookupRequest ──▶ history (timeout + retry) ──▶ quote (timeout + retry) ──▶ analyze ──▶ LookupReport
//! ```
//!
//! Every failure is terminal for the request and tagged with a
//! [`LookupError`] variant so front ends can render distinct messages.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::analysis::{self, ProximityReport, Verdict};
use crate::data_source::{
    Endpoint, HistoryRequest, MarketDataSource, QuoteRequest, SourceError, SourceErrorKind,
};
use crate::domain::validate_non_negative;
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::notice::Notice;
use crate::retry::RetryConfig;
use crate::{
    HistoryWindow, PriceSeries, ProviderId, Quote, Symbol, UtcDateTime, ValidationError,
};

/// Years of daily history a lookup covers.
pub const DEFAULT_HISTORY_YEARS: u32 = 5;

#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub history_years: u32,
    /// Upper bound on each upstream attempt, retries included separately.
    pub request_timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            history_years: DEFAULT_HISTORY_YEARS,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retry: RetryConfig::default(),
        }
    }
}

/// Validated user input for one lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub symbol: Symbol,
    pub target_price: f64,
    /// Instant the history window ends at; resolved once by the caller.
    pub as_of: UtcDateTime,
}

impl LookupRequest {
    pub fn new(
        symbol: Symbol,
        target_price: f64,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_target_price(target_price)?;
        Ok(Self {
            symbol,
            target_price,
            as_of,
        })
    }

    /// Build a request from raw form text.
    pub fn parse(ticker: &str, target_price: &str, as_of: UtcDateTime) -> Result<Self, ValidationError> {
        let symbol = Symbol::parse(ticker)?;
        let target_price = parse_target_price(target_price)?;
        Self::new(symbol, target_price, as_of)
    }
}

/// Parse a target price typed by a user.
///
/// Accepts either `.` or `,` as the decimal separator (`10.49`, `10,49`).
pub fn parse_target_price(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    let normalized = if trimmed.contains('.') {
        trimmed.to_owned()
    } else {
        trimmed.replacen(',', ".", 1)
    };

    let value = normalized
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidPrice {
            value: input.to_owned(),
        })?;
    validate_target_price(value)?;
    Ok(value)
}

fn validate_target_price(value: f64) -> Result<(), ValidationError> {
    validate_non_negative("target_price", value)?;
    if value == 0.0 {
        return Err(ValidationError::ZeroTargetPrice);
    }
    Ok(())
}

/// Tagged failure of a lookup.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),

    #[error("no price history available for '{symbol}': {detail}")]
    DataUnavailable { symbol: Symbol, detail: String },

    #[error("current price for '{symbol}' is unavailable: {detail}")]
    QuoteUnavailable { symbol: Symbol, detail: String },

    #[error("market data request failed: {0}")]
    Upstream(SourceError),
}

impl LookupError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "lookup.invalid_input",
            Self::DataUnavailable { .. } => "lookup.data_unavailable",
            Self::QuoteUnavailable { .. } => "lookup.quote_unavailable",
            Self::Upstream(_) => "lookup.upstream",
        }
    }

    /// Message shown to the user in place of a result.
    pub fn notice(&self) -> Notice {
        match self {
            Self::InvalidInput(ValidationError::EmptySymbol | ValidationError::ZeroTargetPrice) => {
                Notice::missing_input()
            }
            Self::InvalidInput(error) => Notice::warning(format!("Invalid input: {error}.")),
            Self::DataUnavailable { symbol, .. } => Notice::warning(format!(
                "No data was returned for {symbol}. The ticker may be wrong or the data provider may be unavailable."
            )),
            Self::QuoteUnavailable { symbol, .. } => Notice::error(format!(
                "Could not retrieve the current price for {symbol}."
            )),
            Self::Upstream(error) => Notice::error(format!(
                "Could not retrieve market data. Details: {}",
                error.message()
            )),
        }
    }
}

/// Everything one successful lookup produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupReport {
    pub request_id: Uuid,
    pub source: ProviderId,
    pub symbol: Symbol,
    pub as_of: UtcDateTime,
    pub window: HistoryWindow,
    pub series: PriceSeries,
    pub quote: Quote,
    pub proximity: ProximityReport,
}

impl LookupReport {
    pub fn notices(&self) -> Vec<Notice> {
        let target = self.proximity.summary.target_price;
        match self.proximity.verdict() {
            Verdict::Near { .. } => vec![Notice::success(format!(
                "The price closed near {target:.2} on the dates found."
            ))],
            Verdict::NotNear { closest } => vec![
                Notice::warning(no_match_text(target)),
                Notice::info(format!(
                    "The closest close was on {} at {:.2}.",
                    closest.date, closest.close
                )),
            ],
            Verdict::NoHistory => vec![Notice::warning(no_match_text(target))],
        }
    }
}

fn no_match_text(target: f64) -> String {
    format!("No close found near {target:.2} in the last {DEFAULT_HISTORY_YEARS} years.")
}

/// Runs lookups against one market data source.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct LookupService {
    source: Arc<dyn MarketDataSource>,
    config: LookupConfig,
}

impl LookupService {
    pub fn new(source: Arc<dyn MarketDataSource>, config: LookupConfig) -> Self {
        Self { source, config }
    }

    pub fn source_id(&self) -> ProviderId {
        self.source.id()
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    pub fn window(&self, as_of: UtcDateTime) -> Result<HistoryWindow, LookupError> {
        Ok(HistoryWindow::trailing_years(as_of, self.config.history_years)?)
    }

    #[tracing::instrument(
        name = "lookup",
        skip(self, request),
        fields(symbol = %request.symbol, target = request.target_price, source = %self.source.id())
    )]
    pub async fn lookup(&self, request: LookupRequest) -> Result<LookupReport, LookupError> {
        let window = self.window(request.as_of)?;
        let series = self.fetch_history(&request.symbol, window).await?;

        let quote = self
            .guarded(Endpoint::Quote, || {
                self.source.quote(QuoteRequest::new(request.symbol.clone()))
            })
            .await
            .map_err(|error| LookupError::QuoteUnavailable {
                symbol: request.symbol.clone(),
                detail: error.to_string(),
            })?;

        if !quote.price.is_finite() {
            return Err(LookupError::QuoteUnavailable {
                symbol: request.symbol,
                detail: String::from("provider returned a non-finite price"),
            });
        }

        let proximity = analysis::analyze(&series, quote.price, request.target_price)?;
        tracing::info!(
            records = series.len(),
            matches = proximity.matches.len(),
            current = quote.price,
            "lookup complete"
        );

        Ok(LookupReport {
            request_id: Uuid::new_v4(),
            source: self.source.id(),
            symbol: request.symbol,
            as_of: request.as_of,
            window,
            series,
            quote,
            proximity,
        })
    }

    /// Raw history for the same window a lookup would use.
    pub async fn history(
        &self,
        symbol: &Symbol,
        as_of: UtcDateTime,
    ) -> Result<PriceSeries, LookupError> {
        let window = self.window(as_of)?;
        self.fetch_history(symbol, window).await
    }

    async fn fetch_history(
        &self,
        symbol: &Symbol,
        window: HistoryWindow,
    ) -> Result<PriceSeries, LookupError> {
        let request = HistoryRequest::new(symbol.clone(), window).map_err(LookupError::Upstream)?;

        let series = self
            .guarded(Endpoint::History, || self.source.history(request.clone()))
            .await
            .map_err(|error| match error.kind() {
                SourceErrorKind::NotFound => LookupError::DataUnavailable {
                    symbol: symbol.clone(),
                    detail: error.message().to_owned(),
                },
                _ => LookupError::Upstream(error),
            })?;

        if series.is_empty() {
            tracing::warn!(%symbol, "history came back empty");
            return Err(LookupError::DataUnavailable {
                symbol: symbol.clone(),
                detail: String::from("the provider returned an empty series"),
            });
        }

        Ok(series)
    }

    /// Apply the per-attempt timeout and the retry policy to one upstream call.
    async fn guarded<T, F, Fut>(&self, endpoint: Endpoint, mut call: F) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let timeout = self.config.request_timeout;
        self.config
            .retry
            .run(endpoint.as_str(), || {
                let attempt = call();
                async move {
                    match tokio::time::timeout(timeout, attempt).await {
                        Ok(result) => result,
                        Err(_) => Err(SourceError::timeout(endpoint, timeout.as_millis() as u64)),
                    }
                }
            })
            .await
    }
}
