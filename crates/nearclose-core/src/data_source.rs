//! Market data source trait and request/response types.
//!
//! A lookup needs exactly two things from a provider: the daily history of a
//! symbol over a window, and the symbol's current price.
//!
//! | Endpoint | Request | Response |
//! |----------|---------|----------|
//! | History | [`HistoryRequest`] | [`PriceSeries`] |
//! | Quote | [`QuoteRequest`] | [`Quote`] |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{HistoryWindow, PriceSeries, ProviderId, Quote, Symbol};

/// Data endpoint type, used in error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    History,
    Quote,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Quote => "quote",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    NotFound,
    Unavailable,
    RateLimited,
    Timeout,
    InvalidRequest,
    Internal,
}

/// Structured source error; `retryable` drives the lookup retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(endpoint: Endpoint, timeout_ms: u64) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: format!("{endpoint} request exceeded {timeout_ms} ms"),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for the daily history endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub window: HistoryWindow,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, window: HistoryWindow) -> Result<Self, SourceError> {
        if window.start >= window.end {
            return Err(SourceError::invalid_request(
                "history window start must precede its end",
            ));
        }
        Ok(Self { symbol, window })
    }
}

/// Request payload for the current-price endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub symbol: Symbol,
}

impl QuoteRequest {
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

/// Boxed future returned by [`MarketDataSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Market data provider contract.
///
/// Implementations must be `Send + Sync`; the web server shares one source
/// across all requests.
pub trait MarketDataSource: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches daily records inside `req.window`.
    ///
    /// An empty series is a valid answer (nothing traded, or the provider
    /// knows the symbol but has no data for the range). Unknown symbols
    /// should be reported as [`SourceErrorKind::NotFound`].
    fn history<'a>(&'a self, req: HistoryRequest) -> SourceFuture<'a, PriceSeries>;

    /// Fetches the current traded price.
    fn quote<'a>(&'a self, req: QuoteRequest) -> SourceFuture<'a, Quote>;
}
