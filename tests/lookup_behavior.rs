//! Behavior-driven tests for the lookup service
//!
//! These tests verify HOW a lookup treats its market data source: the
//! window it asks for, the bounded timeout, the single retry, and the tagged
//! error each failure turns into.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nearclose_core::{
    FixtureAdapter, HistoryRequest, HistoryWindow, LookupConfig, LookupError, LookupRequest,
    LookupService, MarketDataSource, NoticeLevel, PriceRecord, PriceSeries, ProviderId, Quote,
    QuoteRequest, RetryConfig, SourceError, SourceErrorKind, SourceFuture, Symbol, TradingDate,
    UtcDateTime, ValidationError,
};

const AS_OF: &str = "2024-01-08T12:00:00Z";

fn symbol() -> Symbol {
    Symbol::parse("BOVA11.SA").expect("valid symbol")
}

fn as_of() -> UtcDateTime {
    UtcDateTime::parse(AS_OF).expect("valid timestamp")
}

fn reference_series() -> PriceSeries {
    let records = [("2024-01-02", 10.00), ("2024-01-03", 10.50), ("2024-01-04", 12.00)]
        .iter()
        .map(|(date, close)| {
            PriceRecord::new(TradingDate::parse(date).expect("date"), *close).expect("record")
        })
        .collect();
    PriceSeries::new(symbol(), records).expect("series")
}

fn fast_retry_config() -> LookupConfig {
    LookupConfig {
        request_timeout: Duration::from_millis(200),
        retry: RetryConfig::fixed(Duration::from_millis(1), 1),
        ..LookupConfig::default()
    }
}

/// Source whose history fails a configurable number of times before answering.
struct ScriptedSource {
    history_failures: AtomicU32,
    history_error: SourceError,
    history_delay: Duration,
    history_calls: AtomicU32,
    quote_calls: AtomicU32,
    quote_price: f64,
    seen_windows: Mutex<Vec<HistoryWindow>>,
}

impl ScriptedSource {
    fn healthy() -> Self {
        Self {
            history_failures: AtomicU32::new(0),
            history_error: SourceError::unavailable("unused"),
            history_delay: Duration::ZERO,
            history_calls: AtomicU32::new(0),
            quote_calls: AtomicU32::new(0),
            quote_price: 11.0,
            seen_windows: Mutex::new(Vec::new()),
        }
    }

    fn failing_history(times: u32, error: SourceError) -> Self {
        Self {
            history_failures: AtomicU32::new(times),
            history_error: error,
            ..Self::healthy()
        }
    }

    fn slow_history(delay: Duration) -> Self {
        Self {
            history_delay: delay,
            ..Self::healthy()
        }
    }
}

impl MarketDataSource for ScriptedSource {
    fn id(&self) -> ProviderId {
        ProviderId::Fixture
    }

    fn history<'a>(&'a self, req: HistoryRequest) -> SourceFuture<'a, PriceSeries> {
        Box::pin(async move {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_windows
                .lock()
                .expect("window log should not be poisoned")
                .push(req.window);

            if !self.history_delay.is_zero() {
                tokio::time::sleep(self.history_delay).await;
            }

            let remaining = self.history_failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.history_failures.store(remaining - 1, Ordering::SeqCst);
                return Err(self.history_error.clone());
            }
            Ok(reference_series())
        })
    }

    fn quote<'a>(&'a self, req: QuoteRequest) -> SourceFuture<'a, Quote> {
        Box::pin(async move {
            self.quote_calls.fetch_add(1, Ordering::SeqCst);
            Quote::new(req.symbol, self.quote_price, None, as_of())
                .map_err(|error| SourceError::internal(error.to_string()))
        })
    }
}

fn request(target: f64) -> LookupRequest {
    LookupRequest::new(symbol(), target, as_of()).expect("valid request")
}

// =============================================================================
// Window and happy path
// =============================================================================

#[tokio::test]
async fn lookup_asks_for_five_years_ending_at_as_of() {
    // Given: a healthy source
    let source = Arc::new(ScriptedSource::healthy());
    let service = LookupService::new(source.clone(), fast_retry_config());

    // When: a lookup runs with a pinned as-of instant
    let report = service.lookup(request(10.49)).await.expect("lookup succeeds");

    // Then: the source saw exactly one 5 x 365 day window ending at as-of
    let windows = source.seen_windows.lock().expect("lock").clone();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].end, as_of());
    assert_eq!(
        windows[0].end.unix_timestamp() - windows[0].start.unix_timestamp(),
        5 * 365 * 86_400
    );
    assert_eq!(report.window, windows[0]);
    assert_eq!(report.as_of, as_of());
}

#[tokio::test]
async fn each_lookup_gets_its_own_request_id() {
    let service = LookupService::new(Arc::new(ScriptedSource::healthy()), fast_retry_config());

    let first = service.lookup(request(10.49)).await.expect("lookup");
    let second = service.lookup(request(10.49)).await.expect("lookup");

    assert_ne!(first.request_id, second.request_id);
    assert_eq!(first.proximity, second.proximity);
}

// =============================================================================
// Retry and timeout
// =============================================================================

#[tokio::test]
async fn one_transient_history_failure_is_retried() {
    // Given: a source that is unavailable once
    let source = Arc::new(ScriptedSource::failing_history(
        1,
        SourceError::unavailable("502 from upstream"),
    ));
    let service = LookupService::new(source.clone(), fast_retry_config());

    // When: the lookup runs
    let report = service.lookup(request(10.49)).await;

    // Then: the second attempt succeeds
    assert!(report.is_ok());
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn persistent_failure_stops_after_one_retry() {
    let source = Arc::new(ScriptedSource::failing_history(
        5,
        SourceError::rate_limited("429 too many requests"),
    ));
    let service = LookupService::new(source.clone(), fast_retry_config());

    let error = service.lookup(request(10.49)).await.expect_err("must fail");

    assert!(matches!(
        &error,
        LookupError::Upstream(source_error) if source_error.kind() == SourceErrorKind::RateLimited
    ));
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 2);
    assert_eq!(source.quote_calls.load(Ordering::SeqCst), 0, "no partial analysis");
}

#[tokio::test]
async fn permanent_failure_is_not_retried() {
    let source = Arc::new(ScriptedSource::failing_history(
        1,
        SourceError::invalid_request("400 bad range"),
    ));
    let service = LookupService::new(source.clone(), fast_retry_config());

    let error = service.lookup(request(10.49)).await.expect_err("must fail");

    assert_eq!(error.code(), "lookup.upstream");
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn slow_history_times_out_instead_of_hanging() {
    // Given: a source slower than the per-attempt budget
    let source = Arc::new(ScriptedSource::slow_history(Duration::from_secs(5)));
    let service = LookupService::new(
        source.clone(),
        LookupConfig {
            request_timeout: Duration::from_millis(20),
            retry: RetryConfig::fixed(Duration::from_millis(1), 1),
            ..LookupConfig::default()
        },
    );

    // When: the lookup runs
    let error = service.lookup(request(10.49)).await.expect_err("must time out");

    // Then: both attempts were cut off and reported as a timeout
    assert!(matches!(
        &error,
        LookupError::Upstream(source_error) if source_error.kind() == SourceErrorKind::Timeout
    ));
    assert_eq!(source.history_calls.load(Ordering::SeqCst), 2);
}

// =============================================================================
// Error taxonomy
// =============================================================================

#[tokio::test]
async fn not_found_and_empty_history_are_data_unavailable() {
    let not_found = LookupService::new(
        Arc::new(FixtureAdapter::new()),
        fast_retry_config(),
    );
    let error = not_found.lookup(request(10.0)).await.expect_err("unknown ticker");
    assert!(matches!(error, LookupError::DataUnavailable { .. }));
    assert_eq!(error.notice().level, NoticeLevel::Warning);

    let empty = LookupService::new(
        Arc::new(
            FixtureAdapter::new()
                .with_series(PriceSeries::empty(symbol()))
                .with_quote(Quote::new(symbol(), 10.0, None, as_of()).expect("quote")),
        ),
        fast_retry_config(),
    );
    let error = empty.lookup(request(10.0)).await.expect_err("empty history");
    assert!(matches!(error, LookupError::DataUnavailable { .. }));
}

#[tokio::test]
async fn missing_quote_is_its_own_error() {
    let service = LookupService::new(
        Arc::new(FixtureAdapter::new().with_series(reference_series())),
        fast_retry_config(),
    );

    let error = service.lookup(request(10.0)).await.expect_err("no quote registered");

    assert!(matches!(error, LookupError::QuoteUnavailable { .. }));
    assert_eq!(error.notice().level, NoticeLevel::Error);
}

#[test]
fn form_input_is_validated_before_any_fetch() {
    assert!(matches!(
        LookupRequest::parse("", "10.00", as_of()),
        Err(ValidationError::EmptySymbol)
    ));
    assert!(matches!(
        LookupRequest::parse("BOVA11.SA", "0,00", as_of()),
        Err(ValidationError::ZeroTargetPrice)
    ));
    assert!(matches!(
        LookupRequest::parse("BOVA11.SA", "-3", as_of()),
        Err(ValidationError::NegativeValue { .. })
    ));

    let request = LookupRequest::parse(" bova11.sa ", "10,49", as_of()).expect("valid input");
    assert_eq!(request.symbol.as_str(), "BOVA11.SA");
    assert_eq!(request.target_price, 10.49);
}

// =============================================================================
// Export history
// =============================================================================

#[tokio::test]
async fn history_for_export_uses_the_same_window() {
    let source = Arc::new(ScriptedSource::healthy());
    let service = LookupService::new(source.clone(), fast_retry_config());

    let series = service.history(&symbol(), as_of()).await.expect("history");

    assert_eq!(series.len(), 3);
    assert_eq!(source.quote_calls.load(Ordering::SeqCst), 0);
    let windows = source.seen_windows.lock().expect("lock").clone();
    assert_eq!(windows[0].end, as_of());
}
