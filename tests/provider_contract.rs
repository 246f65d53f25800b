//! Contract tests for market data sources
//!
//! Every source must hand the lookup service an ascending, duplicate-free
//! series and classify its failures the same way, whatever the wire format.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nearclose_core::{
    FixtureAdapter, HistoryRequest, HistoryWindow, HttpAuth, HttpClient, HttpError, HttpRequest,
    HttpResponse, LookupConfig, LookupRequest, LookupService, MarketDataSource, ProviderId,
    QuoteRequest, RetryConfig, SourceErrorKind, Symbol, UtcDateTime, YahooAdapter,
};

/// Transport that replays canned responses in order and records requests.
#[derive(Debug, Default)]
struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .iter()
            .map(|request| request.url.clone())
            .collect()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .push(request);
        let next = self
            .responses
            .lock()
            .expect("response script should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::new("script exhausted")));
        Box::pin(async move { next })
    }
}

/// Sao Paulo session bars: 2024-01-02..04 at 13:00 UTC, plus a live
/// re-report of 2024-01-04 and a halted day with a null close.
const CHART_BODY: &str = r#"{"chart":{"result":[{
    "meta":{"currency":"BRL","symbol":"BOVA11.SA","regularMarketPrice":11.0,
            "regularMarketTime":1704466800,"gmtoffset":-10800},
    "timestamp":[1704200400,1704286800,1704373200,1704459600,1704387600],
    "indicators":{"quote":[{
        "open":[9.9,10.4,11.8,null,11.9],
        "high":[10.2,10.7,12.3,null,12.4],
        "low":[9.7,10.3,11.7,null,11.6],
        "close":[10.0,10.5,11.95,null,12.0],
        "volume":[1200,1300,900,null,1500]}]}}],"error":null}}"#;

fn symbol() -> Symbol {
    Symbol::parse("BOVA11.SA").expect("valid symbol")
}

fn as_of() -> UtcDateTime {
    UtcDateTime::parse("2024-01-08T12:00:00Z").expect("valid timestamp")
}

fn history_request() -> HistoryRequest {
    let window = HistoryWindow::trailing_years(as_of(), 5).expect("valid window");
    HistoryRequest::new(symbol(), window).expect("valid request")
}

// =============================================================================
// Yahoo chart contract
// =============================================================================

#[tokio::test]
async fn yahoo_series_uses_exchange_dates_and_keeps_last_report() {
    // Given: a chart payload with a duplicate session and a null close
    let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(CHART_BODY))]);
    let adapter = YahooAdapter::with_http_client(client, HttpAuth::None);

    // When: history is requested
    let series = adapter.history(history_request()).await.expect("history");

    // Then: one record per session, ascending, last report wins
    let rows = series
        .records()
        .iter()
        .map(|r| (r.date.to_string(), r.close))
        .collect::<Vec<_>>();
    assert_eq!(
        rows,
        vec![
            (String::from("2024-01-02"), 10.0),
            (String::from("2024-01-03"), 10.5),
            (String::from("2024-01-04"), 12.0),
        ]
    );
    assert_eq!(series.records()[2].volume, Some(1500));
}

#[tokio::test]
async fn yahoo_quote_and_history_share_the_chart_endpoint() {
    let client = ScriptedHttpClient::new(vec![
        Ok(HttpResponse::ok_json(CHART_BODY)),
        Ok(HttpResponse::ok_json(CHART_BODY)),
    ]);
    let adapter = YahooAdapter::with_http_client(client.clone(), HttpAuth::None);

    adapter.history(history_request()).await.expect("history");
    let quote = adapter
        .quote(QuoteRequest::new(symbol()))
        .await
        .expect("quote");

    assert_eq!(quote.price, 11.0);
    let urls = client.request_urls();
    assert!(urls[0].contains("/v8/finance/chart/BOVA11.SA?period1="));
    assert!(urls[1].ends_with("/v8/finance/chart/BOVA11.SA?range=1d&interval=1d"));
}

#[tokio::test]
async fn yahoo_symbols_are_url_encoded() {
    let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(CHART_BODY))]);
    let adapter = YahooAdapter::with_http_client(client.clone(), HttpAuth::None);

    let index = Symbol::parse("^BVSP").expect("index symbol");
    let _ = adapter.quote(QuoteRequest::new(index)).await;

    assert!(client.request_urls()[0].contains("/chart/%5EBVSP?"));
}

#[tokio::test]
async fn yahoo_failures_are_classified() {
    let cases = [
        (404, SourceErrorKind::NotFound, false),
        (429, SourceErrorKind::RateLimited, true),
        (500, SourceErrorKind::Unavailable, true),
        (408, SourceErrorKind::Unavailable, true),
        (401, SourceErrorKind::InvalidRequest, false),
    ];

    for (status, kind, retryable) in cases {
        let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::with_status(status, ""))]);
        let adapter = YahooAdapter::with_http_client(client, HttpAuth::None);

        let error = adapter
            .history(history_request())
            .await
            .expect_err("non-2xx must fail");
        assert_eq!(error.kind(), kind, "status {status}");
        assert_eq!(error.retryable(), retryable, "status {status}");
    }
}

#[tokio::test]
async fn yahoo_garbage_body_is_internal_error() {
    let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json("<html>oops</html>"))]);
    let adapter = YahooAdapter::with_http_client(client, HttpAuth::None);

    let error = adapter
        .history(history_request())
        .await
        .expect_err("unparseable body");

    assert_eq!(error.kind(), SourceErrorKind::Internal);
    assert!(!error.retryable());
}

// =============================================================================
// End to end through the lookup service
// =============================================================================

#[tokio::test]
async fn lookup_over_yahoo_recovers_from_one_server_error() {
    // Given: the first history call hits a 503, the rest succeed
    let client = ScriptedHttpClient::new(vec![
        Ok(HttpResponse::with_status(503, "unavailable")),
        Ok(HttpResponse::ok_json(CHART_BODY)),
        Ok(HttpResponse::ok_json(CHART_BODY)),
    ]);
    let service = LookupService::new(
        Arc::new(YahooAdapter::with_http_client(client.clone(), HttpAuth::None)),
        LookupConfig {
            retry: RetryConfig::fixed(Duration::from_millis(1), 1),
            ..LookupConfig::default()
        },
    );

    // When: the user checks a target of 10.49
    let request = LookupRequest::new(symbol(), 10.49, as_of()).expect("valid request");
    let report = service.lookup(request).await.expect("lookup recovers");

    // Then: two closes matched and three requests went out
    assert_eq!(report.source, ProviderId::Yahoo);
    assert_eq!(report.proximity.matches.len(), 2);
    assert_eq!(report.series.currency.as_deref(), Some("BRL"));
    assert_eq!(client.request_urls().len(), 3);
}

// =============================================================================
// Fixture contract
// =============================================================================

#[tokio::test]
async fn demo_fixture_serves_any_valid_symbol() {
    let adapter = FixtureAdapter::demo();

    let series = adapter.history(history_request()).await.expect("history");
    let quote = adapter
        .quote(QuoteRequest::new(symbol()))
        .await
        .expect("quote");

    assert!(series.len() > 1_000, "five years of weekdays");
    assert!(series.records().windows(2).all(|pair| pair[0].date < pair[1].date));
    assert!(quote.price > 0.0);
    assert_eq!(adapter.id(), ProviderId::Fixture);
}
