use std::sync::Arc;

use serde::Deserialize;

use crate::data_source::{
    Endpoint, HistoryRequest, MarketDataSource, QuoteRequest, SourceError, SourceFuture,
};
use crate::http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};
use crate::{
    validate_currency_code, PriceRecord, PriceSeries, ProviderId, Quote, Symbol, TradingDate,
    UtcDateTime,
};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const REFERER: &str = "https://finance.yahoo.com/";

/// Environment variable holding an optional session cookie for Yahoo.
pub const YAHOO_COOKIE_ENV: &str = "YAHOO_COOKIE";

/// Yahoo Finance adapter built on the public chart endpoint.
///
/// Both history and quote are served from `/v8/finance/chart/{symbol}`:
/// history with an explicit `period1`/`period2` range, the quote from the
/// `meta.regularMarketPrice` field of a one-day chart.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    base_url: String,
    timeout_ms: u64,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(ReqwestHttpClient::default()),
            auth: HttpAuth::cookie_from_env(YAHOO_COOKIE_ENV),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, auth: HttpAuth) -> Self {
        Self {
            http_client,
            auth,
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    fn chart_url(&self, symbol: &Symbol, query: &str) -> String {
        format!(
            "{}/v8/finance/chart/{}?{}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            query
        )
    }

    async fn fetch_chart(
        &self,
        endpoint: Endpoint,
        symbol: &Symbol,
        url: String,
    ) -> Result<YahooChartResult, SourceError> {
        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_header("accept", "application/json")
            .with_auth(&self.auth)
            .with_timeout_ms(self.timeout_ms);

        tracing::debug!(%symbol, %endpoint, url = %request.url, "requesting yahoo chart");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(endpoint, self.timeout_ms, &error))?;

        if !response.is_success() {
            // Yahoo still sends a chart error payload on 404; prefer its description.
            let description = serde_json::from_str::<YahooChartResponse>(&response.body)
                .ok()
                .and_then(|chart| chart.chart.error)
                .map(|error| error.description)
                .unwrap_or_default();
            return Err(status_error(response.status, symbol, &description));
        }

        let chart: YahooChartResponse = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

        if let Some(error) = chart.chart.error {
            return Err(chart_error(symbol, error));
        }

        chart
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| SourceError::not_found(format!("yahoo has no chart for '{symbol}'")))
    }
}

impl MarketDataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn history<'a>(&'a self, req: HistoryRequest) -> SourceFuture<'a, PriceSeries> {
        Box::pin(async move {
            let query = format!(
                "period1={}&period2={}&interval=1d&events=history",
                req.window.start.unix_timestamp(),
                req.window.end.unix_timestamp()
            );
            let url = self.chart_url(&req.symbol, &query);
            let result = self.fetch_chart(Endpoint::History, &req.symbol, url).await?;
            Ok(normalize_history(&req.symbol, result))
        })
    }

    fn quote<'a>(&'a self, req: QuoteRequest) -> SourceFuture<'a, Quote> {
        Box::pin(async move {
            let url = self.chart_url(&req.symbol, "range=1d&interval=1d");
            let result = self.fetch_chart(Endpoint::Quote, &req.symbol, url).await?;
            normalize_quote(&req.symbol, result.meta)
        })
    }
}

fn normalize_history(symbol: &Symbol, result: YahooChartResult) -> PriceSeries {
    let gmt_offset = result.meta.gmtoffset.unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .unwrap_or_default();

    let mut records = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        // Halted sessions come back as null closes.
        let Some(close) = column_value(&quote.close, i) else {
            continue;
        };

        let record = TradingDate::from_exchange_timestamp(ts, gmt_offset).and_then(|date| {
            PriceRecord::with_bar(
                date,
                column_value(&quote.open, i),
                column_value(&quote.high, i),
                column_value(&quote.low, i),
                close,
                quote
                    .volume
                    .get(i)
                    .copied()
                    .flatten()
                    .and_then(|v| u64::try_from(v).ok()),
            )
        });

        match record {
            Ok(record) => records.push(record),
            Err(error) => tracing::debug!(%symbol, ts, %error, "skipping malformed yahoo bar"),
        }
    }

    let mut series = PriceSeries::from_unsorted(symbol.clone(), records);
    series.currency = normalize_currency(result.meta.currency.as_deref());
    series
}

fn normalize_quote(symbol: &Symbol, meta: YahooChartMeta) -> Result<Quote, SourceError> {
    let price = meta.regular_market_price.ok_or_else(|| {
        SourceError::not_found(format!("yahoo reported no market price for '{symbol}'"))
    })?;

    let as_of = meta
        .regular_market_time
        .and_then(|ts| UtcDateTime::from_unix_timestamp(ts).ok())
        .unwrap_or_else(UtcDateTime::now);

    let currency = normalize_currency(meta.currency.as_deref());
    Quote::new(symbol.clone(), price, currency.as_deref(), as_of)
        .map_err(|error| SourceError::internal(format!("invalid yahoo quote: {error}")))
}

// A currency Yahoo reports that is not a 3-letter code is dropped rather than failing the lookup.
fn normalize_currency(currency: Option<&str>) -> Option<String> {
    currency.and_then(|code| validate_currency_code(code).ok())
}

fn column_value(column: &[Option<f64>], index: usize) -> Option<f64> {
    column.get(index).copied().flatten().filter(|v| v.is_finite())
}

fn transport_error(endpoint: Endpoint, timeout_ms: u64, error: &HttpError) -> SourceError {
    if error.is_timeout() {
        SourceError::timeout(endpoint, timeout_ms)
    } else {
        SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
    }
}

fn status_error(status: u16, symbol: &Symbol, description: &str) -> SourceError {
    let detail = if description.is_empty() {
        format!("yahoo returned status {status} for '{symbol}'")
    } else {
        format!("yahoo returned status {status} for '{symbol}': {description}")
    };

    match status {
        404 => SourceError::not_found(detail),
        429 => SourceError::rate_limited(detail),
        408 | 500..=599 => SourceError::unavailable(detail),
        _ => SourceError::invalid_request(detail),
    }
}

fn chart_error(symbol: &Symbol, error: YahooChartError) -> SourceError {
    let detail = format!("yahoo chart error for '{symbol}': {}", error.description);
    if error.code.eq_ignore_ascii_case("not found") {
        SourceError::not_found(detail)
    } else {
        SourceError::unavailable(detail)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    meta: YahooChartMeta,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    #[serde(default)]
    currency: Option<String>,
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
    #[serde(rename = "regularMarketTime", default)]
    regular_market_time: Option<i64>,
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}
