use std::collections::HashMap;

use time::Weekday;

use crate::data_source::{
    HistoryRequest, MarketDataSource, QuoteRequest, SourceError, SourceFuture,
};
use crate::{
    HistoryWindow, PriceRecord, PriceSeries, ProviderId, Quote, Symbol, TradingDate, UtcDateTime,
};

/// In-memory source for offline runs and tests.
///
/// Registered series, quotes and failures are answered as-is. Symbols with
/// nothing registered are either unknown (`NotFound`) or, when the adapter
/// was built with [`FixtureAdapter::demo`], served from a deterministic
/// generator seeded by the symbol.
#[derive(Debug, Clone, Default)]
pub struct FixtureAdapter {
    series: HashMap<Symbol, PriceSeries>,
    quotes: HashMap<Symbol, Quote>,
    history_failures: HashMap<Symbol, SourceError>,
    quote_failures: HashMap<Symbol, SourceError>,
    demo: bool,
}

impl FixtureAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter that invents plausible daily data for any symbol.
    pub fn demo() -> Self {
        Self {
            demo: true,
            ..Self::default()
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.series.insert(series.symbol.clone(), series);
        self
    }

    pub fn with_quote(mut self, quote: Quote) -> Self {
        self.quotes.insert(quote.symbol.clone(), quote);
        self
    }

    pub fn with_history_failure(mut self, symbol: Symbol, error: SourceError) -> Self {
        self.history_failures.insert(symbol, error);
        self
    }

    pub fn with_quote_failure(mut self, symbol: Symbol, error: SourceError) -> Self {
        self.quote_failures.insert(symbol, error);
        self
    }

    fn lookup_history(&self, req: &HistoryRequest) -> Result<PriceSeries, SourceError> {
        if let Some(error) = self.history_failures.get(&req.symbol) {
            return Err(error.clone());
        }

        if let Some(series) = self.series.get(&req.symbol) {
            // Registered data is trimmed to the requested window like a real provider would.
            let first = req.window.start.date();
            let end = req.window.end.date();
            let records = series
                .records()
                .iter()
                .filter(|record| record.date >= first && record.date <= end)
                .cloned()
                .collect();
            let mut trimmed = PriceSeries::from_unsorted(series.symbol.clone(), records);
            trimmed.currency = series.currency.clone();
            return Ok(trimmed);
        }

        if self.demo {
            return demo_series(&req.symbol, req.window);
        }

        Err(SourceError::not_found(format!(
            "no fixture history registered for '{}'",
            req.symbol
        )))
    }

    fn lookup_quote(&self, req: &QuoteRequest) -> Result<Quote, SourceError> {
        if let Some(error) = self.quote_failures.get(&req.symbol) {
            return Err(error.clone());
        }

        if let Some(quote) = self.quotes.get(&req.symbol) {
            return Ok(quote.clone());
        }

        if self.demo {
            return demo_quote(&req.symbol);
        }

        Err(SourceError::not_found(format!(
            "no fixture quote registered for '{}'",
            req.symbol
        )))
    }
}

impl MarketDataSource for FixtureAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Fixture
    }

    fn history<'a>(&'a self, req: HistoryRequest) -> SourceFuture<'a, PriceSeries> {
        Box::pin(async move { self.lookup_history(&req) })
    }

    fn quote<'a>(&'a self, req: QuoteRequest) -> SourceFuture<'a, Quote> {
        Box::pin(async move { self.lookup_quote(&req) })
    }
}

fn demo_series(symbol: &Symbol, window: HistoryWindow) -> Result<PriceSeries, SourceError> {
    let seed = symbol_seed(symbol);
    let base = demo_base(seed);
    let end = window.end.date().into_inner();
    let mut day = window.start.date().into_inner();
    let mut records = Vec::new();
    let mut index = 0_u64;

    // Sessions strictly before the as-of date; today's bar is not settled yet.
    while day < end {
        if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
            let wobble = ((seed.wrapping_add(index.wrapping_mul(7))) % 400) as f64 / 40.0 - 5.0;
            let close = round_cents(base + wobble);
            let record = PriceRecord::with_bar(
                TradingDate::new(day),
                Some(round_cents(close - 0.15)),
                Some(round_cents(close + 0.40)),
                Some(round_cents(close - 0.45)),
                close,
                Some(150_000 + (seed.wrapping_add(index)) % 50_000),
            )
            .map_err(|e| SourceError::internal(format!("demo record invalid: {e}")))?;
            records.push(record);
            index += 1;
        }
        match day.next_day() {
            Some(next) => day = next,
            None => break,
        }
    }

    PriceSeries::new(symbol.clone(), records)
        .map_err(|e| SourceError::internal(format!("demo series invalid: {e}")))
}

fn demo_quote(symbol: &Symbol) -> Result<Quote, SourceError> {
    let seed = symbol_seed(symbol);
    let price = round_cents(demo_base(seed) + (seed % 97) as f64 / 100.0);
    Quote::new(symbol.clone(), price, None, UtcDateTime::now())
        .map_err(|e| SourceError::internal(format!("demo quote invalid: {e}")))
}

fn demo_base(seed: u64) -> f64 {
    20.0 + (seed % 800) as f64 / 10.0
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(11_u64, |acc, byte| {
        acc.wrapping_mul(31).wrapping_add(u64::from(byte))
    })
}
