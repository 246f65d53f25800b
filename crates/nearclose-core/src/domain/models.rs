use serde::{Deserialize, Serialize};

use crate::{Symbol, TradingDate, UtcDateTime, ValidationError};

/// One trading day of a security's price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: TradingDate,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl PriceRecord {
    /// Close-only record.
    pub fn new(date: TradingDate, close: f64) -> Result<Self, ValidationError> {
        validate_non_negative("close", close)?;
        Ok(Self {
            date,
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        })
    }

    /// Record carrying the full daily bar as reported by the provider.
    pub fn with_bar(
        date: TradingDate,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("close", close)?;
        validate_optional_non_negative("open", open)?;
        validate_optional_non_negative("high", high)?;
        validate_optional_non_negative("low", low)?;

        Ok(Self {
            date,
            close,
            open,
            high,
            low,
            volume,
        })
    }

    /// Absolute distance between this close and `price`.
    pub fn distance_to(&self, price: f64) -> f64 {
        (self.close - price).abs()
    }
}

/// Daily closes of one symbol in strictly ascending date order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: Symbol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    /// Build a series from records that must already be strictly ascending by date.
    pub fn new(symbol: Symbol, records: Vec<PriceRecord>) -> Result<Self, ValidationError> {
        for pair in records.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(ValidationError::UnorderedSeries {
                    date: pair[1].date.to_string(),
                });
            }
        }

        Ok(Self {
            symbol,
            currency: None,
            records,
        })
    }

    /// Build a series from provider output in any order.
    ///
    /// Records are sorted by date; when a date repeats, the record reported
    /// last wins (providers append the live session after the settled bar).
    pub fn from_unsorted(symbol: Symbol, mut records: Vec<PriceRecord>) -> Self {
        records.reverse();
        records.sort_by_key(|record| record.date);
        records.dedup_by_key(|record| record.date);

        Self {
            symbol,
            currency: None,
            records,
        }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            currency: None,
            records: Vec::new(),
        }
    }

    pub fn with_currency(mut self, currency: Option<&str>) -> Result<Self, ValidationError> {
        self.currency = currency.map(validate_currency_code).transpose()?;
        Ok(self)
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PriceRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&PriceRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&PriceRecord> {
        self.records.last()
    }
}

/// Current traded price of a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub as_of: UtcDateTime,
}

impl Quote {
    pub fn new(
        symbol: Symbol,
        price: f64,
        currency: Option<&str>,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price", price)?;

        Ok(Self {
            symbol,
            price,
            currency: currency.map(validate_currency_code).transpose()?,
            as_of,
        })
    }
}

/// Validate and normalize currency to uppercase 3-letter code.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}

pub(crate) fn validate_non_negative(
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}
