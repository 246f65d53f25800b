//! Price-proximity analysis.
//!
//! Given a daily history, the current price and a target price, [`analyze`]
//! reports how far the current price sits from the target, which historical
//! closes landed within [`TOLERANCE`] of it, and which single close came
//! nearest. The function is pure: no clock, no I/O, no shared state.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::domain::validate_non_negative;
use crate::{PriceRecord, PriceSeries, ValidationError};

/// Absolute half-width of the "near the target" band, in currency units.
pub const TOLERANCE: f64 = 0.99;

/// Slack absorbing binary rounding of two-decimal prices at the band edges.
const BAND_EPSILON: f64 = 1e-9;

/// Which side of the target the current price is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Above,
    Below,
    AtTarget,
}

impl Direction {
    pub const fn sign(self) -> &'static str {
        match self {
            Self::Above => "+",
            Self::Below => "-",
            Self::AtTarget => "",
        }
    }
}

/// Deviation of the current price from the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationSummary {
    pub current_price: f64,
    pub target_price: f64,
    /// `current_price - target_price`.
    pub difference: f64,
    /// `difference / target_price * 100`.
    pub percent_difference: f64,
    pub direction: Direction,
}

impl DeviationSummary {
    /// Fails before dividing when the target is zero.
    pub fn new(current_price: f64, target_price: f64) -> Result<Self, ValidationError> {
        validate_non_negative("current_price", current_price)?;
        validate_non_negative("target_price", target_price)?;
        if target_price == 0.0 {
            return Err(ValidationError::ZeroTargetPrice);
        }

        let difference = current_price - target_price;
        let direction = if difference > 0.0 {
            Direction::Above
        } else if difference < 0.0 {
            Direction::Below
        } else {
            Direction::AtTarget
        };

        Ok(Self {
            current_price,
            target_price,
            difference,
            percent_difference: difference / target_price * 100.0,
            direction,
        })
    }

    /// Difference with explicit sign and two decimals, e.g. `+0.51`.
    pub fn signed_difference(&self) -> String {
        format!("{}{:.2}", self.direction.sign(), self.difference.abs())
    }

    /// Percentage difference with explicit sign, e.g. `-4.86%`.
    pub fn signed_percent(&self) -> String {
        format!(
            "{}{:.2}%",
            self.direction.sign(),
            self.percent_difference.abs()
        )
    }
}

/// Result of one proximity analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityReport {
    pub summary: DeviationSummary,
    /// Records whose close lies within the tolerance band, in date order.
    pub matches: Vec<PriceRecord>,
    /// Record whose close is nearest the target; `None` only for an empty series.
    pub closest: Option<PriceRecord>,
}

impl ProximityReport {
    pub fn verdict(&self) -> Verdict<'_> {
        if !self.matches.is_empty() {
            return Verdict::Near {
                count: self.matches.len(),
            };
        }

        match &self.closest {
            Some(record) => Verdict::NotNear { closest: record },
            None => Verdict::NoHistory,
        }
    }
}

/// Outcome used to choose the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict<'a> {
    Near { count: usize },
    NotNear { closest: &'a PriceRecord },
    NoHistory,
}

impl Display for Verdict<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Near { count } => write!(f, "{count} close(s) within tolerance"),
            Self::NotNear { closest } => {
                write!(f, "closest close {:.2} on {}", closest.close, closest.date)
            }
            Self::NoHistory => f.write_str("no history"),
        }
    }
}

/// True when `close` lies in `[target - TOLERANCE, target + TOLERANCE]`.
pub fn within_tolerance(close: f64, target_price: f64) -> bool {
    (close - target_price).abs() <= TOLERANCE + BAND_EPSILON
}

/// Run the proximity analysis.
///
/// # Errors
///
/// [`ValidationError::ZeroTargetPrice`] when `target_price` is zero, and
/// [`ValidationError::NonFiniteValue`] / [`ValidationError::NegativeValue`]
/// for unusable prices.
pub fn analyze(
    series: &PriceSeries,
    current_price: f64,
    target_price: f64,
) -> Result<ProximityReport, ValidationError> {
    let summary = DeviationSummary::new(current_price, target_price)?;

    let matches = series
        .records()
        .iter()
        .filter(|record| within_tolerance(record.close, target_price))
        .cloned()
        .collect();

    Ok(ProximityReport {
        summary,
        matches,
        closest: closest_record(series.records(), target_price).cloned(),
    })
}

/// Earliest record with the minimum distance to `target_price`.
pub fn closest_record(records: &[PriceRecord], target_price: f64) -> Option<&PriceRecord> {
    let mut best: Option<(&PriceRecord, f64)> = None;
    for record in records {
        let distance = record.distance_to(target_price);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((record, distance)),
        }
    }
    best.map(|(record, _)| record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Symbol, TradingDate};

    fn series(closes: &[(&str, f64)]) -> PriceSeries {
        let records = closes
            .iter()
            .map(|(date, close)| {
                PriceRecord::new(TradingDate::parse(date).expect("date"), *close).expect("record")
            })
            .collect();
        PriceSeries::new(Symbol::parse("BOVA11.SA").expect("symbol"), records).expect("series")
    }

    #[test]
    fn reference_scenario_matches_and_closest() {
        let history = series(&[
            ("2024-01-02", 10.00),
            ("2024-01-03", 10.50),
            ("2024-01-04", 12.00),
        ]);

        let report = analyze(&history, 11.00, 10.49).expect("valid input");

        let matched = report.matches.iter().map(|r| r.close).collect::<Vec<_>>();
        assert_eq!(matched, vec![10.00, 10.50]);
        assert_eq!(report.closest.as_ref().map(|r| r.close), Some(10.50));
        assert!((report.summary.difference - 0.51).abs() < 1e-9);
        assert_eq!(report.summary.direction, Direction::Above);
        assert_eq!(report.summary.signed_difference(), "+0.51");
        assert_eq!(report.summary.signed_percent(), "+4.86%");
    }

    #[test]
    fn band_edges_are_inclusive() {
        let history = series(&[
            ("2024-01-02", 9.01),
            ("2024-01-03", 10.99),
            ("2024-01-04", 11.00),
            ("2024-01-05", 9.00),
        ]);

        let report = analyze(&history, 10.0, 10.0).expect("valid input");
        let matched = report.matches.iter().map(|r| r.close).collect::<Vec<_>>();
        assert_eq!(matched, vec![9.01, 10.99]);
    }

    #[test]
    fn ties_keep_the_earliest_record() {
        let history = series(&[
            ("2024-01-02", 9.0),
            ("2024-01-03", 11.0),
            ("2024-01-04", 9.0),
        ]);

        let closest = closest_record(history.records(), 10.0).expect("non-empty");
        assert_eq!(closest.date.to_string(), "2024-01-02");
    }

    #[test]
    fn zero_target_is_rejected_before_division() {
        let err = analyze(&series(&[]), 5.0, 0.0).expect_err("must fail");
        assert_eq!(err, ValidationError::ZeroTargetPrice);
    }

    #[test]
    fn non_finite_current_price_is_rejected() {
        let err = DeviationSummary::new(f64::INFINITY, 10.0).expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::NonFiniteValue {
                field: "current_price"
            }
        );
    }

    #[test]
    fn below_target_is_signed_negative() {
        let summary = DeviationSummary::new(9.0, 10.0).expect("valid");
        assert_eq!(summary.direction, Direction::Below);
        assert_eq!(summary.signed_difference(), "-1.00");
        assert_eq!(summary.signed_percent(), "-10.00%");
    }

    #[test]
    fn at_target_has_no_sign() {
        let summary = DeviationSummary::new(10.0, 10.0).expect("valid");
        assert_eq!(summary.direction, Direction::AtTarget);
        assert_eq!(summary.signed_difference(), "0.00");
    }

    #[test]
    fn verdict_follows_matches_then_closest() {
        let history = series(&[("2024-01-02", 20.0)]);
        let report = analyze(&history, 20.0, 10.0).expect("valid");
        assert!(matches!(report.verdict(), Verdict::NotNear { closest } if closest.close == 20.0));

        let empty = analyze(&series(&[]), 20.0, 10.0).expect("valid");
        assert_eq!(empty.verdict(), Verdict::NoHistory);
    }
}
