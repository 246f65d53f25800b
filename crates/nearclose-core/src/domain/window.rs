use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// Calendar days per year used when sizing the history window.
const DAYS_PER_YEAR: i64 = 365;

/// Half-open `[start, end)` range of instants a history request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub start: UtcDateTime,
    pub end: UtcDateTime,
}

impl HistoryWindow {
    /// Window of `years` × 365 days ending at `as_of`.
    pub fn trailing_years(as_of: UtcDateTime, years: u32) -> Result<Self, ValidationError> {
        if years == 0 {
            return Err(ValidationError::EmptyHistoryWindow);
        }

        Ok(Self {
            start: as_of.minus_days(i64::from(years) * DAYS_PER_YEAR),
            end: as_of,
        })
    }

    pub fn contains(&self, instant: UtcDateTime) -> bool {
        instant >= self.start && instant < self.end
    }
}
