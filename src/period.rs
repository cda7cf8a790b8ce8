// Calendar-aligned period windows: daily, weekly (Mon-Sun), monthly, quarterly.
// Pure date arithmetic; the only state is an optional pinned "today" for tests.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AggregationError;

/// Rollup cadence for capacity aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl PeriodType {
    pub const ALL: [PeriodType; 4] = [
        PeriodType::Daily,
        PeriodType::Weekly,
        PeriodType::Monthly,
        PeriodType::Quarterly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Daily => "daily",
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
            PeriodType::Quarterly => "quarterly",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(PeriodType::Daily),
            "weekly" => Ok(PeriodType::Weekly),
            "monthly" => Ok(PeriodType::Monthly),
            "quarterly" => Ok(PeriodType::Quarterly),
            other => Err(AggregationError::validation(format!(
                "unsupported period type '{other}' (expected daily, weekly, monthly or quarterly)"
            ))),
        }
    }
}

/// One calendar-aligned window. Both bounds are inclusive. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodBucket {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Inclusive day count of the window.
    pub fn days(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_days() + 1
    }
}

impl fmt::Display for PeriodBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Computes period boundaries relative to a clock. `new()` reads the local
/// date; `fixed()` pins "today" so tests are deterministic.
#[derive(Debug, Clone, Default)]
pub struct PeriodCalculator {
    pinned_today: Option<NaiveDate>,
}

impl PeriodCalculator {
    pub fn new() -> Self {
        Self { pinned_today: None }
    }

    pub fn fixed(today: NaiveDate) -> Self {
        Self {
            pinned_today: Some(today),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.pinned_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// The calendar-aligned window containing today. The window is always a
    /// full block for its cadence, even when still in progress.
    pub fn current_period(&self, period_type: PeriodType) -> PeriodBucket {
        let today = self.today();
        match period_type {
            PeriodType::Daily => PeriodBucket::new(today, today),
            PeriodType::Weekly => {
                let start = today - Days::new(today.weekday().num_days_from_monday() as u64);
                PeriodBucket::new(start, start + Days::new(6))
            }
            PeriodType::Monthly => {
                let start = month_start(today);
                PeriodBucket::new(start, start + Months::new(1) - Days::new(1))
            }
            PeriodType::Quarterly => {
                let start = quarter_start(today);
                PeriodBucket::new(start, start + Months::new(3) - Days::new(1))
            }
        }
    }

    /// The most recently fully completed window strictly before the current one.
    pub fn last_period(&self, period_type: PeriodType) -> PeriodBucket {
        let current = self.current_period(period_type);
        self.previous_period(period_type, &current)
    }

    /// The window immediately preceding `bucket` at the same cadence. Daily
    /// and weekly shift by the window's day count; monthly and quarterly shift
    /// by calendar months so variable month lengths are respected.
    pub fn previous_period(&self, period_type: PeriodType, bucket: &PeriodBucket) -> PeriodBucket {
        match period_type {
            PeriodType::Daily | PeriodType::Weekly => {
                let span = bucket.days();
                let prev_end = bucket.start - Days::new(1);
                let prev_start = prev_end - Days::new((span - 1) as u64);
                PeriodBucket::new(prev_start, prev_end)
            }
            PeriodType::Monthly => {
                let prev_start = bucket.start - Months::new(1);
                PeriodBucket::new(prev_start, bucket.start - Days::new(1))
            }
            PeriodType::Quarterly => {
                let prev_start = bucket.start - Months::new(3);
                PeriodBucket::new(prev_start, bucket.start - Days::new(1))
            }
        }
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.day0() as u64)
}

/// First day of the quarter containing `date` (quarters start in Jan, Apr, Jul, Oct).
fn quarter_start(date: NaiveDate) -> NaiveDate {
    month_start(date) - Months::new(date.month0() % 3)
}
