//! Running price statistics folded batch by batch.
//!
//! Update flow:
//! 1. A persisted batch is reduced to a [`BatchSummary`]
//! 2. [`RunningStatistics::fold`] combines it with the current accumulator
//!
//! Both steps are pure, so the aggregate logic is testable without a sink.

use std::fmt;

/// Per-batch price aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// All rows in the batch, null prices included
    pub rows: usize,
    /// Sum of the non-null prices, widened so any count of `i64` prices fits
    pub price_sum: i128,
    /// Number of non-null prices
    pub price_count: usize,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
}

impl BatchSummary {
    /// Summarize `rows` rows whose price column is `prices`.
    pub fn from_prices(rows: usize, prices: impl IntoIterator<Item = Option<i64>>) -> Self {
        let mut summary = Self {
            rows,
            ..Default::default()
        };
        for price in prices.into_iter().flatten() {
            summary.price_sum += i128::from(price);
            summary.price_count += 1;
            summary.price_min = Some(summary.price_min.map_or(price, |m| m.min(price)));
            summary.price_max = Some(summary.price_max.map_or(price, |m| m.max(price)));
        }
        summary
    }

    /// Mean of the batch's non-null prices
    pub fn mean(&self) -> Option<f64> {
        mean(self.price_sum, self.price_count as u64)
    }
}

/// Aggregate over every row persisted so far in a run.
///
/// `min_price`/`max_price` stay `None` until the first non-null price is seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningStatistics {
    pub record_count: u64,
    pub sum_of_prices: i128,
    pub non_null_price_count: u64,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one persisted batch into the accumulator.
    #[must_use]
    pub fn fold(&self, batch: &BatchSummary) -> Self {
        Self {
            record_count: self.record_count + batch.rows as u64,
            sum_of_prices: self.sum_of_prices + batch.price_sum,
            non_null_price_count: self.non_null_price_count + batch.price_count as u64,
            min_price: merge(self.min_price, batch.price_min, i64::min),
            max_price: merge(self.max_price, batch.price_max, i64::max),
        }
    }

    /// `sum_of_prices / non_null_price_count`, `None` while no price was seen
    pub fn mean_price(&self) -> Option<f64> {
        mean(self.sum_of_prices, self.non_null_price_count)
    }
}

impl fmt::Display for RunningStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats: records: {}, mean: {}, min: {}, max: {}",
            self.record_count,
            fmt_opt(self.mean_price().map(|m| format!("{m:.2}"))),
            fmt_opt(self.min_price),
            fmt_opt(self.max_price),
        )
    }
}

fn mean(sum: i128, count: u64) -> Option<f64> {
    (count > 0).then(|| sum as f64 / count as f64)
}

fn merge(current: Option<i64>, incoming: Option<i64>, pick: fn(i64, i64) -> i64) -> Option<i64> {
    match (current, incoming) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

/// Render an optional value, `-` when unset.
pub fn fmt_opt<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
