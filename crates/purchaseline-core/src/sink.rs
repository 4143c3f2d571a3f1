//! Storage sink trait and an in-memory implementation

use chrono::NaiveDate;
use rustc_hash::FxHashSet;

use crate::dataset::{BatchView, Record};
use crate::dates::{default_date_formats, normalize_date};
use crate::error::{SchemaError, SinkError};

/// Destination for purchase rows.
///
/// `append_rows` must be atomic per call: either every row of the batch is
/// persisted or none is.
pub trait PurchaseSink {
    /// Ensure the target table exists. Safe to call repeatedly.
    fn create_schema(&mut self) -> Result<(), SchemaError>;

    /// Persist one batch as a single unit.
    fn append_rows(&mut self, batch: &BatchView<'_>) -> Result<(), SinkError>;
}

impl<S: PurchaseSink + ?Sized> PurchaseSink for &mut S {
    fn create_schema(&mut self) -> Result<(), SchemaError> {
        (**self).create_schema()
    }

    fn append_rows(&mut self, batch: &BatchView<'_>) -> Result<(), SinkError> {
        (**self).append_rows(batch)
    }
}

/// Sink keeping rows in memory, used for dry runs.
///
/// Accepts exactly what the DuckDB `purchases` table accepts: dates must match
/// one of the configured formats, `price` and `user_id` must fit `INTEGER`,
/// and `UNIQUE (date, price, user_id)` is checked on the normalized date. As
/// in SQL, rows with a null price never conflict.
#[derive(Debug)]
pub struct MemorySink {
    rows: Vec<Record>,
    keys: FxHashSet<(NaiveDate, i64, i64)>,
    date_formats: Vec<String>,
    schema_ready: bool,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::with_date_formats(default_date_formats())
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_formats(date_formats: Vec<String>) -> Self {
        Self {
            rows: Vec::new(),
            keys: FxHashSet::default(),
            date_formats,
            schema_ready: false,
        }
    }

    /// Stored rows, dates in ISO form.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl PurchaseSink for MemorySink {
    fn create_schema(&mut self) -> Result<(), SchemaError> {
        self.schema_ready = true;
        Ok(())
    }

    fn append_rows(&mut self, batch: &BatchView<'_>) -> Result<(), SinkError> {
        if !self.schema_ready {
            return Err(SinkError::Storage("table purchases does not exist".into()));
        }

        let first_row = batch.range().start;
        let dates = batch
            .rows()
            .enumerate()
            .map(|(i, row)| {
                normalize_date(row.date, &self.date_formats).ok_or_else(|| {
                    SinkError::InvalidDate {
                        row: first_row + i,
                        value: row.date.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Validate the whole batch before touching state
        let mut staged = FxHashSet::default();
        for (row, &date) in batch.rows().zip(&dates) {
            check_integer("user_id", row.user_id)?;
            if let Some(price) = row.price {
                check_integer("price", price)?;
                let key = (date, price, row.user_id);
                if self.keys.contains(&key) || !staged.insert(key) {
                    return Err(SinkError::Constraint(format!(
                        "duplicate (date, price, user_id) = ({date}, {price}, {})",
                        row.user_id
                    )));
                }
            }
        }

        self.keys.extend(staged);
        let stored = batch.rows().zip(&dates).map(|(row, date)| {
            Record::new(date.format("%Y-%m-%d").to_string(), row.price, row.user_id)
        });
        self.rows.extend(stored);
        Ok(())
    }
}

/// `INTEGER` columns hold 32-bit values.
fn check_integer(column: &str, value: i64) -> Result<(), SinkError> {
    if i32::try_from(value).is_err() {
        return Err(SinkError::InvalidValue(format!(
            "{column} {value} is out of range for INTEGER"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn ds(rows: &[(&str, Option<i64>, i64)]) -> Dataset {
        rows.iter()
            .map(|(d, p, u)| Record::new(*d, *p, *u))
            .collect()
    }

    #[test]
    fn append_requires_schema() {
        let data = ds(&[("2012-06-01", Some(1), 1)]);
        let mut sink = MemorySink::new();
        let err = sink.append_rows(&data.slice(0..1)).unwrap_err();
        assert!(matches!(err, SinkError::Storage(_)));
    }

    #[test]
    fn append_stores_rows_in_order() {
        let data = ds(&[("2012-06-01", Some(1), 1), ("2012-06-02", None, 2)]);
        let mut sink = MemorySink::new();
        sink.create_schema().unwrap();
        sink.append_rows(&data.slice(0..2)).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.rows()[1], Record::new("2012-06-02", None, 2));
    }

    #[test]
    fn duplicate_within_batch_rejects_whole_batch() {
        let data = ds(&[
            ("2012-06-01", Some(5), 1),
            ("2012-06-02", Some(6), 1),
            ("2012-06-01", Some(5), 1),
        ]);
        let mut sink = MemorySink::new();
        sink.create_schema().unwrap();
        let err = sink.append_rows(&data.slice(0..3)).unwrap_err();
        assert!(matches!(err, SinkError::Constraint(_)));
        assert!(sink.is_empty());
    }

    #[test]
    fn duplicate_across_batches_rejected() {
        let data = ds(&[("2012-06-01", Some(5), 1), ("2012-06-01", Some(5), 1)]);
        let mut sink = MemorySink::new();
        sink.create_schema().unwrap();
        sink.append_rows(&data.slice(0..1)).unwrap();
        assert!(sink.append_rows(&data.slice(1..2)).is_err());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn date_spellings_share_one_key() {
        let data = ds(&[("2012-06-01", Some(5), 1), ("6/1/2012", Some(5), 1)]);
        let mut sink = MemorySink::new();
        sink.create_schema().unwrap();
        sink.append_rows(&data.slice(0..1)).unwrap();
        let err = sink.append_rows(&data.slice(1..2)).unwrap_err();
        assert!(matches!(err, SinkError::Constraint(_)), "got {err}");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn dates_stored_in_iso_form() {
        let data = ds(&[("6/2/2012", Some(5), 1)]);
        let mut sink = MemorySink::new();
        sink.create_schema().unwrap();
        sink.append_rows(&data.slice(0..1)).unwrap();
        assert_eq!(sink.rows()[0], Record::new("2012-06-02", Some(5), 1));
    }

    #[test]
    fn unparseable_date_fails_batch() {
        let data = ds(&[("2012-06-01", Some(5), 1), ("not a date", Some(7), 2)]);
        let mut sink = MemorySink::new();
        sink.create_schema().unwrap();
        match sink.append_rows(&data.slice(0..2)).unwrap_err() {
            SinkError::InvalidDate { row, value } => {
                assert_eq!(row, 1);
                assert_eq!(value, "not a date");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn configured_formats_replace_defaults() {
        let data = ds(&[("01.06.2012", Some(5), 1), ("2012-06-01", Some(6), 2)]);
        let mut sink = MemorySink::with_date_formats(vec!["%d.%m.%Y".to_string()]);
        sink.create_schema().unwrap();
        sink.append_rows(&data.slice(0..1)).unwrap();
        assert!(matches!(
            sink.append_rows(&data.slice(1..2)),
            Err(SinkError::InvalidDate { .. })
        ));
    }

    #[test]
    fn values_outside_integer_rejected() {
        let data = ds(&[
            ("2012-06-01", Some(5), i64::from(i32::MAX) + 1),
            ("2012-06-01", Some(i64::MAX), 1),
            ("2012-06-01", Some(i64::from(i32::MIN)), 1),
        ]);
        let mut sink = MemorySink::new();
        sink.create_schema().unwrap();
        for range in [0..1, 1..2] {
            let err = sink.append_rows(&data.slice(range)).unwrap_err();
            assert!(matches!(err, SinkError::InvalidValue(_)), "got {err}");
            assert!(!err.is_retryable());
        }
        sink.append_rows(&data.slice(2..3)).unwrap();
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn null_prices_never_conflict() {
        let data = ds(&[("2012-06-01", None, 1), ("2012-06-01", None, 1)]);
        let mut sink = MemorySink::new();
        sink.create_schema().unwrap();
        sink.append_rows(&data.slice(0..2)).unwrap();
        assert_eq!(sink.len(), 2);
    }
}
