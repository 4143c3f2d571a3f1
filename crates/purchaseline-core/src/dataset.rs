//! Columnar in-memory dataset and batch views over it

use std::num::NonZeroUsize;
use std::ops::Range;

use crate::stats::BatchSummary;

/// One purchase event as read from a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Date text exactly as found in the source (not validated here)
    pub date: String,
    /// `None` when the source field was empty
    pub price: Option<i64>,
    pub user_id: i64,
}

impl Record {
    pub fn new(date: impl Into<String>, price: Option<i64>, user_id: i64) -> Self {
        Self {
            date: date.into(),
            price,
            user_id,
        }
    }
}

/// Borrowed view of a single row inside a [`Dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRef<'a> {
    pub date: &'a str,
    pub price: Option<i64>,
    pub user_id: i64,
}

impl RowRef<'_> {
    pub fn to_record(self) -> Record {
        Record::new(self.date, self.price, self.user_id)
    }
}

/// Rows of one source file, stored column by column in source order.
///
/// The three columns always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    dates: Vec<String>,
    prices: Vec<Option<i64>>,
    user_ids: Vec<i64>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dates: Vec::with_capacity(capacity),
            prices: Vec::with_capacity(capacity),
            user_ids: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.dates.push(record.date);
        self.prices.push(record.price);
        self.user_ids.push(record.user_id);
    }

    pub fn len(&self) -> usize {
        self.user_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn prices(&self) -> &[Option<i64>] {
        &self.prices
    }

    pub fn user_ids(&self) -> &[i64] {
        &self.user_ids
    }

    /// Number of batches a load with `batch_size` will attempt.
    pub fn batch_count(&self, batch_size: NonZeroUsize) -> usize {
        self.len().div_ceil(batch_size.get())
    }

    /// Consecutive batches of exactly `batch_size` rows; the last may be shorter.
    pub fn batches(&self, batch_size: NonZeroUsize) -> Batches<'_> {
        Batches {
            dataset: self,
            size: batch_size.get(),
            offset: 0,
            index: 0,
        }
    }

    /// View over an arbitrary row range.
    ///
    /// # Panics
    /// If `rows` is out of bounds.
    pub fn slice(&self, rows: Range<usize>) -> BatchView<'_> {
        BatchView {
            index: 0,
            offset: rows.start,
            dates: &self.dates[rows.clone()],
            prices: &self.prices[rows.clone()],
            user_ids: &self.user_ids[rows],
        }
    }
}

impl FromIterator<Record> for Dataset {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut dataset = Self::with_capacity(iter.size_hint().0);
        for record in iter {
            dataset.push(record);
        }
        dataset
    }
}

impl Extend<Record> for Dataset {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

/// Iterator over the batches of a [`Dataset`], see [`Dataset::batches`].
#[derive(Debug, Clone)]
pub struct Batches<'a> {
    dataset: &'a Dataset,
    size: usize,
    offset: usize,
    index: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = BatchView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.dataset.len();
        if self.offset >= len {
            return None;
        }
        let end = (self.offset + self.size).min(len);
        let mut view = self.dataset.slice(self.offset..end);
        view.index = self.index;
        self.offset = end;
        self.index += 1;
        Some(view)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.dataset.len() - self.offset).div_ceil(self.size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches<'_> {}

/// Contiguous, borrowed slice of a dataset persisted as one unit.
#[derive(Debug, Clone, Copy)]
pub struct BatchView<'a> {
    index: usize,
    offset: usize,
    dates: &'a [String],
    prices: &'a [Option<i64>],
    user_ids: &'a [i64],
}

impl<'a> BatchView<'a> {
    /// 1-based position of this batch within its dataset
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// Row indices of the dataset covered by this batch
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len()
    }

    pub fn len(&self) -> usize {
        self.user_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rows(&self) -> impl Iterator<Item = RowRef<'a>> + 'a {
        let (dates, prices, user_ids) = (self.dates, self.prices, self.user_ids);
        (0..user_ids.len()).map(move |i| RowRef {
            date: &dates[i],
            price: prices[i],
            user_id: user_ids[i],
        })
    }

    pub fn non_null_prices(&self) -> impl Iterator<Item = i64> + 'a {
        let prices = self.prices;
        prices.iter().flatten().copied()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_prices(self.len(), self.prices.iter().copied())
    }
}
