use polars::prelude::{NamedFrom, Series};

/// One scalar per primary row, tagged with the row position it belongs to.
///
/// For every indicator except `AreaRatio`, `index` is `0..n` and the series
/// can be attached to the primary table directly.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    name: String,
    index: Vec<usize>,
    values: Vec<f64>,
}

impl IndicatorSeries {
    /// A series covering every row in order.
    pub(crate) fn aligned(name: &str, values: Vec<f64>) -> Self {
        Self { name: name.to_owned(), index: (0..values.len()).collect(), values }
    }

    /// A series covering selected rows.
    pub(crate) fn indexed(name: &str, index: Vec<usize>, values: Vec<f64>) -> Self {
        debug_assert_eq!(index.len(), values.len(), "index and values must have equal length");
        Self { name: name.to_owned(), index, values }
    }

    /// Rename the series (e.g. before attaching it as a column).
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_owned();
        self
    }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn len(&self) -> usize { self.values.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Get the computed values.
    #[inline] pub fn values(&self) -> &[f64] { &self.values }

    /// Get the primary row position of each value.
    #[inline] pub fn index(&self) -> &[usize] { &self.index }

    /// Value of a given primary row, if the row has exactly one value.
    pub fn get(&self, row: usize) -> Option<f64> {
        let mut matches = self.index.iter().zip(&self.values).filter(|&(&r, _)| r == row);
        match (matches.next(), matches.next()) {
            (Some((_, &value)), None) => Some(value),
            _ => None,
        }
    }

    /// Check that the series holds exactly one value per row of an `n`-row table, in order.
    pub fn is_aligned(&self, n: usize) -> bool {
        self.index.len() == n && self.index.iter().enumerate().all(|(i, &row)| i == row)
    }

    /// Convert into a polars Series named after the indicator.
    pub fn to_series(&self) -> Series {
        Series::new(self.name.as_str().into(), self.values.as_slice())
    }
}
