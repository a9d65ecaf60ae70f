use std::sync::Arc;

use anyhow::{bail, Context, Result};
use polars::prelude::{Column, DataType, NamedFrom, Series};

use crate::{error::IntensityError, table::GeoTable};

/// Join/grouping key. Keys of any dtype are compared by their text form.
pub type Key = Arc<str>;

/// An attribute input: either the name of a column in the table, or values
/// supplied inline, aligned 1:1 with the table rows.
#[derive(Debug, Clone)]
pub enum Attr {
    Column(String),
    Values(Series),
}

impl From<&str> for Attr {
    fn from(name: &str) -> Self { Attr::Column(name.to_owned()) }
}

impl From<String> for Attr {
    fn from(name: String) -> Self { Attr::Column(name) }
}

impl From<&String> for Attr {
    fn from(name: &String) -> Self { Attr::Column(name.clone()) }
}

impl From<Series> for Attr {
    fn from(values: Series) -> Self { Attr::Values(values) }
}

impl From<Vec<f64>> for Attr {
    fn from(values: Vec<f64>) -> Self { Attr::Values(Series::new("values".into(), values)) }
}

impl From<Vec<i64>> for Attr {
    fn from(values: Vec<i64>) -> Self { Attr::Values(Series::new("values".into(), values)) }
}

impl From<Vec<&str>> for Attr {
    fn from(values: Vec<&str>) -> Self { Attr::Values(Series::new("values".into(), values)) }
}

impl From<Vec<String>> for Attr {
    fn from(values: Vec<String>) -> Self { Attr::Values(Series::new("values".into(), values)) }
}

impl Attr {
    /// Resolve this input into a working column aligned with `table`.
    /// The table itself is never modified; inline values are renamed to `working`.
    pub(crate) fn materialize(&self, table: &GeoTable, working: &str) -> Result<Column> {
        match self {
            Attr::Column(name) => {
                let Ok(column) = table.data().column(name) else {
                    bail!(IntensityError::config(format!("column '{name}' not found in table")))
                };
                Ok(column.clone())
            }
            Attr::Values(series) => {
                if series.len() != table.len() {
                    bail!(IntensityError::config(format!(
                        "inline values have {} rows, table has {}", series.len(), table.len()
                    )))
                }
                Ok(Column::from(series.clone().with_name(working.into())))
            }
        }
    }

    /// Materialize as floats (nulls become NaN).
    pub(crate) fn floats(&self, table: &GeoTable, working: &str) -> Result<Vec<f64>> {
        floats(&self.materialize(table, working)?)
    }

    /// Materialize as join keys (nulls become `None`).
    pub(crate) fn keys(&self, table: &GeoTable, working: &str) -> Result<Vec<Option<Key>>> {
        keys(&self.materialize(table, working)?)
    }
}

/// Read a column as `f64` values, failing on columns that cannot be parsed as numbers.
pub(crate) fn floats(column: &Column) -> Result<Vec<f64>> {
    let series = column.as_materialized_series()
        .strict_cast(&DataType::Float64)
        .with_context(|| format!("[table::attr] Column '{}' is not numeric", column.name()))?;
    Ok(series.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

/// Read a column as text keys. Whole float values are keyed like integers,
/// value by value, so that `3.0` joins with `3`.
pub(crate) fn keys(column: &Column) -> Result<Vec<Option<Key>>> {
    let series = column.as_materialized_series();
    if series.dtype().is_float() {
        let values = series.cast(&DataType::Float64)?;
        return Ok(values.f64()?.into_iter().map(|v| v.map(float_key)).collect())
    }
    let text = series.cast(&DataType::String)
        .with_context(|| format!("[table::attr] Column '{}' cannot be used as a key", column.name()))?;
    Ok(text.str()?.into_iter().map(|v| v.map(Key::from)).collect())
}

fn float_key(value: f64) -> Key {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Key::from((value as i64).to_string())
    } else {
        Key::from(value.to_string())
    }
}
