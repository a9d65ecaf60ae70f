use std::{fs::File, path::Path};

use anyhow::{bail, ensure, Context, Result};
use geo::Geometry;
use polars::{frame::DataFrame, io::SerReader, prelude::CsvReader};

use crate::{
    error::IntensityError,
    geom::{area, length, Measure},
    intensity::IndicatorSeries,
    table::Attr,
};

/// A table of attributes with one geometry per row.
///
/// Row order is the identity of a row: every indicator returns its values in
/// this order.
#[derive(Debug, Clone)]
pub struct GeoTable {
    data: DataFrame,
    geoms: Vec<Geometry<f64>>,
}

impl GeoTable {
    /// Pair a DataFrame with its geometries. A zero-width frame is accepted
    /// for geometry-only tables.
    pub fn new(data: DataFrame, geoms: Vec<Geometry<f64>>) -> Result<Self> {
        if data.width() > 0 && data.height() != geoms.len() {
            bail!(IntensityError::config(format!(
                "table has {} attribute rows but {} geometries", data.height(), geoms.len()
            )))
        }
        Ok(Self { data, geoms })
    }

    /// A table with geometries only.
    pub fn from_geometries(geoms: Vec<Geometry<f64>>) -> Self {
        Self { data: DataFrame::empty(), geoms }
    }

    /// Read attributes from a CSV file at `path` and pair them with `geoms`.
    pub fn read_csv(path: &Path, geoms: Vec<Geometry<f64>>) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[table::read_csv] Failed to open CSV file: {}", path.display()))?;
        let data = CsvReader::new(file)
            .finish()
            .with_context(|| format!("[table::read_csv] Failed to read CSV from {:?}", path))?;
        Self::new(data, geoms)
    }

    /// Number of rows.
    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    /// Check if the table has no rows.
    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    /// Get a reference to the attribute frame.
    #[inline] pub fn data(&self) -> &DataFrame { &self.data }

    /// Get a reference to all geometries.
    #[inline] pub fn geometries(&self) -> &[Geometry<f64>] { &self.geoms }

    /// Get the geometry of a given row.
    #[inline] pub fn geometry(&self, row: usize) -> &Geometry<f64> { &self.geoms[row] }

    /// Add (or replace) a column named `name`.
    pub fn with_column(mut self, name: &str, values: impl Into<Attr>) -> Result<Self> {
        let column = values.into().materialize(&self, name)?.with_name(name.into());
        ensure!(column.len() == self.len(), "[table::with_column] Column '{name}' has {} rows, expected {}", column.len(), self.len());
        self.data.with_column(column)
            .with_context(|| format!("[table::with_column] Failed to add column '{name}'"))?;
        Ok(self)
    }

    /// Attach an indicator as a new column. The series must cover every row in order.
    pub fn with_indicator(self, series: &IndicatorSeries) -> Result<Self> {
        if !series.is_aligned(self.len()) {
            bail!(IntensityError::config(format!(
                "indicator '{}' is not aligned with the table ({} values for {} rows)",
                series.name(), series.len(), self.len()
            )))
        }
        self.with_column(series.name(), series.to_series())
    }

    /// Unsigned area of every row (zero for points and lines).
    pub fn areas(&self) -> Vec<f64> {
        self.geoms.iter().map(area).collect()
    }

    /// Length of every row. Fails on rows that are not linear.
    pub fn lengths(&self) -> Result<Vec<f64>> {
        self.geoms.iter().enumerate()
            .map(|(row, geom)| match Measure::of(geom) {
                Some(Measure::Length) => Ok(length(geom)),
                _ => bail!(IntensityError::UnsupportedGeometry { row, geometry: Measure::type_name(geom) }),
            })
            .collect()
    }
}
