use anyhow::Result;

use crate::{
    config::IntensityConfig,
    graph::Neighborhood,
    intensity::{reduce::evaluate, vicinity::Neighborhoods, IndicatorSeries},
    table::{Attr, GeoTable},
};

/// Sum of `values` over sum of `areas` within each row's neighborhood
/// (e.g. gross floor area density).
#[derive(Debug, Clone)]
pub struct Density {
    values: Attr,
    areas: Option<Attr>,
    unique_id: Option<Attr>,
    parallel: bool,
}

impl Density {
    pub fn new(values: impl Into<Attr>) -> Self {
        Self { values: values.into(), areas: None, unique_id: None, parallel: false }
    }

    /// Areas to divide by. Defaults to geometry area.
    pub fn with_areas(mut self, areas: impl Into<Attr>) -> Self {
        self.areas = Some(areas.into());
        self
    }

    /// Identifier aligning rows with id-labelled weights.
    pub fn with_unique_id(mut self, unique_id: impl Into<Attr>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_config(self, config: &IntensityConfig) -> Self {
        self.with_parallel(config.parallel)
    }

    pub fn compute(&self, table: &GeoTable, weights: Option<&dyn Neighborhood>) -> Result<IndicatorSeries> {
        log::debug!("[intensity::density] Calculating density for {} rows", table.len());

        let values = self.values.floats(table, "mm_v")?;
        let areas = match &self.areas {
            Some(areas) => areas.floats(table, "mm_a")?,
            None => table.areas(),
        };
        let ids = self.unique_id.as_ref().map(|id| id.keys(table, "mm_uid")).transpose()?;
        let neighborhoods = Neighborhoods::new(weights, table.len(), ids.as_deref())?;

        let density = evaluate(table.len(), self.parallel, |row| {
            let (value, area) = neighborhoods.rows(row).iter()
                .fold((0.0, 0.0), |(value, area), &other| (value + values[other], area + areas[other]));
            Ok(value / area)
        })?;
        Ok(IndicatorSeries::aligned("density", density))
    }
}
