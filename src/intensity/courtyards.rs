use ahash::AHashMap;
use anyhow::{bail, Result};

use crate::{
    config::{CourtyardsConfig, FailurePolicy, IntensityConfig},
    error::IntensityError,
    geom::{count_interiors, dissolve, Measure},
    graph::{Neighborhood, SpatialWeights},
    intensity::{reduce::evaluate, vicinity::Vicinity, IndicatorSeries},
    table::{Attr, GeoTable},
};

/// Number of courtyards (interior rings) of each joined structure of
/// touching buildings. Every member of a structure gets the same count.
#[derive(Debug, Clone)]
pub struct Courtyards {
    tolerance: f64,
    on_failure: FailurePolicy,
    unique_id: Option<Attr>,
    parallel: bool,
}

impl Default for Courtyards {
    fn default() -> Self {
        Self::new()
    }
}

impl Courtyards {
    pub fn new() -> Self {
        let CourtyardsConfig { tolerance, on_failure } = CourtyardsConfig::default();
        Self { tolerance, on_failure, unique_id: None, parallel: false }
    }

    pub fn with_config(self, config: &IntensityConfig) -> Self {
        self.with_tolerance(config.courtyards.tolerance)
            .with_failure_policy(config.courtyards.on_failure)
            .with_parallel(config.parallel)
    }

    /// Buffer applied to every shape before merging (default 0.01).
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_failure_policy(mut self, on_failure: FailurePolicy) -> Self {
        self.on_failure = on_failure;
        self
    }

    /// Identifier aligning rows with id-labelled weights.
    pub fn with_unique_id(mut self, unique_id: impl Into<Attr>) -> Self {
        self.unique_id = Some(unique_id.into());
        self
    }

    /// Evaluate structures on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Count courtyards per structure. Structures are the connected components
    /// of `weights`, or of queen contiguity over the geometries when no
    /// weights are given.
    pub fn compute(&self, table: &GeoTable, weights: Option<&dyn Neighborhood>) -> Result<IndicatorSeries> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            bail!(IntensityError::config(format!("tolerance must be finite and non-negative, got {}", self.tolerance)))
        }
        for (row, geom) in table.geometries().iter().enumerate() {
            if Measure::of(geom) != Some(Measure::Area) {
                bail!(IntensityError::UnsupportedGeometry { row, geometry: Measure::type_name(geom) })
            }
        }

        let queen;
        let weights: &dyn Neighborhood = match weights {
            Some(weights) => weights,
            None => {
                queen = SpatialWeights::queen(table.geometries())?;
                &queen
            }
        };
        let ids = self.unique_id.as_ref().map(|id| id.keys(table, "mm_uid")).transpose()?;
        let vicinity = Vicinity::align(weights, table.len(), ids.as_deref())?;

        // Members of each component, in order of first appearance.
        let mut group_of = AHashMap::new();
        let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
        for row in 0..table.len() {
            let component = vicinity.component(weights, row);
            let group = *group_of.entry(component).or_insert_with(|| {
                groups.push((component, Vec::new()));
                groups.len() - 1
            });
            groups[group].1.push(row);
        }
        log::debug!("[intensity::courtyards] Calculating courtyards for {} rows in {} structures", table.len(), groups.len());

        let counts = evaluate(groups.len(), self.parallel, |group| {
            let (component, members) = &groups[group];
            let outline = dissolve(members.iter().map(|&row| table.geometry(row)), self.tolerance);
            match (count_interiors(&outline), self.on_failure) {
                (Ok(count), _) => Ok(count as f64),
                (Err(reason), FailurePolicy::Raise) => bail!(IntensityError::Computation {
                    component: *component,
                    members: members.len(),
                    reason,
                }),
                (Err(reason), FailurePolicy::Skip) => {
                    log::warn!("[intensity::courtyards] Skipping component {component} ({} members): {reason}", members.len());
                    Ok(f64::NAN)
                }
            }
        })?;

        let mut courtyards = vec![f64::NAN; table.len()];
        for ((_, members), count) in groups.iter().zip(counts) {
            members.iter().for_each(|&row| courtyards[row] = count);
        }
        Ok(IndicatorSeries::aligned("courtyards", courtyards))
    }
}
