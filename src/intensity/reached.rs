use std::{fmt, str::FromStr};

use ahash::{AHashMap, AHashSet};
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{
    config::IntensityConfig,
    error::IntensityError,
    graph::Neighborhood,
    intensity::{
        reduce::{evaluate, nan_mean, nan_std},
        vicinity::Neighborhoods,
        IndicatorSeries,
    },
    table::{Attr, GeoTable, Key},
};

/// How reached secondary rows are reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReachedMode {
    /// Number of secondary rows.
    #[default]
    Count,
    /// Sum of values.
    Sum,
    /// Mean of values, ignoring NaN.
    Mean,
    /// Population standard deviation of values, ignoring NaN.
    Std,
}

impl FromStr for ReachedMode {
    type Err = IntensityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(ReachedMode::Count),
            "sum" => Ok(ReachedMode::Sum),
            "mean" => Ok(ReachedMode::Mean),
            "std" => Ok(ReachedMode::Std),
            other => Err(IntensityError::config(format!(
                "mode '{other}' is not supported; use one of count, sum, mean, std"
            ))),
        }
    }
}

impl fmt::Display for ReachedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReachedMode::Count => "count",
            ReachedMode::Sum => "sum",
            ReachedMode::Mean => "mean",
            ReachedMode::Std => "std",
        })
    }
}

/// Secondary rows (e.g. buildings) reachable from each primary row (e.g. a
/// street segment) through its neighborhood, counted or aggregated.
///
/// A secondary row is reached when its foreign key equals the identifier of
/// any primary row in the neighborhood.
#[derive(Debug, Clone)]
pub struct Reached {
    left_id: Attr,
    right_id: Attr,
    mode: ReachedMode,
    values: Option<Attr>,
    parallel: bool,
}

impl Reached {
    pub fn new(left_id: impl Into<Attr>, right_id: impl Into<Attr>) -> Self {
        Self { left_id: left_id.into(), right_id: right_id.into(), mode: ReachedMode::Count, values: None, parallel: false }
    }

    pub fn with_mode(mut self, mode: ReachedMode) -> Self {
        self.mode = mode;
        self
    }

    /// Secondary values aggregated by `Sum`, `Mean` and `Std`. Defaults to secondary geometry area.
    pub fn with_values(mut self, values: impl Into<Attr>) -> Self {
        self.values = Some(values.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_config(self, config: &IntensityConfig) -> Self {
        self.with_parallel(config.parallel)
    }

    /// Reduce `right` rows reached from each `left` row. Labelled weights are
    /// aligned with `left` through its identifier.
    pub fn compute(&self, left: &GeoTable, right: &GeoTable, weights: Option<&dyn Neighborhood>) -> Result<IndicatorSeries> {
        log::debug!("[intensity::reached] Calculating '{}' reached from {} rows", self.mode, left.len());

        let left_ids = self.left_id.keys(left, "mm_lid")?;
        let right_ids = self.right_id.keys(right, "mm_rid")?;
        let neighborhoods = Neighborhoods::new(weights, left.len(), Some(left_ids.as_slice()))?;

        let mut reached: AHashMap<&Key, Vec<usize>> = AHashMap::new();
        for (row, id) in right_ids.iter().enumerate() {
            if let Some(id) = id {
                reached.entry(id).or_default().push(row);
            }
        }

        let reduce: fn(&[f64]) -> f64 = match self.mode {
            ReachedMode::Count => {
                // Every identifier occurrence counts, so duplicated ids in a neighborhood count twice.
                let counts = evaluate(left.len(), self.parallel, |row| {
                    Ok(neighborhoods.rows(row).iter()
                        .filter_map(|&other| left_ids[other].as_ref())
                        .map(|id| reached.get(id).map_or(0, Vec::len))
                        .sum::<usize>() as f64)
                })?;
                return Ok(IndicatorSeries::aligned("reached", counts))
            }
            ReachedMode::Sum => |values: &[f64]| values.iter().sum::<f64>(),
            ReachedMode::Mean => nan_mean,
            ReachedMode::Std => nan_std,
        };

        let values = match &self.values {
            Some(values) => values.floats(right, "mm_v")?,
            None => right.areas(),
        };
        let aggregated = evaluate(left.len(), self.parallel, |row| {
            // Distinct ids in neighborhood order, so values are reduced in a fixed order.
            let mut seen = AHashSet::new();
            let gathered = neighborhoods.rows(row).iter()
                .filter_map(|&other| left_ids[other].as_ref())
                .filter(|&id| seen.insert(id))
                .filter_map(|id| reached.get(id))
                .flatten()
                .map(|&other| values[other])
                .collect::<Vec<_>>();
            Ok(reduce(&gathered))
        })?;
        Ok(IndicatorSeries::aligned("reached", aggregated))
    }
}
