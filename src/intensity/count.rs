use ahash::AHashMap;
use anyhow::{bail, Result};

use crate::{
    error::IntensityError,
    geom::Measure,
    intensity::IndicatorSeries,
    table::{Attr, GeoTable, Key},
};

/// Number of secondary rows referencing each primary row (e.g. buildings per
/// block), optionally divided by the primary row's area or length.
#[derive(Debug, Clone)]
pub struct Count {
    left_id: Attr,
    right_id: Attr,
    weighted: bool,
}

impl Count {
    pub fn new(left_id: impl Into<Attr>, right_id: impl Into<Attr>) -> Self {
        Self { left_id: left_id.into(), right_id: right_id.into(), weighted: false }
    }

    /// Divide counts by area (polygons) or length (lines).
    pub fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    pub fn compute(&self, left: &GeoTable, right: &GeoTable) -> Result<IndicatorSeries> {
        log::debug!("[intensity::count] Counting {} rows into {} rows", right.len(), left.len());

        let mut frequency: AHashMap<Key, usize> = AHashMap::new();
        for key in self.right_id.keys(right, "mm_rid")?.into_iter().flatten() {
            *frequency.entry(key).or_default() += 1;
        }

        let counts = self.left_id.keys(left, "mm_lid")?.iter()
            .map(|key| key.as_ref().and_then(|key| frequency.get(key)).copied().unwrap_or(0) as f64)
            .collect::<Vec<_>>();

        if !self.weighted {
            return Ok(IndicatorSeries::aligned("count", counts))
        }

        let weighted = counts.iter().enumerate()
            .map(|(row, &count)| {
                let geom = left.geometry(row);
                match Measure::of(geom) {
                    Some(measure) => Ok(count / measure.eval(geom)),
                    None => bail!(IntensityError::UnsupportedGeometry { row, geometry: Measure::type_name(geom) }),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(IndicatorSeries::aligned("count", weighted))
    }
}
