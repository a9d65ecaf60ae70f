use ahash::AHashSet;
use anyhow::Result;

use crate::{
    config::IntensityConfig,
    graph::Neighborhood,
    intensity::{reduce::evaluate, vicinity::Neighborhoods, IndicatorSeries},
    table::{Attr, GeoTable},
};

/// Number of distinct blocks within each row's neighborhood, by default per
/// unit of neighborhood area.
#[derive(Debug, Clone)]
pub struct BlocksCount {
    block_id: Attr,
    unique_id: Option<Attr>,
    weighted: bool,
    parallel: bool,
}

impl BlocksCount {
    pub fn new(block_id: impl Into<Attr>) -> Self {
        Self { block_id: block_id.into(), unique_id: None, weighted: true, parallel: false }
    }

    /// Divide by the summed area of the neighborhood (default `true`).
    pub fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
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
        log::debug!("[intensity::blocks_count] Calculating blocks for {} rows", table.len());

        let blocks = self.block_id.keys(table, "mm_bid")?;
        let areas = table.areas();
        let ids = self.unique_id.as_ref().map(|id| id.keys(table, "mm_uid")).transpose()?;
        let neighborhoods = Neighborhoods::new(weights, table.len(), ids.as_deref())?;
        let weighted = self.weighted;

        let counts = evaluate(table.len(), self.parallel, |row| {
            let rows = neighborhoods.rows(row);
            let distinct = rows.iter()
                .filter_map(|&other| blocks[other].as_ref())
                .collect::<AHashSet<_>>()
                .len() as f64;
            if !weighted { return Ok(distinct) }
            Ok(distinct / rows.iter().map(|&other| areas[other]).sum::<f64>())
        })?;
        Ok(IndicatorSeries::aligned("blocks_count", counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SpatialWeights;
    use geo::Rect;
    use polars::df;

    fn tessellation() -> GeoTable {
        let data = df!("bID" => [Some(1i64), Some(1), Some(2), None]).unwrap();
        GeoTable::new(data, vec![
            Rect::new((0.0, 0.0), (1.0, 1.0)).to_polygon().into(),
            Rect::new((1.0, 0.0), (2.0, 1.0)).to_polygon().into(),
            Rect::new((2.0, 0.0), (3.0, 1.0)).to_polygon().into(),
            Rect::new((9.0, 9.0), (11.0, 11.0)).to_polygon().into(),
        ]).unwrap()
    }

    #[test]
    fn isolated_row_is_one_over_its_area() {
        let table = GeoTable::new(
            df!("bID" => [7i64]).unwrap(),
            vec![Rect::new((0.0, 0.0), (2.0, 2.0)).to_polygon().into()],
        ).unwrap();
        let series = BlocksCount::new("bID").compute(&table, None).unwrap();
        assert_eq!(series.values(), &[0.25]);
    }

    #[test]
    fn counts_distinct_blocks_in_neighborhood() {
        let table = tessellation();
        let weights = SpatialWeights::rook(table.geometries()).unwrap();
        let series = BlocksCount::new("bID").with_weighted(false).compute(&table, Some(&weights)).unwrap();
        assert_eq!(series.values(), &[1.0, 2.0, 2.0, 0.0]);
    }

    #[test]
    fn weighted_by_neighborhood_area() {
        let table = tessellation();
        let weights = SpatialWeights::rook(table.geometries()).unwrap();
        let series = BlocksCount::new("bID").compute(&table, Some(&weights)).unwrap();
        assert_eq!(series.values(), &[0.5, 2.0 / 3.0, 1.0, 0.0]);
    }
}
