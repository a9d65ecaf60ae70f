use ahash::AHashMap;
use anyhow::{bail, Result};

use crate::{
    config::IntensityConfig,
    error::IntensityError,
    graph::Neighborhood,
    intensity::{reduce::evaluate, vicinity::Neighborhoods, IndicatorSeries},
    table::{Attr, GeoTable, Key},
};

/// Nodes per unit of street length within each node's neighborhood.
///
/// Edges count towards the length only when both endpoints lie in the
/// neighborhood. When weighted, each node counts for its degree minus one,
/// so through-nodes of degree two count once.
#[derive(Debug, Clone)]
pub struct NodeDensity {
    weighted: bool,
    node_degree: Option<Attr>,
    node_id: Option<Attr>,
    node_start: Attr,
    node_end: Attr,
    lengths: Option<Attr>,
    parallel: bool,
}

impl Default for NodeDensity {
    fn default() -> Self {
        Self {
            weighted: false,
            node_degree: None,
            node_id: None,
            node_start: Attr::from("node_start"),
            node_end: Attr::from("node_end"),
            lengths: None,
            parallel: false,
        }
    }
}

impl NodeDensity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight nodes by `degree - 1`. Requires a degree attribute.
    pub fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }

    pub fn with_node_degree(mut self, node_degree: impl Into<Attr>) -> Self {
        self.node_degree = Some(node_degree.into());
        self
    }

    /// Node identifiers referenced by the edge endpoints. Defaults to row position.
    pub fn with_node_id(mut self, node_id: impl Into<Attr>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    /// Edge endpoint attributes (defaults `node_start` and `node_end`).
    pub fn with_endpoints(mut self, start: impl Into<Attr>, end: impl Into<Attr>) -> Self {
        self.node_start = start.into();
        self.node_end = end.into();
        self
    }

    /// Edge lengths. Defaults to edge geometry length.
    pub fn with_lengths(mut self, lengths: impl Into<Attr>) -> Self {
        self.lengths = Some(lengths.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_config(self, config: &IntensityConfig) -> Self {
        self.with_parallel(config.parallel)
    }

    /// `nodes` is the primary table, `edges` carries the endpoint identifiers.
    pub fn compute(&self, nodes: &GeoTable, edges: &GeoTable, weights: Option<&dyn Neighborhood>) -> Result<IndicatorSeries> {
        let degrees = match (self.weighted, &self.node_degree) {
            (false, _) => None,
            (true, Some(degree)) => Some(degree.floats(nodes, "mm_deg")?),
            (true, None) => bail!(IntensityError::config("weighted node density requires a node degree attribute")),
        };
        log::debug!("[intensity::node_density] Calculating density for {} nodes and {} edges", nodes.len(), edges.len());

        let node_ids = match &self.node_id {
            Some(id) => id.keys(nodes, "mm_nid")?,
            None => (0..nodes.len()).map(|row| Some(Key::from(row.to_string()))).collect(),
        };
        let neighborhoods = Neighborhoods::new(weights, nodes.len(), Some(node_ids.as_slice()))?;

        let lengths = match &self.lengths {
            Some(lengths) => lengths.floats(edges, "mm_len")?,
            None => edges.lengths()?,
        };
        let out_edges = self.out_edges(&node_ids, edges, &lengths)?;

        let density = evaluate(nodes.len(), self.parallel, |row| {
            let rows = neighborhoods.rows(row);
            let count = match &degrees {
                Some(degrees) => rows.iter().map(|&other| degrees[other] - 1.0).sum::<f64>(),
                None => rows.len() as f64,
            };
            let length = rows.iter()
                .flat_map(|&start| &out_edges[start])
                .filter(|(end, _)| rows.contains(end))
                .map(|&(_, length)| length)
                .sum::<f64>();
            Ok(if length > 0.0 { count / length } else { 0.0 })
        })?;
        Ok(IndicatorSeries::aligned("node_density", density))
    }

    /// Edges leaving each node row, as `(end row, length)`. Edges with an
    /// endpoint that is not a node are dropped.
    fn out_edges(&self, node_ids: &[Option<Key>], edges: &GeoTable, lengths: &[f64]) -> Result<Vec<Vec<(usize, f64)>>> {
        let row_of = node_ids.iter().enumerate()
            .filter_map(|(row, id)| id.as_ref().map(|id| (id, row)))
            .collect::<AHashMap<_, _>>();
        let starts = self.node_start.keys(edges, "mm_ns")?;
        let ends = self.node_end.keys(edges, "mm_ne")?;

        let mut out_edges = vec![Vec::new(); node_ids.len()];
        for ((start, end), &length) in starts.iter().zip(&ends).zip(lengths) {
            let (Some(start), Some(end)) = (start, end) else { continue };
            if let (Some(&start), Some(&end)) = (row_of.get(start), row_of.get(end)) {
                out_edges[start].push((end, length));
            }
        }
        Ok(out_edges)
    }
}
