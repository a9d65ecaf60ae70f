use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use anyhow::{bail, Result};

use crate::{
    error::IntensityError,
    graph::{DisjointSet, Neighborhood},
    table::Key,
};

/// Spatial weights: an unweighted adjacency relation over units, in
/// compressed sparse row format, with connected components precomputed.
#[derive(Debug, Clone, Default)]
pub struct SpatialWeights {
    offsets: Vec<u32>,
    neighbors: Vec<u32>,
    ids: Option<Vec<Key>>,
    components: Vec<u32>,
    num_components: usize,
}

impl SpatialWeights {
    /// Construct weights from per-unit neighbor lists (by unit position).
    pub fn from_adjacency(adjacency: &[Vec<u32>]) -> Result<Self> {
        let size = adjacency.len();
        for (unit, neighbors) in adjacency.iter().enumerate() {
            if let Some(&bad) = neighbors.iter().find(|&&v| v as usize >= size) {
                bail!(IntensityError::config(format!(
                    "unit {unit} lists neighbor {bad}, but there are only {size} units"
                )))
            }
        }

        let mut set = DisjointSet::new(size);
        for (u, neighbors) in adjacency.iter().enumerate() {
            neighbors.iter().for_each(|&v| { set.union(u, v as usize); });
        }
        let (components, num_components) = set.labels();

        Ok(Self {
            offsets: std::iter::once(0u32).chain(
                adjacency.iter()
                    .map(|v| v.len() as u32)
                    .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
            ).collect(),
            neighbors: adjacency.iter().flatten().copied().collect(),
            ids: None,
            components,
            num_components,
        })
    }

    /// Construct weights from `(id, neighbor ids)` entries; entry order defines unit order.
    pub fn from_neighbor_ids<K: Into<Key>>(entries: impl IntoIterator<Item = (K, Vec<K>)>) -> Result<Self> {
        let (ids, neighbor_ids): (Vec<Key>, Vec<Vec<Key>>) = entries.into_iter()
            .map(|(id, neighbors)| (id.into(), neighbors.into_iter().map(Into::into).collect()))
            .unzip();

        let index = unit_index(&ids)?;
        let adjacency = neighbor_ids.iter().zip(&ids)
            .map(|(neighbors, id)| neighbors.iter()
                .map(|n| match index.get(n) {
                    Some(&unit) => Ok(unit as u32),
                    None => bail!(IntensityError::config(format!("neighbor '{n}' of unit '{id}' is not a unit"))),
                })
                .collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?;

        Self::from_adjacency(&adjacency)?.with_ids(ids)
    }

    /// Label units with unique identifiers, so that tables can be aligned by id.
    pub fn with_ids<K: Into<Key>>(mut self, ids: impl IntoIterator<Item = K>) -> Result<Self> {
        let ids = ids.into_iter().map(Into::into).collect::<Vec<Key>>();
        if ids.len() != self.num_units() {
            bail!(IntensityError::config(format!(
                "{} ids given for {} units", ids.len(), self.num_units()
            )))
        }
        unit_index(&ids)?;
        self.ids = Some(ids);
        Ok(self)
    }

    /// Weights connecting every unit to all units within `k` topological steps
    /// (the unit itself excluded).
    pub fn higher_order(&self, k: usize) -> Result<Self> {
        if k == 0 {
            bail!(IntensityError::config("higher order weights need k >= 1"))
        }

        let mut depth = vec![usize::MAX; self.num_units()];
        let mut adjacency = Vec::with_capacity(self.num_units());
        for origin in 0..self.num_units() {
            let mut reached = Vec::new();
            let mut queue = VecDeque::from([origin]);
            depth[origin] = 0;
            while let Some(u) = queue.pop_front() {
                if depth[u] == k { continue }
                for v in self.edges(u) {
                    if depth[v] == usize::MAX {
                        depth[v] = depth[u] + 1;
                        reached.push(v as u32);
                        queue.push_back(v);
                    }
                }
            }

            // Reset only what this search touched.
            depth[origin] = usize::MAX;
            reached.iter().for_each(|&v| depth[v as usize] = usize::MAX);
            reached.sort_unstable();
            adjacency.push(reached);
        }

        let weights = Self::from_adjacency(&adjacency)?;
        match &self.ids {
            Some(ids) => weights.with_ids(ids.iter().cloned()),
            None => Ok(weights),
        }
    }

    /// Get the number of units.
    #[inline] pub fn num_units(&self) -> usize { self.offsets.len().saturating_sub(1) }

    /// Check if there are no units.
    #[inline] pub fn is_empty(&self) -> bool { self.num_units() == 0 }

    /// Get the number of connected components.
    #[inline] pub fn num_components(&self) -> usize { self.num_components }

    /// Get the unit identifiers, if the weights are labelled.
    #[inline] pub fn ids(&self) -> Option<&[Key]> { self.ids.as_deref() }

    /// Get the range of neighbors for a given unit.
    #[inline]
    fn range(&self, unit: usize) -> std::ops::Range<usize> {
        self.offsets[unit] as usize .. self.offsets[unit + 1] as usize
    }

    /// Get the degree (number of neighbors) of a given unit.
    #[inline] pub fn degree(&self, unit: usize) -> usize { self.range(unit).len() }

    /// Get an iterator over the neighbors of a given unit.
    #[inline]
    pub fn edges(&self, unit: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(unit).map(move |v| self.neighbors[v] as usize)
    }
}

impl Neighborhood for SpatialWeights {
    #[inline] fn num_units(&self) -> usize { SpatialWeights::num_units(self) }

    #[inline] fn neighbors(&self, unit: usize) -> &[u32] { &self.neighbors[self.range(unit)] }

    #[inline] fn component_label(&self, unit: usize) -> usize { self.components[unit] as usize }

    #[inline] fn unit_ids(&self) -> Option<&[Key]> { self.ids() }
}

/// Map ids to positions, rejecting duplicates.
fn unit_index(ids: &[Key]) -> Result<AHashMap<Key, usize>> {
    let mut seen = AHashSet::with_capacity(ids.len());
    if let Some(dup) = ids.iter().find(|id| !seen.insert(*id)) {
        bail!(IntensityError::config(format!("duplicate unit id '{dup}'")))
    }
    Ok(ids.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect())
}
