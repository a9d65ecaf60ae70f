use anyhow::Result;
use geo::{BoundingRect, Geometry, Relate};
use rstar::RTree;

use crate::{geom::BoundingBox, graph::SpatialWeights};

/// Contiguity rule used to build weights from geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contiguity {
    /// Shapes sharing at least one boundary point (or overlapping).
    Queen,
    /// Shapes sharing a boundary segment of positive length.
    Rook,
}

impl SpatialWeights {
    /// Queen contiguity weights over `geoms`, by row position.
    pub fn queen(geoms: &[Geometry<f64>]) -> Result<Self> {
        Self::from_contiguity(geoms, Contiguity::Queen)
    }

    /// Rook contiguity weights over `geoms`, by row position.
    pub fn rook(geoms: &[Geometry<f64>]) -> Result<Self> {
        Self::from_contiguity(geoms, Contiguity::Rook)
    }

    /// Build contiguity weights, testing only pairs whose bounding boxes intersect.
    pub fn from_contiguity(geoms: &[Geometry<f64>], rule: Contiguity) -> Result<Self> {
        let boxes = geoms.iter().enumerate()
            .filter_map(|(i, geom)| geom.bounding_rect().map(|rect| BoundingBox::new(i, rect)))
            .collect::<Vec<_>>();
        let rtree = RTree::bulk_load(boxes.clone());

        let mut adjacency = vec![Vec::new(); geoms.len()];
        for bbox in &boxes {
            let i = bbox.idx();
            for cand in rtree.locate_in_envelope_intersecting(&bbox.search_envelope(0.0)) {
                let j = cand.idx();
                if j <= i { continue } // check each unordered pair once

                let im = geoms[i].relate(&geoms[j]);
                let adjacent = match rule {
                    Contiguity::Queen => im.is_intersects(),
                    // In the 9-char DE-9IM string, index 4 is Boundary/Boundary.
                    Contiguity::Rook => im.is_touches() && im.matches("****1****")?,
                };
                if adjacent {
                    adjacency[i].push(j as u32);
                    adjacency[j].push(i as u32);
                }
            }
        }
        adjacency.iter_mut().for_each(|neighbors| neighbors.sort_unstable());

        Self::from_adjacency(&adjacency)
    }
}
