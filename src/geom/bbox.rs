use geo::Rect;
use rstar::{RTreeObject, AABB};

/// A bounding box in an R-tree, associated with a table row by index.
#[derive(Debug, Clone)]
pub(crate) struct BoundingBox {
    idx: usize,
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(crate) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the row index of the corresponding geometry.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }

    /// Search envelope around this box, padded by `eps` on every side.
    pub(crate) fn search_envelope(&self, eps: f64) -> AABB<[f64; 2]> {
        AABB::from_corners(
            [self.bbox.min().x - eps, self.bbox.min().y - eps],
            [self.bbox.max().x + eps, self.bbox.max().y + eps],
        )
    }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}
