//! Neighborhood structures over table rows.
mod contiguity;
mod disjoint;
mod weights;

pub use contiguity::Contiguity;
pub(crate) use disjoint::DisjointSet;
pub use weights::SpatialWeights;

use crate::table::Key;

/// Read-only adjacency over the units of a table.
///
/// Units are table rows by position unless `unit_ids` labels them, in which
/// case indicators align rows to units through a unique id column.
pub trait Neighborhood: Sync {
    /// Number of units covered.
    fn num_units(&self) -> usize;

    /// Units adjacent to `unit`.
    fn neighbors(&self, unit: usize) -> &[u32];

    /// Connected component containing `unit`.
    fn component_label(&self, unit: usize) -> usize;

    /// Unit identifiers, if the units are labelled.
    fn unit_ids(&self) -> Option<&[Key]> { None }
}
