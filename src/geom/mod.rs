mod bbox;
mod dissolve;
mod measure;

pub(crate) use bbox::BoundingBox;
pub(crate) use dissolve::{count_interiors, dissolve};
pub(crate) use measure::{area, length, Measure};
