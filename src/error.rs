//! Error taxonomy for intensity indicators.
//!
//! Public operations return `anyhow::Result`; when a failure belongs to one of
//! the classes below, the `IntensityError` is the root cause and can be
//! recovered with `err.downcast_ref::<IntensityError>()`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntensityError {
    /// Required parameters are missing, inconsistent, or mutually exclusive.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Weighting requested for a geometry that has neither an area nor a length.
    #[error("Geometry type {geometry} of row {row} does not support weighting")]
    UnsupportedGeometry { row: usize, geometry: &'static str },

    /// Union or interior extraction failed for a connected component.
    #[error("Failed to count courtyards of component {component} ({members} members): {reason}")]
    Computation { component: usize, members: usize, reason: String },
}

impl IntensityError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
