#![doc = "Intensity indicators for urban morphometrics"]
mod config;
mod error;
mod geom;
mod graph;
mod intensity;
mod table;

#[doc(inline)]
pub use config::{CourtyardsConfig, FailurePolicy, IntensityConfig};

#[doc(inline)]
pub use error::IntensityError;

#[doc(inline)]
pub use graph::{Contiguity, Neighborhood, SpatialWeights};

#[doc(inline)]
pub use intensity::{AreaRatio, BlocksCount, Count, Courtyards, Density, IndicatorSeries, NodeDensity, Reached, ReachedMode};

#[doc(inline)]
pub use table::{Attr, GeoTable, Key};
