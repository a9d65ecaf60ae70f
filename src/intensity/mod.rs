//! Intensity indicators: ratios, counts and densities of urban form
//! elements aggregated over neighborhoods.
mod area_ratio;
mod blocks_count;
mod count;
mod courtyards;
mod density;
mod node_density;
mod reached;
mod reduce;
mod series;
mod vicinity;

pub use area_ratio::AreaRatio;
pub use blocks_count::BlocksCount;
pub use count::Count;
pub use courtyards::Courtyards;
pub use density::Density;
pub use node_density::NodeDensity;
pub use reached::{Reached, ReachedMode};
pub use series::IndicatorSeries;
