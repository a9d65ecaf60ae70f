mod attr;
mod table;

pub use attr::{Attr, Key};
pub use table::GeoTable;
