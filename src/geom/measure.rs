use geo::{Area, Euclidean, Geometry, Length};

/// The measure a geometry is normalized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Measure {
    Area,
    Length,
}

impl Measure {
    /// Classify a geometry: polygonal rows have an area, linear rows a length.
    pub(crate) fn of(geom: &Geometry<f64>) -> Option<Self> {
        match geom {
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => Some(Measure::Area),
            Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => Some(Measure::Length),
            Geometry::Point(_) | Geometry::MultiPoint(_) | Geometry::GeometryCollection(_) => None,
        }
    }

    /// Evaluate this measure on `geom`.
    pub(crate) fn eval(self, geom: &Geometry<f64>) -> f64 {
        match self {
            Measure::Area => area(geom),
            Measure::Length => length(geom),
        }
    }

    /// Name of the geometry type, for diagnostics.
    pub(crate) fn type_name(geom: &Geometry<f64>) -> &'static str {
        match geom {
            Geometry::Point(_) => "Point",
            Geometry::Line(_) => "Line",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
            Geometry::Rect(_) => "Rect",
            Geometry::Triangle(_) => "Triangle",
        }
    }
}

/// Unsigned planar area (zero for non-polygonal geometries).
#[inline]
pub(crate) fn area(geom: &Geometry<f64>) -> f64 { geom.unsigned_area() }

/// Euclidean length of linear geometries (zero otherwise).
pub(crate) fn length(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Line(line) => Euclidean.length(line),
        Geometry::LineString(line) => Euclidean.length(line),
        Geometry::MultiLineString(lines) => Euclidean.length(lines),
        _ => 0.0,
    }
}
