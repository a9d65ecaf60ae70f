use geo::{BooleanOps, Buffer, Geometry, MultiPolygon};

/// Merge polygonal shapes into one outline.
///
/// Each shape is buffered by `tolerance` first so that shapes meeting only at
/// a corner still merge into a single part. With a zero tolerance the shapes
/// are unioned as they are.
pub(crate) fn dissolve<'a>(shapes: impl IntoIterator<Item = &'a Geometry<f64>>, tolerance: f64) -> MultiPolygon<f64> {
    shapes.into_iter()
        .map(|shape| if tolerance > 0.0 { shape.buffer(tolerance) } else { as_multi_polygon(shape) })
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}

/// Number of interior rings of a dissolved outline.
/// The outline must be exactly one polygon; anything else is reported as the failure reason.
pub(crate) fn count_interiors(outline: &MultiPolygon<f64>) -> Result<usize, String> {
    match outline.0.as_slice() {
        [] => Err("union is empty".to_owned()),
        [polygon] => Ok(polygon.interiors().len()),
        parts => Err(format!("union has {} disjoint parts", parts.len())),
    }
}

fn as_multi_polygon(shape: &Geometry<f64>) -> MultiPolygon<f64> {
    match shape {
        Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon.clone()]),
        Geometry::MultiPolygon(polygons) => polygons.clone(),
        Geometry::Rect(rect) => MultiPolygon::new(vec![rect.to_polygon()]),
        Geometry::Triangle(triangle) => MultiPolygon::new(vec![triangle.to_polygon()]),
        _ => MultiPolygon::new(Vec::new()),
    }
}
