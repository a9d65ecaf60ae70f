use ahash::AHashMap;
use anyhow::{bail, Result};

use crate::{
    error::IntensityError,
    intensity::IndicatorSeries,
    table::{Attr, GeoTable, Key},
};

/// Covered area ratio (or floor area ratio): area of the covering object
/// over the area of the covered object, joined on a shared identifier.
///
/// The join is an inner join. Primary rows without a match produce no value,
/// and a primary row matched by several covering rows produces one value per
/// match, so the result is indexed by primary row rather than aligned to it.
#[derive(Debug, Clone)]
pub struct AreaRatio {
    left_areas: Attr,
    right_areas: Attr,
    unique_id: Option<String>,
    left_unique_id: Option<Attr>,
    right_unique_id: Option<Attr>,
}

impl AreaRatio {
    pub fn new(left_areas: impl Into<Attr>, right_areas: impl Into<Attr>) -> Self {
        Self {
            left_areas: left_areas.into(),
            right_areas: right_areas.into(),
            unique_id: None,
            left_unique_id: None,
            right_unique_id: None,
        }
    }

    /// Join on a column present in both tables.
    pub fn with_unique_id(mut self, unique_id: &str) -> Self {
        self.unique_id = Some(unique_id.to_owned());
        self
    }

    /// Join on separately named (or supplied) keys.
    pub fn with_keys(mut self, left: impl Into<Attr>, right: impl Into<Attr>) -> Self {
        self.left_unique_id = Some(left.into());
        self.right_unique_id = Some(right.into());
        self
    }

    /// `left` holds the covered objects (e.g. plots), `right` the covering ones (e.g. buildings).
    pub fn compute(&self, left: &GeoTable, right: &GeoTable) -> Result<IndicatorSeries> {
        let (left_key, right_key) = match (&self.unique_id, &self.left_unique_id, &self.right_unique_id) {
            (Some(id), _, _) => (Attr::from(id), Attr::from(id)),
            (None, Some(l), Some(r)) => (l.clone(), r.clone()),
            _ => bail!(IntensityError::config(
                "unique id not correctly set; use either unique_id or both left and right unique ids"
            )),
        };
        log::debug!("[intensity::area_ratio] Joining {} rows against {} rows", left.len(), right.len());

        let left_keys = left_key.keys(left, "mm_lid")?;
        let right_keys = right_key.keys(right, "mm_rid")?;
        let left_areas = self.left_areas.floats(left, "mm_a")?;
        let right_areas = self.right_areas.floats(right, "mm_a")?;

        let mut covering: AHashMap<&Key, Vec<usize>> = AHashMap::with_capacity(right.len());
        for (row, key) in right_keys.iter().enumerate() {
            if let Some(key) = key {
                covering.entry(key).or_default().push(row);
            }
        }

        let (mut index, mut values) = (Vec::with_capacity(left.len()), Vec::with_capacity(left.len()));
        for (row, key) in left_keys.iter().enumerate() {
            let Some(matches) = key.as_ref().and_then(|key| covering.get(key)) else { continue };
            for &other in matches {
                index.push(row);
                values.push(right_areas[other] / left_areas[row]);
            }
        }

        Ok(IndicatorSeries::indexed("area_ratio", index, values))
    }
}
