use ahash::AHashMap;
use anyhow::{bail, Result};
use smallvec::{smallvec, SmallVec};

use crate::{error::IntensityError, graph::Neighborhood, table::Key};

/// Rows of a neighborhood. Most neighborhoods are small.
pub(crate) type Rows = SmallVec<[usize; 16]>;

/// Correspondence between table rows and the units of a neighborhood structure.
#[derive(Debug, Clone)]
pub(crate) struct Vicinity {
    row_to_unit: Vec<usize>,
    unit_to_row: Vec<usize>,
}

impl Vicinity {
    /// Align `n_rows` table rows with the units of `weights`.
    ///
    /// Unlabelled weights are positional and must cover exactly one unit per
    /// row. Labelled weights are matched through `row_ids`.
    pub(crate) fn align(weights: &dyn Neighborhood, n_rows: usize, row_ids: Option<&[Option<Key>]>) -> Result<Self> {
        let Some(unit_ids) = weights.unit_ids() else {
            if weights.num_units() != n_rows {
                bail!(IntensityError::config(format!(
                    "neighborhood covers {} units but the table has {} rows", weights.num_units(), n_rows
                )))
            }
            return Ok(Self { row_to_unit: (0..n_rows).collect(), unit_to_row: (0..n_rows).collect() })
        };

        let Some(row_ids) = row_ids else {
            bail!(IntensityError::config("neighborhood units are labelled by id; a unique id for the table is required"))
        };
        if unit_ids.len() != n_rows {
            bail!(IntensityError::config(format!(
                "neighborhood covers {} units but the table has {} rows", unit_ids.len(), n_rows
            )))
        }

        let mut row_of = AHashMap::with_capacity(n_rows);
        for (row, id) in row_ids.iter().enumerate() {
            let Some(id) = id else {
                bail!(IntensityError::config(format!("row {row} has no unique id")))
            };
            if row_of.insert(id.clone(), row).is_some() {
                bail!(IntensityError::config(format!("unique id '{id}' appears more than once")))
            }
        }

        let mut row_to_unit = vec![usize::MAX; n_rows];
        let unit_to_row = unit_ids.iter().enumerate()
            .map(|(unit, id)| {
                let Some(&row) = row_of.get(id) else {
                    bail!(IntensityError::config(format!("neighborhood unit '{id}' has no row in the table")))
                };
                row_to_unit[row] = unit;
                Ok(row)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { row_to_unit, unit_to_row })
    }

    /// Rows in the neighborhood of `row`: its neighbors plus the row itself.
    pub(crate) fn rows(&self, weights: &dyn Neighborhood, row: usize) -> Rows {
        let mut rows = weights.neighbors(self.row_to_unit[row]).iter()
            .map(|&unit| self.unit_to_row[unit as usize])
            .collect::<Rows>();
        if !rows.contains(&row) { rows.push(row) }
        rows
    }

    /// Connected component of `row`.
    pub(crate) fn component(&self, weights: &dyn Neighborhood, row: usize) -> usize {
        weights.component_label(self.row_to_unit[row])
    }
}

/// Neighborhood lookup for one table. Without weights every row is its own neighborhood.
pub(crate) struct Neighborhoods<'a> {
    weights: Option<(&'a dyn Neighborhood, Vicinity)>,
}

impl<'a> Neighborhoods<'a> {
    pub(crate) fn new(weights: Option<&'a dyn Neighborhood>, n_rows: usize, row_ids: Option<&[Option<Key>]>) -> Result<Self> {
        let weights = match weights {
            Some(weights) => Some((weights, Vicinity::align(weights, n_rows, row_ids)?)),
            None => None,
        };
        Ok(Self { weights })
    }

    pub(crate) fn rows(&self, row: usize) -> Rows {
        match &self.weights {
            Some((weights, vicinity)) => vicinity.rows(*weights, row),
            None => smallvec![row],
        }
    }
}
