//! The normalized dataset produced by the format parsers.

use log::debug;
use serde::Serialize;
use snafu::ensure;

use crate::{StatementTextMismatchSnafu, UnassignedCellSnafu, WomResult};

/// Dense row-major {parties × statements} matrix of position codes.
///
/// Values are -1 (disagree), 0 (neutral) or 1 (agree).
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct PositionMatrix {
    rows: usize,
    cols: usize,
    values: Vec<i8>,
}

impl PositionMatrix {
    /// (number of parties, number of statements)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, party: usize, statement: usize) -> Option<i8> {
        if party >= self.rows || statement >= self.cols {
            return None;
        }
        Some(self.values[party * self.cols + statement])
    }

    /// All position codes of one party, in statement order.
    ///
    /// Panics if `party` is outside the matrix; use [`PositionMatrix::get`]
    /// for a checked lookup.
    pub fn row(&self, party: usize) -> &[i8] {
        &self.values[party * self.cols..(party + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> std::slice::Chunks<'_, i8> {
        self.values.chunks(self.cols)
    }

    pub(crate) fn remove_row(&mut self, party: usize) {
        let start = party * self.cols;
        self.values.drain(start..start + self.cols);
        self.rows -= 1;
    }
}

/// Accumulates position assignments for a pre-sized matrix. Turning the
/// builder into a [`PositionMatrix`] fails if any cell was never assigned.
pub(crate) struct MatrixBuilder {
    rows: usize,
    cols: usize,
    cells: Vec<Option<i8>>,
}

impl MatrixBuilder {
    pub fn new(rows: usize, cols: usize) -> MatrixBuilder {
        MatrixBuilder {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn contains(&self, party: usize, statement: usize) -> bool {
        party < self.rows && statement < self.cols
    }

    pub fn set(&mut self, party: usize, statement: usize, code: i8) {
        debug_assert!(self.contains(party, statement));
        self.cells[party * self.cols + statement] = Some(code);
    }

    pub fn finish(self) -> WomResult<PositionMatrix> {
        let mut values: Vec<i8> = Vec::with_capacity(self.cells.len());
        for (idx, cell) in self.cells.iter().enumerate() {
            match cell {
                Some(code) => values.push(*code),
                None => {
                    return UnassignedCellSnafu {
                        party: idx / self.cols,
                        statement: idx % self.cols,
                    }
                    .fail()
                }
            }
        }
        Ok(PositionMatrix {
            rows: self.rows,
            cols: self.cols,
            values,
        })
    }
}

/// The normalized output of a dataset load.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct Dataset {
    /// Party short names, in order of first appearance in the source.
    pub parties: Vec<String>,
    /// Statement short titles, index-aligned with `statements_long`.
    pub statements: Vec<String>,
    /// Full statement texts.
    pub statements_long: Vec<String>,
    pub positions: PositionMatrix,
    /// Terms-of-use text attached after matrix assembly.
    pub note: String,
}

impl Dataset {
    pub(crate) fn assemble(
        parties: Vec<String>,
        statements: Vec<String>,
        statements_long: Vec<String>,
        positions: MatrixBuilder,
    ) -> WomResult<Dataset> {
        ensure!(
            statements_long.len() == statements.len(),
            StatementTextMismatchSnafu {
                titles: statements.len(),
                texts: statements_long.len(),
            }
        );
        let positions = positions.finish()?;
        debug_assert_eq!(positions.shape(), (parties.len(), statements.len()));
        Ok(Dataset {
            parties,
            statements,
            statements_long,
            positions,
            note: String::new(),
        })
    }

    /// Removes the named parties and their matrix rows. For each name the
    /// first exact match is deleted; names that are not present are
    /// skipped. The statement axis is left untouched.
    pub fn remove_parties<S: AsRef<str>>(mut self, remove: &[S]) -> Dataset {
        for name in remove {
            let name = name.as_ref();
            match self.parties.iter().position(|p| p == name) {
                Some(i) => {
                    debug!("remove_parties: dropping {:?} at row {}", name, i);
                    self.parties.remove(i);
                    self.positions.remove_row(i);
                }
                None => {
                    debug!("remove_parties: {:?} is not in the dataset", name);
                }
            }
        }
        self
    }

    /// JSON form of the dataset, for downstream analysis and plotting.
    pub fn to_json(&self) -> WomResult<serde_json::Value> {
        use snafu::ResultExt;
        serde_json::to_value(self).context(crate::SerializingSnafu {})
    }
}
