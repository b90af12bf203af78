//! All-pairs travel-time matrix and its builder.

use geo::Coord;
use rayon::prelude::*;

use super::error::{MatrixBuildError, MatrixShapeError};
use super::oracle::TravelTimeOracle;

/// Square matrix of travel times in whole seconds.
///
/// `get(i, j)` is the time from node `i` to node `j`. The diagonal is zero.
/// The matrix is not assumed to be symmetric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMatrix {
    size: usize,
    cells: Vec<u64>,
}

impl TimeMatrix {
    /// Build a matrix from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixShapeError`] if the rows are empty, ragged or carry a
    /// non-zero diagonal.
    ///
    /// # Examples
    /// ```
    /// use convoy_core::TimeMatrix;
    ///
    /// let matrix = TimeMatrix::from_rows(vec![vec![0, 5], vec![7, 0]])?;
    /// assert_eq!(matrix.get(0, 1), Some(5));
    /// assert_eq!(matrix.get(1, 0), Some(7));
    /// # Ok::<(), convoy_core::MatrixShapeError>(())
    /// ```
    pub fn from_rows(rows: Vec<Vec<u64>>) -> Result<Self, MatrixShapeError> {
        let size = rows.len();
        if size == 0 {
            return Err(MatrixShapeError::Empty);
        }
        let mut cells = Vec::with_capacity(size * size);
        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != size {
                return Err(MatrixShapeError::NotSquare {
                    row: row_index,
                    expected: size,
                    actual: row.len(),
                });
            }
            match row.get(row_index) {
                Some(&value) if value != 0 => {
                    return Err(MatrixShapeError::NonZeroDiagonal {
                        index: row_index,
                        value,
                    });
                }
                _ => {}
            }
            cells.extend(row);
        }
        Ok(Self { size, cells })
    }

    /// Number of nodes covered by the matrix.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Travel time from `from` to `to`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> Option<u64> {
        if from >= self.size || to >= self.size {
            return None;
        }
        self.cells.get(from * self.size + to).copied()
    }

    /// All travel times leaving `from`.
    #[must_use]
    pub fn row(&self, from: usize) -> Option<&[u64]> {
        if from >= self.size {
            return None;
        }
        self.cells.chunks_exact(self.size).nth(from)
    }

    /// Iterate over rows in node order.
    pub fn rows(&self) -> impl Iterator<Item = &[u64]> {
        self.cells.chunks_exact(self.size)
    }
}

/// Query `oracle` for every ordered pair of `coords` and collect the
/// durations into a [`TimeMatrix`].
///
/// Rows are computed concurrently on the `rayon` pool. Each task writes only
/// its own row, so no synchronisation is needed beyond the final collect.
/// Durations are truncated to whole seconds. Diagonal entries are zero and are
/// never sent to the oracle.
///
/// # Errors
///
/// Returns [`MatrixBuildError::EmptyInput`] when `coords` is empty and
/// [`MatrixBuildError::Oracle`] for the first failing pair in row-major
/// order.
///
/// # Examples
/// ```
/// use convoy_core::{StraightLineOracle, build_time_matrix};
/// use geo::Coord;
///
/// let coords = [Coord { x: 0.0, y: 51.5 }, Coord { x: 0.01, y: 51.5 }];
/// let matrix = build_time_matrix(&StraightLineOracle::default(), &coords)?;
/// assert_eq!(matrix.size(), 2);
/// assert_eq!(matrix.get(0, 0), Some(0));
/// assert!(matrix.get(0, 1).is_some_and(|secs| secs > 0));
/// # Ok::<(), convoy_core::MatrixBuildError>(())
/// ```
pub fn build_time_matrix<O>(
    oracle: &O,
    coords: &[Coord<f64>],
) -> Result<TimeMatrix, MatrixBuildError>
where
    O: TravelTimeOracle + Sync + ?Sized,
{
    if coords.is_empty() {
        return Err(MatrixBuildError::EmptyInput);
    }
    let size = coords.len();
    log::debug!("building {size}x{size} travel-time matrix");

    let rows: Vec<Result<Vec<u64>, MatrixBuildError>> = coords
        .par_iter()
        .enumerate()
        .map(|(from, origin)| build_row(oracle, coords, from, *origin))
        .collect();

    let mut cells = Vec::with_capacity(size * size);
    for row in rows {
        cells.extend(row?);
    }
    Ok(TimeMatrix { size, cells })
}

fn build_row<O>(
    oracle: &O,
    coords: &[Coord<f64>],
    from: usize,
    origin: Coord<f64>,
) -> Result<Vec<u64>, MatrixBuildError>
where
    O: TravelTimeOracle + ?Sized,
{
    coords
        .iter()
        .enumerate()
        .map(|(to, destination)| {
            if from == to {
                return Ok(0);
            }
            oracle
                .shortest_path(origin, *destination)
                .map(|leg| leg.duration.as_secs())
                .map_err(|source| MatrixBuildError::Oracle { from, to, source })
        })
        .collect()
}
