/////////////////////////////////////////////////////////////////////////////////////////////
//
// Builds sparse cell-centre to face averaging operators for the relaxation solver.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Sparse averaging operators on regular grids.
//!
//! Grid values are treated as cell-centre values, flattened with x fastest. The
//! operators map them to the faces between (and beyond) the cells, one block of
//! faces per axis, and are assembled from Kronecker products of 1D stencils.
use crate::grid::GridShape;
use std::collections::BTreeMap;

/// Compressed sparse row matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Builds a matrix from per-row `(column, value)` entries. Repeated columns
    /// within a row are summed and each row is stored in column order.
    pub fn from_rows(n_cols: usize, rows: Vec<Vec<(usize, f64)>>) -> Self {
        let n_rows = rows.len();
        let mut row_ptr = Vec::with_capacity(n_rows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);

        for entries in rows {
            let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
            for (col, value) in entries {
                assert!(col < n_cols, "column {col} out of bounds for {n_cols} columns");
                *merged.entry(col).or_insert(0.0) += value;
            }
            for (col, value) in merged {
                col_idx.push(col);
                values.push(value);
            }
            row_ptr.push(col_idx.len());
        }

        Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        Self::from_rows(n, (0..n).map(|i| vec![(i, 1.0)]).collect())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored entries of one row as `(column, value)` pairs.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (start, end) = (self.row_ptr[row], self.row_ptr[row + 1]);
        self.col_idx[start..end]
            .iter()
            .copied()
            .zip(self.values[start..end].iter().copied())
    }

    /// Entry at `(row, col)`, zero when not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.row(row)
            .find(|(c, _)| *c == col)
            .map_or(0.0, |(_, v)| v)
    }

    /// Kronecker product `self ⊗ other`.
    pub fn kron(&self, other: &CsrMatrix) -> CsrMatrix {
        let mut rows = Vec::with_capacity(self.n_rows * other.n_rows);
        for outer_row in 0..self.n_rows {
            for inner_row in 0..other.n_rows {
                let entries = self
                    .row(outer_row)
                    .flat_map(|(outer_col, outer_value)| {
                        other.row(inner_row).map(move |(inner_col, inner_value)| {
                            (outer_col * other.n_cols + inner_col, outer_value * inner_value)
                        })
                    })
                    .collect();
                rows.push(entries);
            }
        }
        CsrMatrix::from_rows(self.n_cols * other.n_cols, rows)
    }

    /// Stacks matrices with equal column counts on top of each other.
    pub fn vstack(blocks: &[CsrMatrix]) -> CsrMatrix {
        let n_cols = blocks.first().map_or(0, |b| b.n_cols);
        let mut rows = Vec::with_capacity(blocks.iter().map(|b| b.n_rows).sum());
        for block in blocks {
            assert_eq!(block.n_cols, n_cols, "vstack blocks must share a column count");
            for row in 0..block.n_rows {
                rows.push(block.row(row).collect());
            }
        }
        CsrMatrix::from_rows(n_cols, rows)
    }

    /// `y = A x`
    pub fn mul_vec(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.n_cols, "x length must equal the column count");
        assert_eq!(y.len(), self.n_rows, "y length must equal the row count");

        for (row, out) in y.iter_mut().enumerate() {
            *out = self.row(row).map(|(col, value)| value * x[col]).sum();
        }
    }

    /// `y = Aᵀ x`
    pub fn transpose_mul_vec(&self, x: &[f64], y: &mut [f64]) {
        assert_eq!(x.len(), self.n_rows, "x length must equal the row count");
        assert_eq!(y.len(), self.n_cols, "y length must equal the column count");

        y.fill(0.0);
        for (row, x_row) in x.iter().enumerate() {
            for (col, value) in self.row(row) {
                y[col] += value * x_row;
            }
        }
    }
}

/// 1D averaging from `n` cell centres to the `n + 1` nodes around them.
///
/// Interior nodes average their two neighbouring cells. The end nodes are
/// extrapolated from the first (last) two cells with equal weights. A single
/// cell is copied to both of its nodes.
///
/// # Examples
///
/// ```
/// use mincurv::average_cc_to_nodes_1d;
///
/// let av = average_cc_to_nodes_1d(3);
/// assert_eq!((av.n_rows(), av.n_cols()), (4, 3));
/// assert_eq!(av.get(0, 0), 0.5);
/// assert_eq!(av.get(0, 1), 0.5);
/// assert_eq!(av.get(3, 1), 0.5);
/// assert_eq!(av.get(3, 2), 0.5);
/// ```
pub fn average_cc_to_nodes_1d(n: usize) -> CsrMatrix {
    let rows = match n {
        0 => vec![Vec::new()],
        1 => vec![vec![(0, 1.0)], vec![(0, 1.0)]],
        _ => (0..=n)
            .map(|node| match node {
                0 => vec![(0, 0.5), (1, 0.5)],
                last if last == n => vec![(n - 2, 0.5), (n - 1, 0.5)],
                interior => vec![(interior - 1, 0.5), (interior, 0.5)],
            })
            .collect(),
    };
    CsrMatrix::from_rows(n, rows)
}

/// Averaging operator from the cell centres of `shape` to its faces.
///
/// Face blocks are stacked x first, then y, then z:
/// - 1D: `Av(nx)`
/// - 2D: `[I(ny) ⊗ Av(nx); Av(ny) ⊗ I(nx)]`
/// - 3D: `[I(nz) ⊗ I(ny) ⊗ Av(nx); I(nz) ⊗ Av(ny) ⊗ I(nx); Av(nz) ⊗ I(ny) ⊗ I(nx)]`
pub fn average_cc_to_faces(shape: GridShape) -> CsrMatrix {
    match shape {
        GridShape::OneD(nx) => average_cc_to_nodes_1d(nx),
        GridShape::TwoD(nx, ny) => CsrMatrix::vstack(&[
            CsrMatrix::identity(ny).kron(&average_cc_to_nodes_1d(nx)),
            average_cc_to_nodes_1d(ny).kron(&CsrMatrix::identity(nx)),
        ]),
        GridShape::ThreeD(nx, ny, nz) => CsrMatrix::vstack(&[
            kron3(
                &CsrMatrix::identity(nz),
                &CsrMatrix::identity(ny),
                &average_cc_to_nodes_1d(nx),
            ),
            kron3(
                &CsrMatrix::identity(nz),
                &average_cc_to_nodes_1d(ny),
                &CsrMatrix::identity(nx),
            ),
            kron3(
                &average_cc_to_nodes_1d(nz),
                &CsrMatrix::identity(ny),
                &CsrMatrix::identity(nx),
            ),
        ]),
    }
}

fn kron3(a: &CsrMatrix, b: &CsrMatrix, c: &CsrMatrix) -> CsrMatrix {
    a.kron(&b.kron(c))
}
