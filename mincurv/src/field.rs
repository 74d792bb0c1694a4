/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the interpolated field returned by a gridding call and its convergence summary.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    grid::{GridShape, QueryGrid},
    interpolant_config::OutputShape,
    iterative_solvers::SolveReport,
};
use faer::Mat;
use serde::{Deserialize, Serialize};

/// Values laid out on the native grid shape, one buffer per channel.
///
/// Each buffer is stored with x varying fastest, so grid index `(ix, iy, iz)` sits
/// at offset `ix + nx * (iy + ny * iz)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GriddedValues {
    shape: GridShape,
    channels: Vec<Vec<f64>>,
}

impl GriddedValues {
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// The buffer of one channel, or `None` when `channel` is out of range.
    pub fn channel(&self, channel: usize) -> Option<&[f64]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    /// Value of `channel` at grid index `index` (`[ix]`, `[ix, iy]` or `[ix, iy, iz]`).
    pub fn get(&self, channel: usize, index: &[usize]) -> Option<f64> {
        let flat = self.shape.flat_index(index)?;
        self.channels.get(channel)?.get(flat).copied()
    }
}

/// Interpolated values in the requested [`OutputShape`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValues {
    /// One row per grid point, in grid order, and one column per channel.
    Flattened(Mat<f64>),

    /// Values reshaped to the grid.
    Gridded(GriddedValues),
}

impl FieldValues {
    pub(crate) fn new(values: Mat<f64>, shape: GridShape, output_shape: OutputShape) -> Self {
        match output_shape {
            OutputShape::Flattened => FieldValues::Flattened(values),
            OutputShape::Reshaped => FieldValues::Gridded(GriddedValues {
                shape,
                channels: values
                    .col_iter()
                    .map(|column| column.iter().copied().collect())
                    .collect(),
            }),
        }
    }

    /// The values as a `G x M` matrix in grid order, whichever shape they were returned in.
    pub fn to_flattened(&self) -> Mat<f64> {
        match self {
            FieldValues::Flattened(values) => values.clone(),
            FieldValues::Gridded(gridded) => {
                let num_points = gridded.shape.num_points();
                Mat::from_fn(num_points, gridded.channels.len(), |g, c| gridded.channels[c][g])
            }
        }
    }
}

/// How the solve behind a field terminated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConvergenceReport {
    /// One report per value channel.
    Spline(Vec<SolveReport>),

    Relaxation {
        iterations: usize,
        residual: f64,
        converged: bool,
    },
}

impl ConvergenceReport {
    pub fn is_converged(&self) -> bool {
        match self {
            ConvergenceReport::Spline(reports) => reports.iter().all(SolveReport::is_converged),
            ConvergenceReport::Relaxation { converged, .. } => *converged,
        }
    }
}

/// Result of [`min_curvature_interp`](crate::min_curvature_interp): the query grid,
/// the values on it and the convergence of the solve.
///
/// A field that did not converge still carries the best available values.
#[derive(Debug, Clone)]
pub struct InterpolatedField {
    pub grid: QueryGrid,
    pub values: FieldValues,
    pub convergence: ConvergenceReport,
}

impl InterpolatedField {
    pub fn is_converged(&self) -> bool {
        self.convergence.is_converged()
    }
}
