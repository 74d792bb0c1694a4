/////////////////////////////////////////////////////////////////////////////////////////////
//
// Builds the regular query grid spanning the extent of scattered sample locations.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Regular query grids derived from sample extents or explicit axis vectors.
//!
//! Grid points are flattened with x varying fastest, then y, then z, so the
//! point at grid index `(ix, iy, iz)` sits at row `ix + nx * (iy + ny * iz)`.
use crate::error::{Axis, GridInterpError, Result};
use faer::Mat;
use mincurv_utils::is_strictly_increasing;
use serde::{Deserialize, Serialize};

/// Number of grid points along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridShape {
    OneD(usize),
    TwoD(usize, usize),
    ThreeD(usize, usize, usize),
}

impl GridShape {
    /// Number of spatial dimensions.
    pub fn ndim(&self) -> usize {
        match self {
            GridShape::OneD(..) => 1,
            GridShape::TwoD(..) => 2,
            GridShape::ThreeD(..) => 3,
        }
    }

    /// Point counts per axis, in x, y, z order.
    pub fn dims(&self) -> Vec<usize> {
        match *self {
            GridShape::OneD(nx) => vec![nx],
            GridShape::TwoD(nx, ny) => vec![nx, ny],
            GridShape::ThreeD(nx, ny, nz) => vec![nx, ny, nz],
        }
    }

    /// Total number of grid points.
    pub fn num_points(&self) -> usize {
        self.dims().iter().product()
    }

    /// Flattened row of the grid point at `index`, or `None` when the index has
    /// the wrong length or lies outside the grid.
    pub fn flat_index(&self, index: &[usize]) -> Option<usize> {
        let dims = self.dims();
        if index.len() != dims.len() || index.iter().zip(dims.iter()).any(|(i, n)| i >= n) {
            return None;
        }

        let mut flat = 0;
        let mut stride = 1;
        for (i, n) in index.iter().zip(dims.iter()) {
            flat += i * stride;
            stride *= n;
        }
        Some(flat)
    }

    fn from_dims(dims: &[usize]) -> Self {
        match *dims {
            [nx] => GridShape::OneD(nx),
            [nx, ny] => GridShape::TwoD(nx, ny),
            [nx, ny, nz, ..] => GridShape::ThreeD(nx, ny, nz),
            [] => GridShape::OneD(0),
        }
    }
}

/// Optional explicit axis vectors. Missing axes are derived from the sample extent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridAxes {
    pub x: Option<Vec<f64>>,
    pub y: Option<Vec<f64>>,
    pub z: Option<Vec<f64>>,
}

impl GridAxes {
    /// No explicit axes: every axis is derived from the samples.
    pub fn derived() -> Self {
        Self::default()
    }

    /// Sets the explicit x axis.
    pub fn x(mut self, x: Vec<f64>) -> Self {
        self.x = Some(x);
        self
    }

    /// Sets the explicit y axis.
    pub fn y(mut self, y: Vec<f64>) -> Self {
        self.y = Some(y);
        self
    }

    /// Sets the explicit z axis.
    pub fn z(mut self, z: Vec<f64>) -> Self {
        self.z = Some(z);
        self
    }

    fn get(&self, axis: Axis) -> Option<&Vec<f64>> {
        match axis {
            Axis::X => self.x.as_ref(),
            Axis::Y => self.y.as_ref(),
            Axis::Z => self.z.as_ref(),
        }
    }
}

/// A regular grid of query points.
#[derive(Debug, Clone)]
pub struct QueryGrid {
    axes: Vec<Vec<f64>>,
    shape: GridShape,
    points: Mat<f64>,
}

impl QueryGrid {
    /// Builds the Cartesian product of one to three strictly increasing axis vectors.
    pub fn from_axes(axes: Vec<Vec<f64>>) -> Result<Self> {
        if axes.is_empty() || axes.len() > 3 {
            return Err(GridInterpError::dimension_mismatch(format!(
                "a query grid needs 1 to 3 axes, got {}",
                axes.len()
            )));
        }

        for (axis_vector, axis) in axes.iter().zip([Axis::X, Axis::Y, Axis::Z]) {
            if !is_strictly_increasing(axis_vector) {
                return Err(GridInterpError::configuration(format!(
                    "{axis} axis must be finite and strictly increasing"
                )));
            }
        }

        let dims: Vec<usize> = axes.iter().map(|a| a.len()).collect();
        let shape = GridShape::from_dims(&dims);
        let num_points = shape.num_points();
        let ndim = axes.len();

        let points = Mat::from_fn(num_points, ndim, |row, col| {
            let stride: usize = dims[..col].iter().product();
            let index_in_dim = (row / stride) % dims[col];
            axes[col][index_in_dim]
        });

        Ok(Self {
            axes,
            shape,
            points,
        })
    }

    /// The axis vectors, in x, y, z order.
    pub fn axes(&self) -> &[Vec<f64>] {
        &self.axes
    }

    /// Number of grid points along each axis.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Flattened grid point coordinates, one row per point.
    pub fn points(&self) -> &Mat<f64> {
        &self.points
    }

    /// Total number of grid points.
    pub fn num_points(&self) -> usize {
        self.points.nrows()
    }
}

/// Derives an axis vector `min + cumsum([grid_size; n])` with
/// `n = floor((max - min) / grid_size)`.
///
/// The first entry is `min + grid_size`: the minimum itself is never part of the axis.
/// An extent smaller than `grid_size` gives an empty vector.
///
/// # Examples
///
/// ```
/// use mincurv::derive_axis_vector;
///
/// assert_eq!(derive_axis_vector(0.0, 10.0, 5.0), vec![5.0, 10.0]);
/// assert_eq!(derive_axis_vector(0.0, 9.0, 2.0), vec![2.0, 4.0, 6.0, 8.0]);
/// assert!(derive_axis_vector(0.0, 4.0, 5.0).is_empty());
/// ```
pub fn derive_axis_vector(min: f64, max: f64, grid_size: f64) -> Vec<f64> {
    let steps = ((max - min) / grid_size).floor();
    if !(steps.is_finite() && steps >= 1.0) {
        return Vec::new();
    }

    let mut offset = 0.0;
    (0..steps as usize)
        .map(|_| {
            offset += grid_size;
            min + offset
        })
        .collect()
}

/// Checks that the explicit axes are compatible with the number of coordinate columns.
pub(crate) fn check_axis_dimensions(ndim: usize, axes: &GridAxes) -> Result<()> {
    if axes.y.is_some() && ndim < 2 {
        return Err(GridInterpError::dimension_mismatch(
            "found a y axis vector, point locations must contain X and Y coordinates",
        ));
    }
    if axes.z.is_some() && ndim != 3 {
        return Err(GridInterpError::dimension_mismatch(
            "found a z axis vector, point locations must contain X, Y and Z coordinates",
        ));
    }
    Ok(())
}

/// Builds the query grid for `locations` (`N x D`, `D` in 1..=3), deriving any axis
/// that is not given explicitly from the sample extent along that axis.
pub fn build_query_grid(locations: &Mat<f64>, axes: &GridAxes, grid_size: f64) -> Result<QueryGrid> {
    let (num_points, ndim) = locations.shape();
    if num_points == 0 {
        return Err(GridInterpError::EmptySampleSet);
    }
    if !(1..=3).contains(&ndim) {
        return Err(GridInterpError::dimension_mismatch(format!(
            "point locations must have 1 to 3 coordinate columns, got {ndim}"
        )));
    }
    check_axis_dimensions(ndim, axes)?;

    let mut axis_vectors = Vec::with_capacity(ndim);
    for (col, axis) in [Axis::X, Axis::Y, Axis::Z].into_iter().take(ndim).enumerate() {
        let axis_vector = match axes.get(axis) {
            Some(explicit) => {
                if explicit.is_empty() {
                    return Err(GridInterpError::DegenerateGrid {
                        axis,
                        extent: 0.0,
                        grid_size,
                    });
                }
                explicit.clone()
            }
            None => {
                let (min, max) = locations
                    .col(col)
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(*v), hi.max(*v))
                    });
                let derived = derive_axis_vector(min, max, grid_size);
                if derived.is_empty() {
                    return Err(GridInterpError::DegenerateGrid {
                        axis,
                        extent: max - min,
                        grid_size,
                    });
                }
                derived
            }
        };
        axis_vectors.push(axis_vector);
    }

    let grid = QueryGrid::from_axes(axis_vectors)?;

    tracing::debug!(
        shape = ?grid.shape().dims(),
        num_points = grid.num_points(),
        "built query grid"
    );

    Ok(grid)
}
