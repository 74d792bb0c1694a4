/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for minimum-curvature gridding.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Minimum-curvature gridding of scattered data.
//!
//! Geophysical surveys produce values at scattered locations, while most
//! processing expects them on a regular grid. This crate interpolates 1D, 2D or
//! 3D samples onto such a grid with one of two methods:
//!
//! - **Spline** - a regularised thin-plate spline `φ(r) = r² (ln √(r² + ε) − 1)`
//!   over the planar sample coordinates, optionally with a constant or linear
//!   drift. The dense weight system is solved with restarted GMRES or BiCGSTAB.
//! - **Relaxation** - the nearest-sample field is smoothed repeatedly with the
//!   cell-centre to face averaging operator of the grid while samples are
//!   re-imposed at nearby grid points.
//!
//! Grid axes are either supplied or derived from the sample extent in steps of the
//! grid size, starting one step above the minimum.
//!
//! # Features
//! - Supports 1D, 2D, and 3D sample locations and any number of value channels
//! - Reports the convergence of every solve alongside the interpolated values
//! - Tiles large surveys into rectangles with a bounded number of locations
//! - Flags cells below a topographic surface
//! - Built on [`faer`](https://docs.rs/faer/latest/faer/) for linear algebra
//!
//! # Examples
//!
//! ```
//! use faer::mat;
//! use mincurv::{
//!     min_curvature_interp, FieldValues, GridAxes,
//!     interpolant_config::{InterpolationMethod, MinCurvatureSettings},
//! };
//!
//! // Four survey corners carrying the same value
//! let locations = mat![[0.0, 0.0], [10.0, 0.0], [0.0, 10.0], [10.0, 10.0]];
//! let values = mat![[1.0], [1.0], [1.0], [1.0]];
//!
//! let settings = MinCurvatureSettings::builder(InterpolationMethod::Spline)
//!     .grid_size(5.0)
//!     .build();
//!
//! // Grid the square on explicit axes
//! let axes = GridAxes::derived()
//!     .x(vec![0.0, 5.0, 10.0])
//!     .y(vec![0.0, 5.0, 10.0]);
//! let field = min_curvature_interp(&locations, &values, &axes, &settings).unwrap();
//! assert!(field.is_converged());
//!
//! let FieldValues::Gridded(gridded) = &field.values else { unreachable!() };
//! let centre = gridded.get(0, &[1, 1]).unwrap();
//! assert!((centre - 1.0).abs() < 1e-3);
//! ```
//!
//! # References
//! 1.  W. H. F. Smith and P. Wessel. Gridding with continuous curvature splines in
//!     tension. Geophysics, 55(3):293–305, 1990.
//! 2.  Fasshauer, G., 2007. Meshfree Approximation Methods with Matlab. World Scientific Publishing Co.
//! 3.  Y. Saad. Iterative Methods for Sparse Linear Systems, 2nd ed. SIAM, 2003.
pub mod interpolant_config;

pub mod config;

pub mod progress;

mod averaging;

mod common;

mod error;

mod field;

mod grid;

mod iterative_solvers;

mod kdtree;

mod min_curvature;

mod polynomials;

mod relaxation;

mod rtree;

mod spline;

mod tiling;

mod topography;

pub use {
    averaging::{CsrMatrix, average_cc_to_faces, average_cc_to_nodes_1d},
    common::generate_random_points,
    error::{Axis, GridInterpError, Result},
    field::{ConvergenceReport, FieldValues, GriddedValues, InterpolatedField},
    grid::{GridAxes, GridShape, QueryGrid, build_query_grid, derive_axis_vector},
    iterative_solvers::{SolveReport, SolveStatus},
    kdtree::{KDTree, NearestNeighbours},
    min_curvature::min_curvature_interp,
    tiling::{Tiles, tile_survey_points},
    topography::{TopoInterpolation, active_cells_below_topography},
};
