/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines numerical constants and default settings shared by the gridding crates.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

/// Additive floor inside the thin plate logarithm, keeps `ln(0)` out of the kernel.
pub const THIN_PLATE_EPSILON: f64 = 1e-8;

/// Default grid point separation, in the units of the sample coordinates.
pub const DEFAULT_GRID_SIZE: f64 = 10.0;

/// Default relative convergence tolerance of the relaxation loop.
pub const DEFAULT_TOLERANCE: f64 = 1e-5;

/// Relative tolerance used when solving the spline weights.
pub const DEFAULT_SPLINE_TOLERANCE: f64 = 1e-6;

/// Upper bound on Krylov iterations for the spline weights.
pub const DEFAULT_SPLINE_MAX_ITERATIONS: usize = 1000;

/// Maximum Krylov basis size between GMRES restarts.
pub const DEFAULT_GMRES_RESTART: usize = 200;

/// Grid points closer than this multiple of the grid size to a sample
/// are pinned to the sample value during relaxation.
pub const SNAP_RADIUS_FACTOR: f64 = 1.1;
