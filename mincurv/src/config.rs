/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares solver parameter types for the spline and relaxation gridding modes.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares solver parameter types for the spline and relaxation gridding modes.
use mincurv_utils::constants::{
    DEFAULT_GMRES_RESTART, DEFAULT_SPLINE_MAX_ITERATIONS, DEFAULT_SPLINE_TOLERANCE,
    SNAP_RADIUS_FACTOR, THIN_PLATE_EPSILON,
};
use serde::{Deserialize, Serialize};

/// Enum for the available iterative solvers of the spline weights.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SplineSolver {
    /// Stabilised bi-conjugate gradient method (BiCGSTAB).
    BiCgStab,

    /// Generalised minimal residual method (GMRES) with restarts.
    #[default]
    Gmres,
}

/// Parameters of the spline weight solve.
///
/// ### Default Values
/// - `solver`: [`SplineSolver::Gmres`]
/// - `tolerance`: `1e-6` (relative to the norm of the right-hand side)
/// - `max_iterations`: `1000`
/// - `restart`: `200`
/// - `epsilon`: `1e-8`
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct SplineParams {
    /// Iterative solver used for the weights.
    pub solver: SplineSolver,

    /// Relative residual at which the solve stops.
    pub tolerance: f64,

    /// Iteration cap of the solve, counted in operator applications
    /// for GMRES and in full BiCGSTAB steps otherwise.
    pub max_iterations: usize,

    /// Maximum Krylov basis size between GMRES restarts.
    pub restart: usize,

    /// Floor added inside the kernel logarithm.
    pub epsilon: f64,
}

impl Default for SplineParams {
    fn default() -> Self {
        SplineParams {
            solver: SplineSolver::default(),
            tolerance: DEFAULT_SPLINE_TOLERANCE,
            max_iterations: DEFAULT_SPLINE_MAX_ITERATIONS,
            restart: DEFAULT_GMRES_RESTART,
            epsilon: THIN_PLATE_EPSILON,
        }
    }
}

/// Parameters of the relaxation loop other than its tolerance and iteration cap.
///
/// ### Default Values
/// - `snap_radius_factor`: `1.1`
/// - `normalize_smoothing`: `false`
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct RelaxationParams {
    /// Grid points closer than `snap_radius_factor * grid_size` to their
    /// nearest sample are reset to that sample's value before every smoothing step.
    pub snap_radius_factor: f64,

    /// When set, each smoothing step `Avᵀ(Av m)` is divided by `Avᵀ(Av 1)`
    /// so that it averages rather than amplifies the field.
    pub normalize_smoothing: bool,
}

impl Default for RelaxationParams {
    fn default() -> Self {
        RelaxationParams {
            snap_radius_factor: SNAP_RADIUS_FACTOR,
            normalize_smoothing: false,
        }
    }
}
