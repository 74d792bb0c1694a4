/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports kernels, constants, and helper functions used across the mincurv crates.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the [`mincurv`] crate
pub mod constants;
mod rbf_kernels;
mod traits;
mod utils;

/// Radial basis kernels available to the spline gridding solver.
pub mod kernels {
    pub use super::rbf_kernels::*;
}

pub use {
    traits::RadialKernel,
    utils::{
        get_distance, get_pointarray_extents, is_strictly_increasing, linspace,
        planar_distance_sq, select_mat_rows,
    },
};
