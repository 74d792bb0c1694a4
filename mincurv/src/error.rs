/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the error type returned by the gridding, tiling and masking entry points.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Error types for the gridding entry points.
//!
//! Every variant is fatal and is returned before any heavy computation starts.
//! Non-convergence of the spline solver is *not* an error: it is reported through
//! [`ConvergenceReport`](crate::ConvergenceReport) alongside a usable result.
use thiserror::Error;

/// Crate result type.
pub type Result<T> = std::result::Result<T, GridInterpError>;

/// Spatial axis of a query grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Errors raised by [`min_curvature_interp`](crate::min_curvature_interp) and the
/// other public entry points.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridInterpError {
    /// Location/value counts differ, or an axis vector is incompatible with the
    /// number of coordinate columns.
    #[error("dimension mismatch: {message}")]
    DimensionMismatch { message: String },

    /// An unsupported or incomplete configuration was requested.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// An axis vector has no points, so the grid would be empty.
    #[error("degenerate grid: {axis} axis has no points (extent {extent}, grid size {grid_size})")]
    DegenerateGrid {
        axis: Axis,
        extent: f64,
        grid_size: f64,
    },

    /// No sample locations were supplied.
    #[error("sample set is empty")]
    EmptySampleSet,
}

impl GridInterpError {
    pub(crate) fn dimension_mismatch(message: impl Into<String>) -> Self {
        GridInterpError::DimensionMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        GridInterpError::Configuration {
            message: message.into(),
        }
    }
}
