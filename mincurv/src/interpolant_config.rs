/////////////////////////////////////////////////////////////////////////////////////////////
//
// Specifies method, drift, output shape and tolerance options for minimum-curvature gridding.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Specifies method, drift, output shape and tolerance options for minimum-curvature gridding.
use crate::{
    config::{RelaxationParams, SplineParams},
    error::GridInterpError,
    progress::ProgressSink,
};
use mincurv_utils::constants::{DEFAULT_GRID_SIZE, DEFAULT_TOLERANCE};
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};

/// The interpolation algorithm used to fill the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InterpolationMethod {
    /// Thin plate spline: a dense radial basis system solved for per-sample weights.
    #[default]
    Spline,

    /// Iterative smoothing of a nearest-neighbour seeded grid with the
    /// samples re-imposed before every step.
    Relaxation,
}

impl FromStr for InterpolationMethod {
    type Err = GridInterpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spline" => Ok(InterpolationMethod::Spline),
            "relaxation" => Ok(InterpolationMethod::Relaxation),
            other => Err(GridInterpError::configuration(format!(
                "unsupported method '{other}', only 'spline' or 'relaxation' are available"
            ))),
        }
    }
}

/// Polynomial drift appended to the spline system.
///
/// The bare thin plate system (`None`) does not reproduce constant data away
/// from the samples. `Constant` and `Linear` add the side conditions needed to
/// reproduce constant (respectively planar) fields exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Drift {
    None,
    #[default]
    Constant,
    Linear,
}

impl Drift {
    /// Polynomial degree of the drift, `-1` when there is none.
    pub fn degree(&self) -> i32 {
        match self {
            Drift::None => -1,
            Drift::Constant => 0,
            Drift::Linear => 1,
        }
    }
}

/// Shape of the returned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputShape {
    /// One buffer per channel addressed by grid index `(ix, iy, iz)`.
    #[default]
    Reshaped,

    /// A `G x M` matrix with grid points in flattened (x fastest) order.
    Flattened,
}

/// A convenience builder for constructing a [`MinCurvatureSettings`] instance.
///
/// The builder should be called via the [`MinCurvatureSettings::builder`] method.
///
/// See [`MinCurvatureSettings`] for details on each field.
#[derive(Debug, Clone)]
pub struct MinCurvatureSettingsBuilder {
    pub method: InterpolationMethod,
    pub grid_size: f64,
    pub tolerance: f64,
    pub max_iterations: Option<usize>,
    pub output_shape: OutputShape,
    pub drift: Drift,
    pub spline_params: SplineParams,
    pub relaxation_params: RelaxationParams,
    pub progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl MinCurvatureSettingsBuilder {
    /// Creates a new instance of the [`MinCurvatureSettingsBuilder`].
    fn new(method: InterpolationMethod) -> Self {
        Self {
            method,
            grid_size: DEFAULT_GRID_SIZE,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: None,
            output_shape: OutputShape::default(),
            drift: Drift::default(),
            spline_params: SplineParams::default(),
            relaxation_params: RelaxationParams::default(),
            progress_callback: None,
        }
    }

    /// Sets the grid point separation.
    pub fn grid_size(mut self, grid_size: f64) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Sets the relaxation convergence tolerance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the relaxation iteration cap.
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Sets the shape of the returned values.
    pub fn output_shape(mut self, output_shape: OutputShape) -> Self {
        self.output_shape = output_shape;
        self
    }

    /// Sets the polynomial drift of the spline system.
    pub fn drift(mut self, drift: Drift) -> Self {
        self.drift = drift;
        self
    }

    /// Sets the spline solver parameters.
    pub fn spline_params(mut self, spline_params: SplineParams) -> Self {
        self.spline_params = spline_params;
        self
    }

    /// Sets the relaxation parameters.
    pub fn relaxation_params(mut self, relaxation_params: RelaxationParams) -> Self {
        self.relaxation_params = relaxation_params;
        self
    }

    /// Optional callback for reporting solver progress.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Builds and returns an instance of [`MinCurvatureSettings`] from the values
    /// defined in the builder.
    pub fn build(self) -> MinCurvatureSettings {
        MinCurvatureSettings {
            method: self.method,
            grid_size: self.grid_size,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            output_shape: self.output_shape,
            drift: self.drift,
            spline_params: self.spline_params,
            relaxation_params: self.relaxation_params,
            progress_callback: self.progress_callback,
        }
    }
}

/// Settings of a [`min_curvature_interp`](crate::min_curvature_interp) call.
///
/// ### Default Values
/// - `grid_size`: `10.0`
/// - `tolerance`: `1e-5`
/// - `max_iterations`: `None` (must be set for [`InterpolationMethod::Relaxation`])
/// - `output_shape`: [`OutputShape::Reshaped`]
/// - `drift`: [`Drift::Constant`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinCurvatureSettings {
    /// Interpolation algorithm.
    pub method: InterpolationMethod,

    /// Separation of derived grid points, and the unit of the relaxation snap radius.
    pub grid_size: f64,

    /// Relative residual at which the relaxation loop stops.
    pub tolerance: f64,

    /// Iteration cap of the relaxation loop.
    pub max_iterations: Option<usize>,

    /// Shape of the returned values.
    pub output_shape: OutputShape,

    /// Polynomial drift of the spline system.
    pub drift: Drift,

    /// Parameters of the spline weight solve.
    pub spline_params: SplineParams,

    /// Parameters of the relaxation loop.
    pub relaxation_params: RelaxationParams,

    /// Optional progress sink. Not serialised.
    #[serde(skip)]
    pub progress_callback: Option<Arc<dyn ProgressSink>>,
}

impl MinCurvatureSettings {
    /// Returns a new [`MinCurvatureSettingsBuilder`] for the given method.
    pub fn builder(method: InterpolationMethod) -> MinCurvatureSettingsBuilder {
        MinCurvatureSettingsBuilder::new(method)
    }

    /// Checks the settings for the selected method without touching any data.
    pub(crate) fn validate(&self) -> Result<(), GridInterpError> {
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err(GridInterpError::configuration(format!(
                "grid size must be a positive finite number, got {}",
                self.grid_size
            )));
        }

        match self.method {
            InterpolationMethod::Relaxation => {
                if self.max_iterations.is_none() {
                    return Err(GridInterpError::configuration(
                        "relaxation requires max_iterations to be set",
                    ));
                }
                if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
                    return Err(GridInterpError::configuration(format!(
                        "relaxation tolerance must be a non-negative finite number, got {}",
                        self.tolerance
                    )));
                }
                let factor = self.relaxation_params.snap_radius_factor;
                if !(factor.is_finite() && factor >= 0.0) {
                    return Err(GridInterpError::configuration(format!(
                        "snap radius factor must be a non-negative finite number, got {factor}"
                    )));
                }
            }
            InterpolationMethod::Spline => {
                let params = &self.spline_params;
                if !(params.tolerance.is_finite() && params.tolerance > 0.0) {
                    return Err(GridInterpError::configuration(format!(
                        "spline tolerance must be a positive finite number, got {}",
                        params.tolerance
                    )));
                }
                if params.max_iterations == 0 || params.restart == 0 {
                    return Err(GridInterpError::configuration(
                        "spline max_iterations and restart must be at least 1",
                    ));
                }
                if !(params.epsilon.is_finite() && params.epsilon > 0.0) {
                    return Err(GridInterpError::configuration(format!(
                        "kernel epsilon must be a positive finite number, got {}",
                        params.epsilon
                    )));
                }
            }
        }

        Ok(())
    }
}
