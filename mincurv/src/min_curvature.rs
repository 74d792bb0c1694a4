/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the public minimum-curvature gridding entry point.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    error::{GridInterpError, Result},
    field::{ConvergenceReport, FieldValues, InterpolatedField},
    grid::{GridAxes, build_query_grid, check_axis_dimensions},
    interpolant_config::{InterpolationMethod, MinCurvatureSettings},
    relaxation::relax,
    spline::ThinPlateSpline,
};
use faer::Mat;
use std::time::Instant;

/// Interpolates scattered samples onto a regular grid.
///
/// `locations` is `N x D` with `D` in 1..=3 and `values` is `N x M`, one column per
/// channel. Axes missing from `axes` are derived from the sample extent in steps of
/// `settings.grid_size`.
///
/// All inputs are checked before any heavy work, in this order: sample counts,
/// dimensionality, explicit axes against the dimensionality, then the settings.
///
/// # Errors
/// - [`GridInterpError::EmptySampleSet`] when there are no samples.
/// - [`GridInterpError::DimensionMismatch`] when counts or columns disagree.
/// - [`GridInterpError::Configuration`] for invalid settings, e.g. relaxation
///   without `max_iterations`.
/// - [`GridInterpError::DegenerateGrid`] when an axis would have no points.
///
/// Non-convergence is not an error: inspect [`InterpolatedField::is_converged`].
pub fn min_curvature_interp(
    locations: &Mat<f64>,
    values: &Mat<f64>,
    axes: &GridAxes,
    settings: &MinCurvatureSettings,
) -> Result<InterpolatedField> {
    let (num_samples, ndim) = locations.shape();

    if num_samples == 0 {
        return Err(GridInterpError::EmptySampleSet);
    }
    if values.nrows() != num_samples {
        return Err(GridInterpError::dimension_mismatch(format!(
            "{num_samples} locations but {} values",
            values.nrows()
        )));
    }
    if values.ncols() == 0 {
        return Err(GridInterpError::dimension_mismatch(
            "values must have at least one column",
        ));
    }
    if !(1..=3).contains(&ndim) {
        return Err(GridInterpError::dimension_mismatch(format!(
            "point locations must have 1 to 3 coordinate columns, got {ndim}"
        )));
    }
    check_axis_dimensions(ndim, axes)?;
    settings.validate()?;

    let grid = build_query_grid(locations, axes, settings.grid_size)?;
    let start = Instant::now();

    let (values_on_grid, convergence) = match settings.method {
        InterpolationMethod::Spline => {
            let (spline, reports) = ThinPlateSpline::fit(
                locations,
                values,
                settings.drift,
                &settings.spline_params,
                settings.progress_callback.as_ref(),
            );
            (spline.evaluate(grid.points()), ConvergenceReport::Spline(reports))
        }
        InterpolationMethod::Relaxation => {
            let max_iterations = settings.max_iterations.ok_or_else(|| {
                GridInterpError::configuration("relaxation requires max_iterations to be set")
            })?;
            let relaxed = relax(locations, values, &grid, settings, max_iterations)?;
            let converged = relaxed.residual <= settings.tolerance;
            (
                relaxed.values,
                ConvergenceReport::Relaxation {
                    iterations: relaxed.iterations,
                    residual: relaxed.residual,
                    converged,
                },
            )
        }
    };

    tracing::info!(
        method = ?settings.method,
        num_samples,
        num_channels = values.ncols(),
        num_grid_points = grid.num_points(),
        converged = convergence.is_converged(),
        elapsed = ?start.elapsed(),
        "Gridding finished"
    );

    let values = FieldValues::new(values_on_grid, grid.shape(), settings.output_shape);

    Ok(InterpolatedField {
        grid,
        values,
        convergence,
    })
}
