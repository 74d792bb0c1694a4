/////////////////////////////////////////////////////////////////////////////////////////////
//
// Assembles, solves, and evaluates the thin-plate spline system of the spline gridding mode.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Thin-plate spline gridding.
//!
//! The kernel matrix `A[i, j] = φ(‖xᵢ − xⱼ‖²)` over the planar sample coordinates is
//! assembled densely, optionally bordered by a polynomial drift block
//!
//! ```text
//! [ A   P ] [ w ]   [ d ]
//! [ Pᵀ  0 ] [ a ] = [ 0 ]
//! ```
//!
//! and solved once per value channel with the configured Krylov method.

use crate::{
    config::{SplineParams, SplineSolver},
    interpolant_config::Drift,
    iterative_solvers::{SolveReport, bicgstab, gmres},
    polynomials::DriftBasis,
    progress::{ProgressMsg, ProgressSink},
};
use faer::{Mat, MatRef};
use mincurv_utils::{RadialKernel, kernels::RegularizedThinPlateKernel, planar_distance_sq};
use rayon::prelude::*;
use std::{sync::Arc, time::Instant};

/// Fitted spline: kernel weights and drift coefficients per value channel.
#[derive(Debug, Clone)]
pub(crate) struct ThinPlateSpline {
    centres: Mat<f64>,
    kernel: RegularizedThinPlateKernel,
    basis: DriftBasis,
    weights: Mat<f64>,
    drift_coefficients: Mat<f64>,
}

impl ThinPlateSpline {
    /// Fits the spline to `values` (one column per channel) at `locations`.
    ///
    /// Returns the spline and one solve report per channel. Channels whose solve
    /// does not converge keep their approximate weights.
    pub(crate) fn fit(
        locations: &Mat<f64>,
        values: &Mat<f64>,
        drift: Drift,
        params: &SplineParams,
        callback: Option<&Arc<dyn ProgressSink>>,
    ) -> (Self, Vec<SolveReport>) {
        let kernel = RegularizedThinPlateKernel {
            epsilon: params.epsilon,
        };
        let basis = DriftBasis::new(locations, drift);
        let num_samples = locations.nrows();
        let basis_size = basis.size();

        let assembly_start = Instant::now();
        let system = assemble_system(locations, &kernel, &basis);
        tracing::debug!(
            num_samples,
            drift = ?basis.drift(),
            basis_size,
            elapsed = ?assembly_start.elapsed(),
            "Assembled spline system"
        );

        let operator = |x: &MatRef<f64>| system.as_ref() * *x;

        let mut weights = Mat::<f64>::zeros(num_samples, values.ncols());
        let mut drift_coefficients = Mat::<f64>::zeros(basis_size, values.ncols());
        let mut reports = Vec::with_capacity(values.ncols());

        for channel in 0..values.ncols() {
            let mut rhs = Mat::<f64>::zeros(num_samples + basis_size, 1);
            rhs.subrows_mut(0, num_samples)
                .col_mut(0)
                .copy_from(values.col(channel));

            let solve_start = Instant::now();
            let (solution, report) = match params.solver {
                SplineSolver::Gmres => gmres(&operator, rhs.as_ref(), params, channel, callback),
                SplineSolver::BiCgStab => bicgstab(&operator, rhs.as_ref(), params, channel, callback),
            };

            match report.is_converged() {
                true => tracing::info!(
                    channel,
                    iterations = report.iterations,
                    residual = report.relative_residual,
                    elapsed = ?solve_start.elapsed(),
                    "Spline weights solved"
                ),
                false => tracing::warn!(
                    channel,
                    status = ?report.status,
                    iterations = report.iterations,
                    residual = report.relative_residual,
                    tolerance = params.tolerance,
                    "Spline weight solve did not converge; using approximate weights"
                ),
            }

            weights
                .col_mut(channel)
                .copy_from(solution.subrows(0, num_samples).col(0));
            drift_coefficients
                .col_mut(channel)
                .copy_from(solution.subrows(num_samples, basis_size).col(0));
            reports.push(report);
        }

        if let Some(sink) = callback {
            sink.emit(ProgressMsg::Message {
                message: format!("Spline fitted to {num_samples} samples"),
            });
        }

        (
            ThinPlateSpline {
                centres: locations.clone(),
                kernel,
                basis,
                weights,
                drift_coefficients,
            },
            reports,
        )
    }

    /// Evaluates every channel at `points`, one row per point.
    pub(crate) fn evaluate(&self, points: &Mat<f64>) -> Mat<f64> {
        let num_channels = self.weights.ncols();
        let drift_values = &self.basis.evaluate(points) * &self.drift_coefficients;

        let rows: Vec<Vec<f64>> = (0..points.nrows())
            .into_par_iter()
            .map(|g| {
                let target = points.row(g);
                let mut out = vec![0.0; num_channels];
                for i in 0..self.centres.nrows() {
                    let phi = self
                        .kernel
                        .phi_sq(planar_distance_sq(target, self.centres.row(i)));
                    for (channel, value) in out.iter_mut().enumerate() {
                        *value += self.weights[(i, channel)] * phi;
                    }
                }
                out
            })
            .collect();

        Mat::from_fn(points.nrows(), num_channels, |g, channel| {
            rows[g][channel] + drift_values[(g, channel)]
        })
    }
}

/// Dense bordered system `[A P; Pᵀ 0]`, kernel rows assembled in parallel.
fn assemble_system(
    locations: &Mat<f64>,
    kernel: &RegularizedThinPlateKernel,
    basis: &DriftBasis,
) -> Mat<f64> {
    let n = locations.nrows();
    let q = basis.size();

    let kernel_rows: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            let source = locations.row(i);
            (0..n)
                .map(|j| kernel.phi_sq(planar_distance_sq(source, locations.row(j))))
                .collect()
        })
        .collect();

    let polynomials = basis.evaluate(locations);

    Mat::from_fn(n + q, n + q, |i, j| match (i < n, j < n) {
        (true, true) => kernel_rows[i][j],
        (true, false) => polynomials[(i, j - n)],
        (false, true) => polynomials[(j, i - n)],
        (false, false) => 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::generate_random_points;
    use crate::iterative_solvers::SolveStatus;
    use faer::mat;

    fn tight_params(solver: SplineSolver) -> SplineParams {
        SplineParams {
            solver,
            tolerance: 1e-12,
            ..SplineParams::default()
        }
    }

    #[test]
    fn system_is_symmetric_with_zero_diagonal() {
        let locations = generate_random_points(12, 2, Some(1));
        let basis = DriftBasis::new(&locations, Drift::Linear);
        let system = assemble_system(&locations, &RegularizedThinPlateKernel::default(), &basis);

        assert_eq!(system.nrows(), 15);
        for i in 0..15 {
            for j in 0..15 {
                assert_eq!(system[(i, j)], system[(j, i)]);
            }
        }
        for i in 0..12 {
            assert_eq!(system[(i, i)], 0.0);
        }
        assert_eq!(system[(13, 14)], 0.0);
    }

    #[test]
    fn spline_reproduces_samples() {
        let locations = generate_random_points(30, 2, Some(5));
        let values = Mat::from_fn(30, 2, |i, c| {
            let (x, y) = (locations[(i, 0)], locations[(i, 1)]);
            match c {
                0 => (3.0 * x).sin() + y * y,
                _ => x - 2.0 * y,
            }
        });

        let (spline, reports) = ThinPlateSpline::fit(
            &locations,
            &values,
            Drift::Constant,
            &tight_params(SplineSolver::Gmres),
            None,
        );
        assert!(reports.iter().all(|r| r.status == SolveStatus::Converged), "{reports:?}");

        let fitted = spline.evaluate(&locations);
        for i in 0..30 {
            for c in 0..2 {
                assert!((fitted[(i, c)] - values[(i, c)]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn bicgstab_fits_regular_layout() {
        let locations = Mat::from_fn(9, 2, |i, c| match c {
            0 => (i % 3) as f64,
            _ => (i / 3) as f64,
        });
        let values = Mat::from_fn(9, 1, |i, _| (i as f64 * 0.7).cos());
        let params = SplineParams {
            tolerance: 1e-10,
            ..tight_params(SplineSolver::BiCgStab)
        };

        let (spline, reports) = ThinPlateSpline::fit(&locations, &values, Drift::None, &params, None);
        assert!(reports[0].is_converged(), "{reports:?}");

        let fitted = spline.evaluate(&locations);
        for i in 0..9 {
            assert!((fitted[(i, 0)] - values[(i, 0)]).abs() < 1e-6);
        }
    }

    #[test]
    fn single_sample_without_drift_stays_finite() {
        let locations = mat![[3.0, 4.0]];
        let values = mat![[7.5]];

        for solver in [SplineSolver::Gmres, SplineSolver::BiCgStab] {
            let (spline, reports) =
                ThinPlateSpline::fit(&locations, &values, Drift::None, &tight_params(solver), None);
            assert!(!reports[0].is_converged(), "{reports:?}");
            assert!(reports[0].relative_residual.is_finite());
            assert!(spline.weights.col(0).iter().all(|w| w.is_finite()));

            let fitted = spline.evaluate(&mat![[0.0, 0.0], [5.0, 5.0]]);
            assert!(fitted.col(0).iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn constant_drift_reproduces_constant_data() {
        let locations = mat![[0.0, 0.0], [10.0, 0.0], [0.0, 10.0], [10.0, 10.0]];
        let values = mat![[1.0], [1.0], [1.0], [1.0]];
        let (spline, reports) = ThinPlateSpline::fit(
            &locations,
            &values,
            Drift::Constant,
            &tight_params(SplineSolver::Gmres),
            None,
        );
        assert!(reports[0].is_converged());

        let centre = spline.evaluate(&mat![[5.0, 5.0], [2.5, 7.5]]);
        assert!((centre[(0, 0)] - 1.0).abs() < 1e-9);
        assert!((centre[(1, 0)] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn linear_drift_reproduces_planes() {
        let locations = generate_random_points(20, 2, Some(8));
        let values = Mat::from_fn(20, 1, |i, _| 2.0 + 3.0 * locations[(i, 0)] - locations[(i, 1)]);
        let (spline, _) = ThinPlateSpline::fit(
            &locations,
            &values,
            Drift::Linear,
            &tight_params(SplineSolver::Gmres),
            None,
        );

        let fitted = spline.evaluate(&mat![[0.5, 0.5], [0.1, 0.9]]);
        assert!((fitted[(0, 0)] - 3.0).abs() < 1e-6);
        assert!((fitted[(1, 0)] - 1.4).abs() < 1e-6);
    }

    #[test]
    fn elevation_does_not_enter_the_kernel() {
        let flat = mat![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        let lifted = mat![[0.0, 0.0, 5.0], [1.0, 0.0, -3.0], [0.0, 1.0, 0.5]];
        let kernel = RegularizedThinPlateKernel::default();
        let basis = DriftBasis::new(&flat, Drift::None);

        assert_eq!(
            assemble_system(&flat, &kernel, &basis),
            assemble_system(&lifted, &kernel, &DriftBasis::new(&lifted, Drift::None))
        );
    }
}
