/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements restarted GMRES and BiCGSTAB solvers for the dense spline weight systems.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    config::SplineParams,
    progress::{ProgressMsg, ProgressSink, progress_from_rel},
};
use faer::linalg::triangular_solve::solve_upper_triangular_in_place;
use faer::mat::AsMatRef;
use faer::{Mat, MatRef, Par};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of an iterative solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// The relative residual dropped below the requested tolerance.
    Converged,

    /// The iteration cap was reached first; the last iterate is returned.
    MaxIterationsReached,

    /// The recurrence broke down (a vanishing inner product); the last iterate is returned.
    Breakdown,
}

/// Convergence summary of one iterative solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveReport {
    pub status: SolveStatus,

    /// Operator applications for GMRES, full steps for BiCGSTAB.
    pub iterations: usize,

    /// `‖b - A x‖ / ‖b‖` of the returned iterate.
    pub relative_residual: f64,
}

impl SolveReport {
    pub fn is_converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }

    fn trivial() -> Self {
        Self {
            status: SolveStatus::Converged,
            iterations: 0,
            relative_residual: 0.0,
        }
    }
}

/// Restarted GMRES following Saad's algorithm structure.
///
/// Solves `Ax = b` from a zero initial guess, restarting after `params.restart`
/// Krylov vectors and stopping once `‖b - Ax‖ / ‖b‖ < params.tolerance` or
/// `params.max_iterations` operator applications have been spent.
///
/// # Parameters
/// - `a`: Operator function A(x)
/// - `b`: Right-hand side vector
/// - `params`: Tolerance, iteration cap and restart length
/// - `channel`: Value channel reported to the progress sink
/// - `callback`: Optional progress sink
///
/// # Returns
/// - `x`: Approximate solution, and the report of the solve
pub fn gmres<A>(
    a: &A,
    b: MatRef<f64>,
    params: &SplineParams,
    channel: usize,
    callback: Option<&Arc<dyn ProgressSink>>,
) -> (Mat<f64>, SolveReport)
where
    A: Fn(&MatRef<f64>) -> Mat<f64>,
{
    let n = b.nrows();
    let mut x = Mat::<f64>::zeros(n, 1);

    let beta = b.norm_l2();
    if beta == 0.0 || n == 0 {
        return (x, SolveReport::trivial());
    }

    let max_inner_iterations = params.restart.min(n).max(1);
    let tolerance = params.tolerance;

    let mut r: Mat<f64> = b.to_owned();
    let mut relative_residual = 1.0;
    let mut iteration = 0usize;

    while iteration < params.max_iterations {
        let mut v = Mat::<f64>::zeros(n, max_inner_iterations + 1);
        let mut h = Mat::<f64>::zeros(max_inner_iterations + 1, max_inner_iterations);
        let mut g = Mat::<f64>::zeros(max_inner_iterations + 1, 1);
        let mut cs = Mat::<f64>::zeros(max_inner_iterations, 1);
        let mut sn = Mat::<f64>::zeros(max_inner_iterations, 1);

        let r_norm = r.norm_l2();
        v.col_mut(0).copy_from(&(r.clone() / r_norm).col(0));
        g[(0, 0)] = r_norm;

        let mut basis_size = 0usize;
        let mut singular = false;

        for j in 0..max_inner_iterations {
            if iteration >= params.max_iterations {
                break;
            }
            iteration += 1;
            basis_size = j + 1;

            let vj = v.col(j).as_mat_ref().as_col_shape(1).to_owned();
            let mut wj = a(&vj.as_ref());
            let applied_norm = wj.norm_l2();

            // Modified Gram-Schmidt orthogonalization
            for i in 0..=j {
                let vi = v.col(i);
                let hij = vi
                    .iter()
                    .zip(wj.col(0).iter())
                    .map(|(a, b)| a * b)
                    .sum::<f64>();
                h[(i, j)] = hij;
                wj -= &(vi.to_owned() * hij).as_mat();
            }

            let norm = wj.norm_l2();
            h[(j + 1, j)] = norm;

            // Apply previous Givens rotations
            for i in 0..j {
                let temp = cs[(i, 0)] * h[(i, j)] + sn[(i, 0)] * h[(i + 1, j)];
                h[(i + 1, j)] = -sn[(i, 0)] * h[(i, j)] + cs[(i, 0)] * h[(i + 1, j)];
                h[(i, j)] = temp;
            }

            // Compute and apply new Givens rotation
            let (c, s, _r) = givens_rotation(h[(j, j)], h[(j + 1, j)]);

            h[(j, j)] = c * h[(j, j)] + s * h[(j + 1, j)];
            h[(j + 1, j)] = 0.0;

            let temp = c * g[(j, 0)] + s * g[(j + 1, 0)];
            g[(j + 1, 0)] = -s * g[(j, 0)] + c * g[(j + 1, 0)];
            g[(j, 0)] = temp;

            cs[(j, 0)] = c;
            sn[(j, 0)] = s;

            // A zero pivot means A v_j lies in the span of the earlier basis vectors.
            // Keep only the columns that give a nonsingular triangular block.
            if h[(j, j)].abs() <= f64::EPSILON * applied_norm {
                basis_size = j;
                singular = true;
                break;
            }

            let estimated = g[(j + 1, 0)].abs() / beta;

            if let Some(sink) = callback {
                sink.emit(ProgressMsg::SolverIteration {
                    channel,
                    iter: iteration,
                    residual: estimated,
                    progress: progress_from_rel(estimated, 1.0, tolerance),
                });
            }

            // A vanishing new direction means the Krylov space holds the exact solution.
            if estimated < tolerance || norm == 0.0 {
                break;
            }

            v.col_mut(j + 1).copy_from(&(wj / norm).col(0));
        }

        if basis_size > 0 {
            x += get_solution(&h, &g, &v, basis_size);
        }
        r = b - &a(&x.as_ref());
        relative_residual = r.norm_l2() / beta;

        if relative_residual < tolerance {
            return (
                x,
                SolveReport {
                    status: SolveStatus::Converged,
                    iterations: iteration,
                    relative_residual,
                },
            );
        }

        if singular || !relative_residual.is_finite() {
            return (
                x,
                SolveReport {
                    status: SolveStatus::Breakdown,
                    iterations: iteration,
                    relative_residual,
                },
            );
        }
    }

    (
        x,
        SolveReport {
            status: SolveStatus::MaxIterationsReached,
            iterations: iteration,
            relative_residual,
        },
    )
}

fn get_solution(ri: &Mat<f64>, gi: &Mat<f64>, v: &Mat<f64>, i: usize) -> Mat<f64> {
    let gi = gi.subrows(0, i);
    let hi = ri.submatrix(0, 0, i, i);

    let mut ym = gi.to_owned();
    solve_upper_triangular_in_place(hi, ym.as_mut(), Par::Seq);

    v.subcols(0, i) * ym
}

/// Compute a Givens rotation: given scalars `f` and `g`,
/// returns (c, s, r) such that
///
///   [  c   s ] [ f ] = [ r ]
///   [ –s   c ] [ g ]   [ 0 ]
///
/// A port of LAPACK's dlartg.
pub fn givens_rotation(f: f64, g: f64) -> (f64, f64, f64) {
    // Safe minimum/maximum
    let safmin = f64::MIN_POSITIVE;
    let safmax = f64::MAX;

    // thresholds
    let rtmin = safmin.sqrt();
    let rtmax = (safmax / 2.0).sqrt();

    // Trivial g=0  ->  no rotation
    if g == 0.0 {
        return (1.0, 0.0, f);
    }
    // Trivial f=0  ->  pure sine rotation
    if f == 0.0 {
        let s = g.signum();
        return (0.0, s, g.abs());
    }

    let f1 = f.abs();
    let g1 = g.abs();

    if (rtmin..rtmax).contains(&f1) && (rtmin..rtmax).contains(&g1) {
        let r = (f * f + g * g).sqrt().copysign(f);
        let c = f1 / r.abs();
        let s = g / r;
        (c, s, r)
    } else {
        // Scale to avoid under/overflow
        let u = f1.max(g1).clamp(safmin, safmax);
        let fs = f / u;
        let gs = g / u;
        let mag = (fs * fs + gs * gs).sqrt();
        let r = mag.copysign(f) * u;
        let c = fs.abs() / mag;
        let s = gs / mag;
        (c, s, r)
    }
}

/// Stabilised bi-conjugate gradient method (van der Vorst), unpreconditioned.
///
/// Solves `Ax = b` from a zero initial guess with the initial residual as the
/// shadow vector. Stops on `‖b - Ax‖ / ‖b‖ < params.tolerance`, after
/// `params.max_iterations` steps, or on breakdown of the recurrence.
pub fn bicgstab<A>(
    a: &A,
    b: MatRef<f64>,
    params: &SplineParams,
    channel: usize,
    callback: Option<&Arc<dyn ProgressSink>>,
) -> (Mat<f64>, SolveReport)
where
    A: Fn(&MatRef<f64>) -> Mat<f64>,
{
    let n = b.nrows();
    let mut x = Mat::<f64>::zeros(n, 1);

    let beta = b.norm_l2();
    if beta == 0.0 || n == 0 {
        return (x, SolveReport::trivial());
    }

    let tolerance = params.tolerance;
    let breakdown_tolerance = 1e-30 * beta * beta;

    let mut r: Mat<f64> = b.to_owned();
    let r_hat = r.clone();
    let mut p = Mat::<f64>::zeros(n, 1);
    let mut v = Mat::<f64>::zeros(n, 1);
    let mut s = Mat::<f64>::zeros(n, 1);

    let mut rho_old = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;

    let mut report = SolveReport {
        status: SolveStatus::MaxIterationsReached,
        iterations: 0,
        relative_residual: 1.0,
    };

    for iter in 1..=params.max_iterations {
        report.iterations = iter;

        let rho = dot(&r_hat, &r);
        if rho.abs() < breakdown_tolerance {
            report.status = SolveStatus::Breakdown;
            break;
        }

        let beta_k = match iter == 1 {
            true => 0.0,
            false => (rho / rho_old) * (alpha / omega),
        };
        rho_old = rho;

        for i in 0..n {
            p[(i, 0)] = r[(i, 0)] + beta_k * (p[(i, 0)] - omega * v[(i, 0)]);
        }

        v = a(&p.as_ref());

        let r_hat_v = dot(&r_hat, &v);
        if r_hat_v.abs() < breakdown_tolerance {
            report.status = SolveStatus::Breakdown;
            break;
        }
        alpha = rho / r_hat_v;

        for i in 0..n {
            s[(i, 0)] = r[(i, 0)] - alpha * v[(i, 0)];
        }

        let s_residual = s.norm_l2() / beta;
        if s_residual < tolerance {
            for i in 0..n {
                x[(i, 0)] += alpha * p[(i, 0)];
            }
            report.relative_residual = s_residual;
            report.status = SolveStatus::Converged;
            emit_iteration(callback, channel, iter, s_residual, tolerance);
            break;
        }

        let t = a(&s.as_ref());
        let tt = dot(&t, &t);
        omega = match tt > 0.0 {
            true => dot(&t, &s) / tt,
            false => 0.0,
        };

        for i in 0..n {
            x[(i, 0)] += alpha * p[(i, 0)] + omega * s[(i, 0)];
            r[(i, 0)] = s[(i, 0)] - omega * t[(i, 0)];
        }

        report.relative_residual = r.norm_l2() / beta;
        emit_iteration(callback, channel, iter, report.relative_residual, tolerance);

        if report.relative_residual < tolerance {
            report.status = SolveStatus::Converged;
            break;
        }

        if omega == 0.0 || !report.relative_residual.is_finite() {
            report.status = SolveStatus::Breakdown;
            break;
        }
    }

    (x, report)
}

fn emit_iteration(
    callback: Option<&Arc<dyn ProgressSink>>,
    channel: usize,
    iter: usize,
    residual: f64,
    tolerance: f64,
) {
    if let Some(sink) = callback {
        sink.emit(ProgressMsg::SolverIteration {
            channel,
            iter,
            residual,
            progress: progress_from_rel(residual, 1.0, tolerance),
        });
    }
}

#[inline]
fn dot(a: &Mat<f64>, b: &Mat<f64>) -> f64 {
    a.col(0)
        .iter()
        .zip(b.col(0).iter())
        .map(|(x, y)| x * y)
        .sum()
}
