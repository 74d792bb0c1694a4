/////////////////////////////////////////////////////////////////////////////////////////////
//
// Runs the iterative smoothing loop of the relaxation gridding mode.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Relaxation gridding.
//!
//! The field is seeded with the value of the nearest sample at every grid point,
//! then alternates between re-imposing samples close to their grid points and
//! smoothing with `m ← Avᵀ(Av m)`, where `Av` averages cell centres to faces.

use crate::{
    averaging::{CsrMatrix, average_cc_to_faces},
    error::Result,
    grid::QueryGrid,
    interpolant_config::MinCurvatureSettings,
    kdtree::KDTree,
    progress::ProgressMsg,
};
use faer::Mat;
use std::time::Instant;

/// Result of a relaxation run.
#[derive(Debug, Clone)]
pub(crate) struct RelaxedField {
    pub(crate) values: Mat<f64>,
    pub(crate) iterations: usize,
    pub(crate) residual: f64,
}

/// Grid points closer to their nearest sample than the snap radius, with that sample.
struct SnapTargets {
    grid_indices: Vec<usize>,
    sample_indices: Vec<usize>,
}

/// Smoothing operator, optionally normalised so that it averages.
struct Smoother {
    av: CsrMatrix,
    inverse_weights: Option<Vec<f64>>,
    faces: Vec<f64>,
}

impl Smoother {
    fn new(grid: &QueryGrid, normalize: bool) -> Self {
        let av = average_cc_to_faces(grid.shape());
        let mut faces = vec![0.0; av.n_rows()];

        let inverse_weights = match normalize {
            true => {
                let ones = vec![1.0; av.n_cols()];
                let mut weights = vec![0.0; av.n_cols()];
                av.mul_vec(&ones, &mut faces);
                av.transpose_mul_vec(&faces, &mut weights);
                Some(
                    weights
                        .into_iter()
                        .map(|w| if w > 0.0 { 1.0 / w } else { 1.0 })
                        .collect(),
                )
            }
            false => None,
        };

        Smoother {
            av,
            inverse_weights,
            faces,
        }
    }

    /// `out = Avᵀ(Av m)`, divided by `Avᵀ(Av 1)` when normalised.
    fn apply(&mut self, m: &[f64], out: &mut [f64]) {
        self.av.mul_vec(m, &mut self.faces);
        self.av.transpose_mul_vec(&self.faces, out);

        if let Some(inverse) = &self.inverse_weights {
            out.iter_mut()
                .zip(inverse.iter())
                .for_each(|(value, w)| *value *= w);
        }
    }
}

/// Relaxes the nearest-neighbour field of `values` on `grid`.
///
/// Iterates while fewer than `max_iterations` steps have run and the relative
/// change of the last step exceeds the settings' tolerance.
pub(crate) fn relax(
    locations: &Mat<f64>,
    values: &Mat<f64>,
    grid: &QueryGrid,
    settings: &MinCurvatureSettings,
    max_iterations: usize,
) -> Result<RelaxedField> {
    let start = Instant::now();
    let params = &settings.relaxation_params;
    let tolerance = settings.tolerance;
    let callback = settings.progress_callback.as_ref();
    let num_channels = values.ncols();
    let num_grid = grid.num_points();

    let tree = KDTree::new(locations);
    let neighbours = tree.nearest_batch(grid.points())?;

    // One buffer per channel, in grid order.
    let mut field: Vec<Vec<f64>> = (0..num_channels)
        .map(|c| {
            neighbours
                .indices
                .iter()
                .map(|&i| values[(i, c)])
                .collect()
        })
        .collect();

    let snap_radius = params.snap_radius_factor * settings.grid_size;
    let (grid_indices, sample_indices): (Vec<usize>, Vec<usize>) = neighbours
        .distances
        .iter()
        .zip(neighbours.indices.iter())
        .enumerate()
        .filter(|(_, (distance, _))| **distance < snap_radius)
        .map(|(g, (_, &i))| (g, i))
        .unzip();
    let snap = SnapTargets {
        grid_indices,
        sample_indices,
    };

    tracing::debug!(
        num_grid,
        snapped = snap.grid_indices.len(),
        snap_radius,
        "Seeded relaxation field from nearest samples"
    );

    let mut smoother = Smoother::new(grid, params.normalize_smoothing);
    let mut smoothed = vec![0.0; num_grid];

    let mut iterations = 0usize;
    let mut residual = 1.0;

    while iterations < max_iterations && residual > tolerance {
        let mut change_sq = 0.0;
        let mut previous_sq = 0.0;

        for (c, channel) in field.iter_mut().enumerate() {
            for (&g, &i) in snap.grid_indices.iter().zip(snap.sample_indices.iter()) {
                channel[g] = values[(i, c)];
            }

            smoother.apply(channel, &mut smoothed);

            for (old, new) in channel.iter().zip(smoothed.iter()) {
                change_sq += (new - old) * (new - old);
                previous_sq += old * old;
            }
            channel.copy_from_slice(&smoothed);
        }

        residual = relative_change(change_sq, previous_sq);
        iterations += 1;

        if let Some(sink) = callback {
            sink.emit(ProgressMsg::RelaxationIteration {
                iter: iterations,
                max_iterations,
                residual,
            });
        }
    }

    match residual <= tolerance {
        true => tracing::info!(
            iterations,
            residual,
            elapsed = ?start.elapsed(),
            "Relaxation converged"
        ),
        false => tracing::warn!(
            iterations,
            residual,
            tolerance,
            max_iterations,
            "Relaxation stopped at the iteration cap"
        ),
    }

    let values = Mat::from_fn(num_grid, num_channels, |g, c| field[c][g]);

    Ok(RelaxedField {
        values,
        iterations,
        residual,
    })
}

/// `‖m_new − m_old‖ / ‖m_old‖`, zero for no change and infinite from a zero field.
fn relative_change(change_sq: f64, previous_sq: f64) -> f64 {
    match (change_sq == 0.0, previous_sq == 0.0) {
        (true, _) => 0.0,
        (false, true) => f64::INFINITY,
        (false, false) => (change_sq / previous_sq).sqrt(),
    }
}
