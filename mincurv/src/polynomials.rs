/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates the polynomial drift basis appended to the thin-plate spline system.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{common, interpolant_config::Drift};
use faer::Mat;

/// Monomial basis of the drift, fitted to the planar extent of the samples.
#[derive(Debug, Clone)]
pub(crate) struct DriftBasis {
    drift: Drift,
    planar_dims: usize,
    translation_factor: Vec<f64>,
    scale_factor: Vec<f64>,
}

impl DriftBasis {
    /// Builds the basis for `locations`, reducing the requested drift while
    /// there are fewer samples than basis functions.
    pub(crate) fn new(locations: &Mat<f64>, requested: Drift) -> Self {
        let planar = common::planar_columns(locations);
        let planar_dims = planar.ncols();
        let num_samples = locations.nrows();

        let mut drift = requested;
        while basis_size(drift, planar_dims) > num_samples {
            drift = match drift {
                Drift::Linear => Drift::Constant,
                Drift::Constant | Drift::None => Drift::None,
            };
        }

        if drift != requested {
            tracing::debug!(
                ?requested,
                reduced = ?drift,
                num_samples,
                "Drift reduced to the basis the samples support"
            );
        }

        let (translation_factor, scale_factor) = common::get_cheb_cube_scaling_factors(&planar);

        DriftBasis {
            drift,
            planar_dims,
            translation_factor,
            scale_factor,
        }
    }

    pub(crate) fn drift(&self) -> Drift {
        self.drift
    }

    pub(crate) fn size(&self) -> usize {
        basis_size(self.drift, self.planar_dims)
    }

    /// Evaluates the basis at `points`, one row per point and one column per monomial.
    pub(crate) fn evaluate(&self, points: &Mat<f64>) -> Mat<f64> {
        evaluate_monomials(
            &common::planar_columns(points),
            self.drift.degree(),
            self.size(),
            &self.translation_factor,
            &self.scale_factor,
        )
    }
}

/// Number of monomials of `drift` over `planar_dims` coordinates.
pub(crate) fn basis_size(drift: Drift, planar_dims: usize) -> usize {
    match drift {
        Drift::None => 0,
        Drift::Constant => 1,
        Drift::Linear => 1 + planar_dims,
    }
}

pub(crate) fn evaluate_monomials(
    points: &Mat<f64>,
    degree: i32,
    basis_size: usize,
    translation_factor: &[f64],
    scale_factor: &[f64],
) -> Mat<f64> {
    let (n, d) = points.shape();
    let mut monomials = Mat::<f64>::zeros(n, basis_size);

    if degree < 0 {
        return monomials;
    }

    // constant column
    monomials.col_mut(0).fill(1.0);

    // linear columns
    if degree >= 1 {
        // Scale the points to the [-1, 1]^d hypercube for monomial evaluation.
        let mut scaled_points = points.clone();
        common::scale_points(&mut scaled_points, translation_factor, scale_factor);

        monomials
            .subcols_mut(1, d)
            .copy_from(&scaled_points.as_ref());
    }

    monomials
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    fn run_case(points: Mat<f64>, degree: i32, expected: Mat<f64>) {
        let (n, d) = points.shape();
        assert_eq!(n, expected.nrows(), "row mismatch in test setup");

        let translation_factor = vec![0.0; d];
        let scale_factor = vec![1.0; d];

        let monomials = evaluate_monomials(
            &points,
            degree,
            expected.ncols(),
            &translation_factor,
            &scale_factor,
        );

        assert_eq!(monomials, expected);
    }

    #[test]
    fn monomials_constant_1d() {
        let points = mat![[1.0], [2.0]];
        // Basis: [1]
        run_case(points, 0, mat![[1.0], [1.0]]);
    }

    #[test]
    fn monomials_linear_1d() {
        let points = mat![[1.0], [2.0]];
        // Basis: [1, x]
        run_case(points, 1, mat![[1.0, 1.0], [1.0, 2.0]]);
    }

    #[test]
    fn monomials_linear_2d() {
        let points = mat![[1.0, 2.0], [3.0, 4.0]];
        // Basis: [1, x, y]
        run_case(points, 1, mat![[1.0, 1.0, 2.0], [1.0, 3.0, 4.0]]);
    }

    #[test]
    fn linear_drift_ignores_elevation() {
        let points = mat![[0.0, 0.0, 5.0], [2.0, 0.0, 1.0], [0.0, 2.0, 3.0], [2.0, 2.0, 9.0]];
        let basis = DriftBasis::new(&points, Drift::Linear);
        assert_eq!(basis.size(), 3);

        let values = basis.evaluate(&mat![[1.0, 1.0, 100.0], [2.0, 0.0, -4.0]]);
        assert_eq!(values, mat![[1.0, 0.0, 0.0], [1.0, 1.0, -1.0]]);
    }

    #[test]
    fn drift_is_reduced_for_few_samples() {
        let two = mat![[0.0, 0.0], [1.0, 1.0]];
        assert_eq!(DriftBasis::new(&two, Drift::Linear).drift(), Drift::Constant);

        let one = mat![[3.0, 4.0]];
        let basis = DriftBasis::new(&one, Drift::Constant);
        assert_eq!(basis.drift(), Drift::Constant);
        assert_eq!(basis.size(), 1);

        assert_eq!(DriftBasis::new(&one, Drift::None).size(), 0);
    }
}
