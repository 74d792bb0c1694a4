/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines shared helpers for random point generation, planar coordinates, and scaling utilities.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate a matrix of random points in the unit hypercube.
///
/// # Parameters
/// - `n`: Number of points to generate (rows in the output matrix).
/// - `d`: Number of spatial dimensions per point (columns in the output matrix).
/// - `seed`: Optional random seed.  
///   - If `Some(seed)` is provided, the same sequence of points will be generated
///     deterministically across runs and platforms (useful for reproducible tests).
///   - If `None`, the generator is seeded from the operating system's randomness source.
///
/// # Returns
/// A `Mat<f64>` of shape `(n, d)` where each element lies in `[0.0, 1.0)`.
///
/// # Example
/// ```
/// use mincurv::generate_random_points;
///
/// // Generate 100 reproducible 2D sample locations
/// let pts = generate_random_points(100, 2, Some(42));
/// assert_eq!(pts.ncols(), 2);
/// ```
pub fn generate_random_points(n: usize, d: usize, seed: Option<u64>) -> Mat<f64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    Mat::from_fn(n, d, |_, _| rng.random_range(0.0..1.0))
}

/// Copy of the horizontal coordinates of each row: `x` for 1D input, `(x, y)` otherwise.
pub(crate) fn planar_columns(points: &Mat<f64>) -> Mat<f64> {
    let planar_dims = points.ncols().min(2);
    points.subcols(0, planar_dims).to_owned()
}

/// Compute translation and scale factors to map points into a Chebyshev cube.
///
/// The translation is the midpoint of each coordinate range and the scale
/// is half the range, with zeros replaced by `1.0` to avoid division by zero.
///
/// # Arguments
/// * `point_locations` - Matrix of point coordinates (rows are points).
///
/// # Returns
/// A tuple `(translation, scale)` where each is a per-dimension factor.
pub(crate) fn get_cheb_cube_scaling_factors(point_locations: &Mat<f64>) -> (Vec<f64>, Vec<f64>) {
    let dimensions = point_locations.ncols();
    let Some(extents) = mincurv_utils::get_pointarray_extents(point_locations) else {
        return (vec![0.0; dimensions], vec![1.0; dimensions]);
    };

    let (translation_factor, mut scale_factor): (Vec<f64>, Vec<f64>) = (0..dimensions)
        .map(|d| {
            let min_coord = extents[d];
            let max_coord = extents[d + dimensions];
            ((max_coord + min_coord) / 2.0, (max_coord - min_coord) / 2.0)
        })
        .unzip();

    scale_factor
        .iter_mut()
        .for_each(|element| {
            if *element == 0.0 {
                *element = 1.0;
            }
        });

    (translation_factor, scale_factor)
}

/// Apply translation and scaling to map points into a normalized cube.
///
/// For each coordinate `x`, applies `(x - translation_factor[d]) / scale_factor[d]`.
pub(crate) fn scale_points(points: &mut Mat<f64>, translation_factor: &[f64], scale_factor: &[f64]) {
    points
        .row_iter_mut()
        .for_each(|row| {
            row
                .iter_mut()
                .enumerate()
                .for_each(|(col_idx, element)| {
                    *element = (*element - translation_factor[col_idx]) / scale_factor[col_idx];
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn random_points_are_reproducible() {
        let a = generate_random_points(10, 3, Some(7));
        let b = generate_random_points(10, 3, Some(7));
        assert_eq!(a, b);
        assert!(a.col_iter().all(|c| c.iter().all(|v| (0.0..1.0).contains(v))));
    }

    #[test]
    fn planar_columns_drop_elevation() {
        let points = mat![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(planar_columns(&points), mat![[1.0, 2.0], [4.0, 5.0]]);

        let profile = mat![[1.0], [4.0]];
        assert_eq!(planar_columns(&profile), profile);
    }

    #[test]
    fn scaling_maps_extents_to_unit_cube() {
        let mut points = mat![[0.0, 5.0], [10.0, 5.0], [4.0, 5.0]];
        let (translation, scale) = get_cheb_cube_scaling_factors(&points);
        assert_eq!(translation, vec![5.0, 5.0]);
        // Flat second axis keeps a unit scale.
        assert_eq!(scale, vec![5.0, 1.0]);

        scale_points(&mut points, &translation, &scale);
        assert_eq!(points, mat![[-1.0, 0.0], [1.0, 0.0], [-0.2, 0.0]]);
    }
}
