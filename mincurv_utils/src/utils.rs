/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies general-purpose utilities for point matrices, distances and axis construction.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{Mat, RowRef};

/// Returns an owned `Mat<T>` from a subset of row indices.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use mincurv_utils::select_mat_rows;
///
/// let matrix = mat![
///     [0.0, 1.0],
///     [1.0, 1.0],
///     [2.0, 2.0],
///     [3.0, 3.0f64],
/// ];
///
/// let sub_matrix = select_mat_rows(&matrix, &[0, 2]);
///
/// assert_eq!(
///     sub_matrix,
///     mat![
///         [0.0, 1.0],
///         [2.0, 2.0f64],
///     ]
/// );
/// ```
#[inline(always)]
pub fn select_mat_rows<T>(existing_mat: &Mat<T>, row_indices: &[usize]) -> Mat<T>
where
    T: Clone,
{
    Mat::from_fn(row_indices.len(), existing_mat.ncols(), |i, j| {
        existing_mat.get(row_indices[i], j).clone()
    })
}

/// Computes the axis aligned bounding box (AABB) extents of a matrix of points.
///
/// Returns `None` for an empty matrix, otherwise a flat vector arranged as
/// `[min_0, min_1, ..., min_n, max_0, max_1, ..., max_n]`.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use mincurv_utils::get_pointarray_extents;
///
/// let points = mat![
///     [1.0, 2.0],
///     [3.0, -1.0],
///     [0.5, 4.0f64]
/// ];
/// let extents = get_pointarray_extents(&points);
/// assert_eq!(extents, Some(vec![0.5, -1.0, 3.0, 4.0]));
/// ```
#[inline(always)]
pub fn get_pointarray_extents(points: &Mat<f64>) -> Option<Vec<f64>> {
    let (nrows, ncols) = points.shape();
    if nrows == 0 {
        return None;
    }

    let mut extents: Vec<f64> = vec![0.0; 2 * ncols];
    for col in 0..ncols {
        extents[col] = points[(0, col)];
        extents[col + ncols] = points[(0, col)];
    }

    for row in points.row_iter() {
        for (col, item) in row.iter().enumerate() {
            if *item < extents[col] {
                extents[col] = *item;
            }
            if *item > extents[col + ncols] {
                extents[col + ncols] = *item;
            }
        }
    }

    Some(extents)
}

/// Calculates the euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use mincurv_utils::get_distance;
///
/// let points = mat![
///     [1.0, 2.0],
///     [4.0, 6.0],
/// ];
///
/// assert_eq!(get_distance(points.row(0), points.row(1)), 5.0);
/// ```
#[inline(always)]
pub fn get_distance(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist.sqrt()
}

/// Squared distance between two points using at most their first two
/// coordinates (X and Y). Elevations of 3D points are ignored, and 1D
/// points reduce to the squared X separation.
///
/// # Examples
///
/// ```
/// use faer::mat;
/// use mincurv_utils::planar_distance_sq;
///
/// let points = mat![
///     [0.0, 0.0, 100.0],
///     [3.0, 4.0, -50.0f64],
/// ];
///
/// assert_eq!(planar_distance_sq(points.row(0), points.row(1)), 25.0);
/// ```
#[inline(always)]
pub fn planar_distance_sq(target: RowRef<f64>, source: RowRef<f64>) -> f64 {
    let mut dist = 0.0;
    for (t, s) in target.iter().zip(source.iter()).take(2) {
        let diff = t - s;
        dist += diff * diff;
    }
    dist
}

/// Returns `num` evenly spaced values over the closed interval `[start, end]`.
///
/// # Examples
///
/// ```
/// use mincurv_utils::linspace;
///
/// assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
/// assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
/// assert!(linspace(0.0, 1.0, 0).is_empty());
/// ```
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num)
                .map(|i| match i == num - 1 {
                    true => end,
                    false => start + step * i as f64,
                })
                .collect()
        }
    }
}

/// Returns `true` when every value is finite and strictly greater than its predecessor.
///
/// # Examples
///
/// ```
/// use mincurv_utils::is_strictly_increasing;
///
/// assert!(is_strictly_increasing(&[1.0, 2.0, 4.0]));
/// assert!(!is_strictly_increasing(&[1.0, 1.0]));
/// assert!(!is_strictly_increasing(&[1.0, f64::NAN]));
/// ```
pub fn is_strictly_increasing(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite()) && values.windows(2).all(|w| w[1] > w[0])
}
