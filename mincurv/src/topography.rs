/////////////////////////////////////////////////////////////////////////////////////////////
//
// Flags the cells whose centres lie below a topographic surface.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    error::{GridInterpError, Result},
    kdtree::KDTree,
};
use faer::Mat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Interpolation of the topographic elevation at cell centres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TopoInterpolation {
    /// Elevation of the nearest topography point.
    #[default]
    Nearest,

    /// Linear interpolation along a 2D profile.
    Linear,
}

/// Returns, for every row of `cell_centres`, whether the cell lies below `topography`.
///
/// - 3D: `topography` holds `(x, y, z)` points. The elevation at a cell is that of
///   the topography point nearest in (x, y); the cell is active when its `z` is
///   strictly below it. Only [`TopoInterpolation::Nearest`] is available.
/// - 2D: `topography` is a profile of `(x, elevation)`. The elevation is interpolated
///   along x and the cell is active when its second coordinate is at or below it.
///   Cells outside the x range of the profile are inactive.
///
/// # Errors
/// - [`GridInterpError::DimensionMismatch`] when the column counts differ or exceed 3.
/// - [`GridInterpError::Configuration`] for 1D input or linear interpolation in 3D.
/// - [`GridInterpError::EmptySampleSet`] when `topography` has no points.
pub fn active_cells_below_topography(
    cell_centres: &Mat<f64>,
    topography: &Mat<f64>,
    method: TopoInterpolation,
) -> Result<Vec<bool>> {
    let ndim = cell_centres.ncols();
    if topography.ncols() != ndim {
        return Err(GridInterpError::dimension_mismatch(format!(
            "cell centres have {ndim} columns but topography has {}",
            topography.ncols()
        )));
    }

    match ndim {
        1 => Err(GridInterpError::configuration(
            "topography masking is not implemented for 1D grids",
        )),
        2 => {
            let profile = sorted_profile(topography)?;
            Ok((0..cell_centres.nrows())
                .into_par_iter()
                .map(|i| {
                    let elevation = interpolate_profile(&profile, cell_centres[(i, 0)], method);
                    cell_centres[(i, 1)] <= elevation
                })
                .collect())
        }
        3 => {
            if method == TopoInterpolation::Linear {
                return Err(GridInterpError::configuration(
                    "linear topography interpolation is only available for 2D profiles",
                ));
            }
            if topography.nrows() == 0 {
                return Err(GridInterpError::EmptySampleSet);
            }

            let tree = KDTree::new(&topography.subcols(0, 2).to_owned());
            let nearest = tree.nearest_batch(&cell_centres.subcols(0, 2).to_owned())?;

            Ok(nearest
                .indices
                .iter()
                .enumerate()
                .map(|(i, &t)| cell_centres[(i, 2)] < topography[(t, 2)])
                .collect())
        }
        _ => Err(GridInterpError::dimension_mismatch(format!(
            "cell centres must have 1 to 3 columns, got {ndim}"
        ))),
    }
}

/// Profile points as `(x, elevation)` sorted by x.
fn sorted_profile(topography: &Mat<f64>) -> Result<Vec<(f64, f64)>> {
    if topography.nrows() == 0 {
        return Err(GridInterpError::EmptySampleSet);
    }

    let mut profile: Vec<(f64, f64)> = (0..topography.nrows())
        .map(|i| (topography[(i, 0)], topography[(i, 1)]))
        .collect();
    profile.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    Ok(profile)
}

/// Elevation of the profile at `x`, NaN outside its x range.
///
/// Nearest interpolation picks the lower neighbour at exact midpoints.
fn interpolate_profile(profile: &[(f64, f64)], x: f64, method: TopoInterpolation) -> f64 {
    let (Some(first), Some(last)) = (profile.first(), profile.last()) else {
        return f64::NAN;
    };
    if !(x >= first.0 && x <= last.0) {
        return f64::NAN;
    }

    let upper = profile.partition_point(|p| p.0 <= x);
    if upper == profile.len() {
        return last.1;
    }
    let (x0, z0) = profile[upper - 1];
    let (x1, z1) = profile[upper];

    match method {
        TopoInterpolation::Nearest => match x - x0 <= x1 - x {
            true => z0,
            false => z1,
        },
        TopoInterpolation::Linear => z0 + (z1 - z0) * (x - x0) / (x1 - x0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn profile_interpolation() {
        let profile = vec![(0.0, 10.0), (2.0, 20.0), (4.0, 0.0)];

        assert_eq!(interpolate_profile(&profile, 1.0, TopoInterpolation::Linear), 15.0);
        assert_eq!(interpolate_profile(&profile, 3.0, TopoInterpolation::Linear), 10.0);
        assert_eq!(interpolate_profile(&profile, 4.0, TopoInterpolation::Linear), 0.0);
        assert_eq!(interpolate_profile(&profile, 0.0, TopoInterpolation::Nearest), 10.0);
        assert_eq!(interpolate_profile(&profile, 1.0, TopoInterpolation::Nearest), 10.0);
        assert_eq!(interpolate_profile(&profile, 1.5, TopoInterpolation::Nearest), 20.0);
        assert!(interpolate_profile(&profile, -0.1, TopoInterpolation::Linear).is_nan());
        assert!(interpolate_profile(&profile, 4.1, TopoInterpolation::Nearest).is_nan());
    }

    #[test]
    fn two_d_cells_at_or_below_profile_are_active() {
        // Unsorted profile rising from 0 at x = 0 to 10 at x = 10.
        let topography = mat![[10.0, 10.0], [0.0, 0.0]];
        let cells = mat![[5.0, 4.0], [5.0, 5.0], [5.0, 6.0], [11.0, -100.0]];

        let active = active_cells_below_topography(&cells, &topography, TopoInterpolation::Linear).unwrap();
        assert_eq!(active, vec![true, true, false, false]);
    }

    #[test]
    fn three_d_uses_nearest_topography_in_plan() {
        let topography = mat![[0.0, 0.0, 100.0], [10.0, 0.0, 50.0]];
        let cells = mat![
            [1.0, 1.0, 99.0],
            [1.0, 1.0, 100.0],
            [9.0, -1.0, 49.0],
            [9.0, -1.0, 60.0],
        ];

        let active = active_cells_below_topography(&cells, &topography, TopoInterpolation::Nearest).unwrap();
        assert_eq!(active, vec![true, false, true, false]);
    }

    #[test]
    fn unsupported_requests_are_rejected() {
        let cells = mat![[0.0, 0.0, 0.0]];
        let topography = mat![[0.0, 0.0, 1.0]];
        assert!(matches!(
            active_cells_below_topography(&cells, &topography, TopoInterpolation::Linear),
            Err(GridInterpError::Configuration { .. })
        ));
        assert!(matches!(
            active_cells_below_topography(&mat![[0.0]], &mat![[1.0]], TopoInterpolation::Nearest),
            Err(GridInterpError::Configuration { .. })
        ));
        assert!(matches!(
            active_cells_below_topography(&cells, &mat![[0.0, 1.0]], TopoInterpolation::Nearest),
            Err(GridInterpError::DimensionMismatch { .. })
        ));
        assert_eq!(
            active_cells_below_topography(&cells, &Mat::<f64>::zeros(0, 3), TopoInterpolation::Nearest),
            Err(GridInterpError::EmptySampleSet)
        );
    }
}
