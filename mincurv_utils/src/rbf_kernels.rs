/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the radial basis kernels used by the spline gridding solver.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{RadialKernel, constants::THIN_PLATE_EPSILON};
use serde::{Deserialize, Serialize};

/// Thin plate spline kernel `phi(r) = r² (ln r - 1)` with a regularised logarithm.
///
/// Evaluated from the squared distance as `r² (0.5 ln(r² + ε) - 1)`, so that
/// coincident points give `0` instead of `NaN`. The `-1` shifts the classical
/// `r² ln r` by a multiple of `r²`, which leaves the biharmonic character intact.
///
/// # Examples
///
/// ```
/// use mincurv_utils::{RadialKernel, kernels::RegularizedThinPlateKernel};
///
/// let kernel = RegularizedThinPlateKernel::default();
///
/// assert_eq!(kernel.phi_sq(0.0), 0.0);
/// assert!((kernel.phi(1.0) + 1.0).abs() < 1e-8);
/// ```
#[derive(Clone, Debug, Copy, Serialize, Deserialize, PartialEq)]
pub struct RegularizedThinPlateKernel {
    pub epsilon: f64,
}

impl Default for RegularizedThinPlateKernel {
    fn default() -> Self {
        Self {
            epsilon: THIN_PLATE_EPSILON,
        }
    }
}

impl RadialKernel for RegularizedThinPlateKernel {
    #[inline(always)]
    fn phi_sq(&self, r_sq: f64) -> f64 {
        r_sq * (0.5 * (r_sq + self.epsilon).ln() - 1.0)
    }
}
