/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the trait shared by radial basis kernels.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

/// A radial basis function evaluated from a squared distance.
///
/// Working from `r²` avoids a square root per pair, which matters when
/// filling dense `N×N` systems.
pub trait RadialKernel: Send + Sync {
    /// Evaluates the kernel at squared distance `r_sq`.
    fn phi_sq(&self, r_sq: f64) -> f64;

    /// Evaluates the kernel at distance `r`.
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        self.phi_sq(r * r)
    }
}
