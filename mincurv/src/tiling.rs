/////////////////////////////////////////////////////////////////////////////////////////////
//
// Partitions survey locations into rectangular tiles with a bounded number of points.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Survey tiling.
//!
//! Tile nodes are evenly spaced between the survey extents along x and y. Each pass
//! adds one node along x when the fullest x strip held more points than the fullest
//! y strip on the previous pass, and along y otherwise, until no tile holds more
//! than the requested number of points.

use crate::{
    error::{GridInterpError, Result},
    rtree::PlanarPointIndex,
};
use faer::Mat;
use mincurv_utils::{linspace, select_mat_rows};

/// Rectangular tiles covering a survey, one row per tile.
///
/// Tiles are enumerated with x outer and y inner. Bounds are closed, so a location
/// on a shared edge belongs to every tile touching it. Tiles holding no location
/// are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Tiles {
    /// `T x 2` lower-left corners.
    pub south_west: Mat<f64>,

    /// `T x 2` upper-right corners.
    pub north_east: Mat<f64>,

    /// Rows of the survey locations inside each tile, ascending.
    pub members: Vec<Vec<usize>>,
}

impl Tiles {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Rows of `locations` that fall in `tile`, or `None` when `tile` is out of range.
    ///
    /// `locations` must be the array the tiles were built from.
    pub fn tile_locations(&self, tile: usize, locations: &Mat<f64>) -> Option<Mat<f64>> {
        self.members
            .get(tile)
            .map(|rows| select_mat_rows(locations, rows))
    }
}

/// Tiles the (x, y) columns of `locations` so that no tile holds more than
/// `max_points` locations.
///
/// # Errors
/// - [`GridInterpError::DimensionMismatch`] when `locations` has fewer than 2 columns.
/// - [`GridInterpError::Configuration`] when `max_points` is zero, there are no
///   locations, or more than `max_points` locations share the same (x, y).
pub fn tile_survey_points(locations: &Mat<f64>, max_points: usize) -> Result<Tiles> {
    if locations.ncols() < 2 {
        return Err(GridInterpError::dimension_mismatch(format!(
            "tiling needs x and y coordinates, got {} columns",
            locations.ncols()
        )));
    }
    if max_points == 0 {
        return Err(GridInterpError::configuration("max_points must be at least 1"));
    }
    if locations.nrows() == 0 {
        return Err(GridInterpError::configuration("no survey locations to tile"));
    }

    let coincident = max_coincident(locations);
    if coincident > max_points {
        return Err(GridInterpError::configuration(format!(
            "{coincident} locations share the same (x, y), more than max_points = {max_points}"
        )));
    }

    let x_limits = column_limits(locations, 0);
    let y_limits = column_limits(locations, 1);
    let x_splittable = x_limits.1 > x_limits.0;
    let y_splittable = y_limits.1 > y_limits.0;

    let index = PlanarPointIndex::new(locations);

    let mut num_x_nodes = 2usize;
    let mut num_y_nodes = 1usize;
    let mut count_x = 0usize;
    let mut count_y = 0usize;
    let mut passes = 0usize;

    loop {
        let split_x = match (x_splittable, y_splittable) {
            (true, true) => count_x > count_y,
            (true, false) => true,
            (false, _) => false,
        };
        // At least one y interval is needed before any tile exists.
        match split_x && num_y_nodes >= 2 {
            true => num_x_nodes += 1,
            false => num_y_nodes += 1,
        }
        passes += 1;

        let x_nodes = linspace(x_limits.0, x_limits.1, num_x_nodes);
        let y_nodes = linspace(y_limits.0, y_limits.1, num_y_nodes);

        count_x = x_nodes
            .windows(2)
            .map(|x| index.count_in_box([x[0], y_limits.0], [x[1], y_limits.1]))
            .max()
            .unwrap_or(0);
        count_y = y_nodes
            .windows(2)
            .map(|y| index.count_in_box([x_limits.0, y[0]], [x_limits.1, y[1]]))
            .max()
            .unwrap_or(0);

        let mut south_west = Vec::new();
        let mut north_east = Vec::new();
        let mut members = Vec::new();
        let mut fullest = 0usize;

        for x in x_nodes.windows(2) {
            for y in y_nodes.windows(2) {
                let inside = index.indices_in_box([x[0], y[0]], [x[1], y[1]]);
                fullest = fullest.max(inside.len());
                if !inside.is_empty() {
                    south_west.push([x[0], y[0]]);
                    north_east.push([x[1], y[1]]);
                    members.push(inside);
                }
            }
        }

        if fullest <= max_points {
            tracing::debug!(
                num_locations = locations.nrows(),
                max_points,
                num_x_nodes,
                num_y_nodes,
                passes,
                num_tiles = members.len(),
                "Survey tiled"
            );

            return Ok(Tiles {
                south_west: corners_to_mat(&south_west),
                north_east: corners_to_mat(&north_east),
                members,
            });
        }
    }
}

fn corners_to_mat(corners: &[[f64; 2]]) -> Mat<f64> {
    Mat::from_fn(corners.len(), 2, |i, j| corners[i][j])
}

fn column_limits(locations: &Mat<f64>, col: usize) -> (f64, f64) {
    locations
        .col(col)
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        })
}

/// Largest number of locations sharing exactly the same (x, y).
fn max_coincident(locations: &Mat<f64>) -> usize {
    let mut planar: Vec<(f64, f64)> = (0..locations.nrows())
        .map(|i| (locations[(i, 0)], locations[(i, 1)]))
        .collect();
    planar.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    planar
        .chunk_by(|a, b| a == b)
        .map(|run| run.len())
        .max()
        .unwrap_or(0)
}
