/////////////////////////////////////////////////////////////////////////////////////////////
//
// Wraps the `rstar` crate to count planar sample locations inside axis-aligned boxes.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # rtree
//!
//! Wrapper module for the rstar crate.
//!
//! Builds an R-tree over the (x, y) columns of a point array and answers
//! closed-box membership queries.

use faer::Mat;
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};

/// A planar point tagged with its row in the source array.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

pub(crate) struct PlanarPointIndex {
    tree: RTree<IndexedPoint>,
}

impl PlanarPointIndex {
    /// Bulk loads the first two columns of `locations`.
    pub(crate) fn new(locations: &Mat<f64>) -> Self {
        let points = (0..locations.nrows())
            .map(|i| GeomWithData::new([locations[(i, 0)], locations[(i, 1)]], i))
            .collect::<Vec<_>>();

        PlanarPointIndex {
            tree: RTree::bulk_load(points),
        }
    }

    fn envelope(min: [f64; 2], max: [f64; 2]) -> AABB<[f64; 2]> {
        AABB::from_corners(min, max)
    }

    /// Number of points with `min <= p <= max` componentwise.
    pub(crate) fn count_in_box(&self, min: [f64; 2], max: [f64; 2]) -> usize {
        self.tree
            .locate_in_envelope(&Self::envelope(min, max))
            .count()
    }

    /// Rows of the points with `min <= p <= max` componentwise, in ascending order.
    pub(crate) fn indices_in_box(&self, min: [f64; 2], max: [f64; 2]) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .tree
            .locate_in_envelope(&Self::envelope(min, max))
            .map(|item| item.data)
            .collect();
        indices.sort_unstable();
        indices
    }
}
