/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides a simple KD-tree implementation for nearest-neighbour queries against samples.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::error::{GridInterpError, Result};
use faer::{Mat, Row, RowRef};
use rayon::prelude::*;
use std::cmp::Ordering;

// Define a wrapper for a single row to keep the source index next to the coordinates.
#[derive(Debug, Clone, PartialEq)]
struct PointRowWithId {
    coords: Row<f64>,
    id: usize,
}

impl PointRowWithId {
    fn new(coords: RowRef<f64>, id: usize) -> Self {
        Self {
            coords: coords.to_owned(),
            id,
        }
    }

    /// Squared euclidean distance
    fn distance_sq(&self, other: &Row<f64>) -> f64 {
        self.coords
            .iter()
            .zip(other.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum()
    }
}

/// A node in the KDTree
#[derive(Debug)]
struct Node {
    point: PointRowWithId,
    left: Option<usize>,
    right: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct Neighbour {
    distance_sq: f64,
    id: usize,
}

/// Distance to, and row index of, the nearest sample for each query point.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestNeighbours {
    pub distances: Vec<f64>,
    pub indices: Vec<usize>,
}

/// The KDTree structure
///
/// Ties between samples at exactly the same distance from a query resolve to
/// whichever sample the traversal reaches first, which depends on the tree
/// layout rather than on the input order.
#[derive(Debug)]
pub struct KDTree {
    nodes: Vec<Node>,
    dimensions: usize,
}

impl KDTree {
    /// Constructs a new KDTree from a Mat of points, one point per row.
    pub fn new(nd_array: &Mat<f64>) -> Self {
        let mut points: Vec<PointRowWithId> = (0..nd_array.nrows())
            .map(|i| PointRowWithId::new(nd_array.row(i), i))
            .collect();

        let mut tree = KDTree {
            nodes: Vec::with_capacity(points.len()),
            dimensions: nd_array.ncols(),
        };
        tree.build_tree(&mut points, 0);
        tree
    }

    /// Number of points in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recursively builds the KDTree and stores nodes in a flat vector.
    fn build_tree(&mut self, points: &mut [PointRowWithId], depth: usize) -> Option<usize> {
        if points.is_empty() {
            return None;
        }

        // Determine splitting axis
        let axis = depth % self.dimensions.max(1);

        // Sort points by the current axis
        points.sort_by(|a, b| {
            a.coords[axis]
                .partial_cmp(&b.coords[axis])
                .unwrap_or(Ordering::Equal)
        });

        // Choose the median as the pivot
        let mid = points.len() / 2;

        let node_index = self.nodes.len();
        self.nodes.push(Node {
            point: points[mid].clone(),
            left: None,
            right: None,
        });

        self.nodes[node_index].left = self.build_tree(&mut points[..mid], depth + 1);
        self.nodes[node_index].right = self.build_tree(&mut points[mid + 1..], depth + 1);

        Some(node_index)
    }

    /// Returns the row index of, and euclidean distance to, the point nearest to `target`,
    /// or `None` when the tree is empty.
    pub fn nearest(&self, target: RowRef<f64>) -> Option<(usize, f64)> {
        if self.nodes.is_empty() {
            return None;
        }

        let target = target.to_owned();
        let mut best: Option<Neighbour> = None;
        self.nearest_impl(0, &target, 0, &mut best);
        best.map(|n| (n.id, n.distance_sq.sqrt()))
    }

    fn nearest_impl(
        &self,
        node_index: usize,
        target: &Row<f64>,
        depth: usize,
        best: &mut Option<Neighbour>,
    ) {
        let node = &self.nodes[node_index];
        let dist_sq = node.point.distance_sq(target);

        if best.map_or(true, |b| dist_sq < b.distance_sq) {
            *best = Some(Neighbour {
                distance_sq: dist_sq,
                id: node.point.id,
            });
        }

        let axis = depth % self.dimensions.max(1);
        let diff = target[axis] - node.point.coords[axis];

        let (near_idx, far_idx) = if diff < 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if let Some(near) = near_idx {
            self.nearest_impl(near, target, depth + 1, best);
        }

        if let Some(far) = far_idx {
            // The splitting plane is closer than the best match, so the far side may hold a closer point
            if best.map_or(true, |b| diff * diff <= b.distance_sq) {
                self.nearest_impl(far, target, depth + 1, best);
            }
        }
    }

    /// Nearest tree point for every row of `query_points`, evaluated in parallel.
    pub fn nearest_batch(&self, query_points: &Mat<f64>) -> Result<NearestNeighbours> {
        if self.nodes.is_empty() {
            return Err(GridInterpError::EmptySampleSet);
        }
        if query_points.ncols() != self.dimensions {
            return Err(GridInterpError::dimension_mismatch(format!(
                "query points have {} columns but the tree was built on {}",
                query_points.ncols(),
                self.dimensions
            )));
        }

        // One entry per query row; callers zip the result against grid rows by position.
        let found: Vec<(usize, f64)> = (0..query_points.nrows())
            .into_par_iter()
            .map(|i| self.nearest(query_points.row(i)))
            .collect::<Option<Vec<_>>>()
            .ok_or(GridInterpError::EmptySampleSet)?;

        let (indices, distances): (Vec<usize>, Vec<f64>) = found.into_iter().unzip();
        Ok(NearestNeighbours { distances, indices })
    }
}
