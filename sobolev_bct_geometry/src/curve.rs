/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the curve topology contract and a reference polyline implementation.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Curve topology consumed by the block cluster tree.
//!
//! Elements are the straight segments of a polygonal chain. Each element is identified by a
//! contiguous index in `0..num_elements()` and spans two vertex indices, a start vertex and
//! the vertex that follows it along the curve.

use faer::Mat;

use crate::vector::{self, Point3};

/// Read-only access to a polygonal curve (or group of curves).
pub trait CurveTopology {
    /// Number of segment elements on the curve.
    fn num_elements(&self) -> usize;

    /// Vertex indices `[start, next]` of an element.
    fn endpoints(&self, element: usize) -> [usize; 2];

    /// Position of a vertex.
    fn position(&self, vertex: usize) -> Point3;

    fn midpoint(&self, element: usize) -> Point3 {
        let [a, b] = self.endpoints(element);
        vector::midpoint(&self.position(a), &self.position(b))
    }

    fn length(&self, element: usize) -> f64 {
        let [a, b] = self.endpoints(element);
        vector::distance(&self.position(a), &self.position(b))
    }

    /// Whether two elements coincide or share an endpoint through the forward adjacency,
    /// checked in both directions.
    fn are_adjacent(&self, i: usize, j: usize) -> bool {
        let [start_i, next_i] = self.endpoints(i);
        let [start_j, next_j] = self.endpoints(j);
        start_i == start_j || next_i == start_j || start_i == next_j || next_i == next_j
    }
}

/// A group of polylines stored as a vertex matrix plus a segment list.
///
/// Vertex positions are held in a [`faer::Mat<f64>`](https://docs.rs/faer/latest/faer/mat/type.Mat.html)
/// of shape (V, 3). Components may be open (V - 1 segments) or closed (V segments).
#[derive(Debug, Clone)]
pub struct PolyCurve {
    positions: Mat<f64>,
    segments: Vec<[usize; 2]>,
}

impl Default for PolyCurve {
    fn default() -> Self {
        Self {
            positions: Mat::zeros(0, 3),
            segments: Vec::new(),
        }
    }
}

impl PolyCurve {
    /// Creates an open polyline through the rows of `positions`.
    pub fn open(positions: &Mat<f64>) -> Self {
        let mut curve = Self::default();
        curve.add_component(positions, false);
        curve
    }

    /// Creates a closed polygon through the rows of `positions`.
    pub fn closed(positions: &Mat<f64>) -> Self {
        let mut curve = Self::default();
        curve.add_component(positions, true);
        curve
    }

    /// Appends another component to the group.
    ///
    /// # Panics
    /// If `positions` does not have exactly 3 columns.
    pub fn add_component(&mut self, positions: &Mat<f64>, closed: bool) {
        assert_eq!(positions.ncols(), 3, "curve vertices must be 3D");

        let offset = self.positions.nrows();
        let n = positions.nrows();

        let old = std::mem::replace(&mut self.positions, Mat::new());
        self.positions = Mat::from_fn(offset + n, 3, |i, j| {
            if i < offset {
                old[(i, j)]
            } else {
                positions[(i - offset, j)]
            }
        });

        if n < 2 {
            return;
        }

        for i in 0..n - 1 {
            self.segments.push([offset + i, offset + i + 1]);
        }
        if closed {
            self.segments.push([offset + n - 1, offset]);
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.positions.nrows()
    }

    pub fn positions(&self) -> &Mat<f64> {
        &self.positions
    }
}

impl CurveTopology for PolyCurve {
    fn num_elements(&self) -> usize {
        self.segments.len()
    }

    #[inline(always)]
    fn endpoints(&self, element: usize) -> [usize; 2] {
        self.segments[element]
    }

    #[inline(always)]
    fn position(&self, vertex: usize) -> Point3 {
        [
            self.positions[(vertex, 0)],
            self.positions[(vertex, 1)],
            self.positions[(vertex, 2)],
        ]
    }
}
