/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides a median-split bounding volume hierarchy over the segments of a curve.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::cmp::Ordering;

use crate::curve::CurveTopology;
use crate::hierarchy::{ClusterHierarchy, MassPoint, NodeId, ViewspaceBounds};
use crate::vector::{self, Point3};

/// Axis aligned bounding box over body positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    fn from_bodies(bodies: &[MassPoint]) -> Self {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];

        for body in bodies {
            for axis in 0..3 {
                min[axis] = min[axis].min(body.position[axis]);
                max[axis] = max[axis].max(body.position[axis]);
            }
        }

        if bodies.is_empty() {
            min = [0.0; 3];
            max = [0.0; 3];
        }

        Self { min, max }
    }

    pub fn longest_axis(&self) -> usize {
        let extents = vector::sub(&self.max, &self.min);
        let mut axis = 0;
        for candidate in 1..3 {
            if extents[candidate] > extents[axis] {
                axis = candidate;
            }
        }
        axis
    }

    pub fn corners(&self) -> [Point3; 8] {
        let mut corners = [[0.0; 3]; 8];
        for (c, corner) in corners.iter_mut().enumerate() {
            for axis in 0..3 {
                corner[axis] = if (c >> axis) & 1 == 0 {
                    self.min[axis]
                } else {
                    self.max[axis]
                };
            }
        }
        corners
    }
}

/// A node in the SegmentBvh
#[derive(Debug)]
struct BvhNode {
    children: Vec<NodeId>,
    center_of_mass: Point3,
    total_mass: f64,
    bounds: Aabb,
    cluster_indices: Vec<usize>,
    bodies: Vec<MassPoint>,
}

/// Binary bounding volume hierarchy over curve segments, stored as a flat arena.
///
/// Each segment becomes a body located at its midpoint and weighted by its length. Nodes are
/// split at the median along the longest axis of their bounding box until they hold at most
/// `max_leaf_size` bodies.
#[derive(Debug)]
pub struct SegmentBvh {
    nodes: Vec<BvhNode>,
}

impl SegmentBvh {
    /// Builds a hierarchy with single-element leaves.
    pub fn new<C: CurveTopology>(curve: &C) -> Self {
        Self::with_leaf_size(curve, 1)
    }

    pub fn with_leaf_size<C: CurveTopology>(curve: &C, max_leaf_size: usize) -> Self {
        let bodies: Vec<MassPoint> = (0..curve.num_elements())
            .map(|index| MassPoint {
                position: curve.midpoint(index),
                mass: curve.length(index),
                index,
            })
            .collect();

        let mut tree = SegmentBvh { nodes: Vec::new() };
        tree.build_tree(bodies, max_leaf_size.max(1));
        tree
    }

    fn build_tree(&mut self, bodies: Vec<MassPoint>, max_leaf_size: usize) {
        let root = self.push_node(&bodies);
        let mut stack = vec![(root, bodies)];

        while let Some((node, mut bodies)) = stack.pop() {
            if bodies.len() <= max_leaf_size {
                let indices = bodies.iter().map(|b| b.index).collect();
                let entry = &mut self.nodes[node.index()];
                entry.cluster_indices = indices;
                entry.bodies = bodies;
                continue;
            }

            let axis = self.nodes[node.index()].bounds.longest_axis();
            bodies.sort_by(|a, b| {
                a.position[axis]
                    .partial_cmp(&b.position[axis])
                    .unwrap_or(Ordering::Equal)
            });

            let right_bodies = bodies.split_off(bodies.len() / 2);
            let left_bodies = bodies;

            let left = self.push_node(&left_bodies);
            let right = self.push_node(&right_bodies);

            let entry = &mut self.nodes[node.index()];
            entry.children = vec![left, right];
            entry.cluster_indices = left_bodies
                .iter()
                .chain(right_bodies.iter())
                .map(|b| b.index)
                .collect();

            // Right first so the left subtree is finished before the right one.
            stack.push((right, right_bodies));
            stack.push((left, left_bodies));
        }
    }

    fn push_node(&mut self, bodies: &[MassPoint]) -> NodeId {
        let total_mass: f64 = bodies.iter().map(|b| b.mass).sum();

        let center_of_mass = if total_mass > 0.0 {
            let weighted = bodies.iter().fold([0.0; 3], |acc, b| {
                vector::add(&acc, &vector::scale(&b.position, b.mass))
            });
            vector::scale(&weighted, 1.0 / total_mass)
        } else if !bodies.is_empty() {
            let sum = bodies
                .iter()
                .fold([0.0; 3], |acc, b| vector::add(&acc, &b.position));
            vector::scale(&sum, 1.0 / bodies.len() as f64)
        } else {
            [0.0; 3]
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(BvhNode {
            children: Vec::new(),
            center_of_mass,
            total_mass,
            bounds: Aabb::from_bodies(bodies),
            cluster_indices: bodies.iter().map(|b| b.index).collect(),
            bodies: Vec::new(),
        });
        id
    }

    pub fn bounds(&self, node: NodeId) -> Aabb {
        self.nodes[node.index()].bounds
    }
}

impl ClusterHierarchy for SegmentBvh {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    fn num_elements(&self, node: NodeId) -> usize {
        self.nodes[node.index()].cluster_indices.len()
    }

    fn center_of_mass(&self, node: NodeId) -> Point3 {
        self.nodes[node.index()].center_of_mass
    }

    fn total_mass(&self, node: NodeId) -> f64 {
        self.nodes[node.index()].total_mass
    }

    fn viewspace_bounds(&self, node: NodeId, from: &Point3) -> ViewspaceBounds {
        let entry = &self.nodes[node.index()];
        let view = vector::sub(&entry.center_of_mass, from);
        let view_length = vector::norm(&view);

        let mut bounds = ViewspaceBounds::default();

        for corner in entry.bounds.corners() {
            let offset = vector::sub(&corner, &entry.center_of_mass);

            if view_length > 0.0 {
                let direction = vector::scale(&view, 1.0 / view_length);
                let along = vector::dot(&offset, &direction);
                let perpendicular = vector::sub(&offset, &vector::scale(&direction, along));
                bounds.linear = bounds.linear.max(along.abs());
                bounds.radial = bounds.radial.max(vector::norm(&perpendicular));
            } else {
                // No viewing direction, fall back to the full corner distance on both axes.
                let d = vector::norm(&offset);
                bounds.linear = bounds.linear.max(d);
                bounds.radial = bounds.radial.max(d);
            }
        }

        bounds
    }

    fn cluster_indices(&self, node: NodeId) -> &[usize] {
        &self.nodes[node.index()].cluster_indices
    }

    fn leaf_bodies(&self, node: NodeId) -> &[MassPoint] {
        &self.nodes[node.index()].bodies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::PolyCurve;
    use equator::assert;
    use faer::Mat;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_curve(n: usize, seed: u64) -> PolyCurve {
        let mut rng = StdRng::seed_from_u64(seed);
        let points = Mat::from_fn(n, 3, |_, _| rng.random_range(-1.0..1.0));
        PolyCurve::open(&points)
    }

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort_unstable();
        v
    }

    #[test]
    fn children_partition_parent_indices() {
        let curve = random_curve(65, 7);
        let bvh = SegmentBvh::new(&curve);

        for n in 0..bvh.num_nodes() {
            let node = NodeId(n);
            let children = bvh.children(node);
            if children.is_empty() {
                assert!(bvh.num_elements(node) == 1);
                continue;
            }
            let mut from_children: Vec<usize> = Vec::new();
            for &child in children {
                from_children.extend_from_slice(bvh.cluster_indices(child));
            }
            assert!(from_children == bvh.cluster_indices(node).to_vec());
        }
    }

    #[test]
    fn root_covers_every_element_once() {
        let curve = random_curve(40, 11);
        let bvh = SegmentBvh::new(&curve);
        let root = bvh.root();
        let expected: Vec<usize> = (0..39).collect();
        assert!(sorted(bvh.cluster_indices(root).to_vec()) == expected);

        let bodies = bvh.cluster_bodies(root);
        let body_indices: Vec<usize> = bodies.iter().map(|b| b.index).collect();
        assert!(body_indices == bvh.cluster_indices(root).to_vec());
    }

    #[test]
    fn masses_accumulate_to_curve_length() {
        let curve = random_curve(30, 3);
        let bvh = SegmentBvh::new(&curve);
        let length: f64 = (0..curve.num_elements()).map(|e| curve.length(e)).sum();
        let root_mass = bvh.total_mass(bvh.root());
        assert!((root_mass - length).abs() < 1e-12 * length);
    }

    #[test]
    fn larger_leaves_store_several_bodies() {
        let curve = random_curve(50, 5);
        let bvh = SegmentBvh::with_leaf_size(&curve, 4);
        for n in 0..bvh.num_nodes() {
            let node = NodeId(n);
            if bvh.is_leaf(node) {
                assert!(bvh.leaf_bodies(node).len() <= 4);
                assert!(bvh.leaf_bodies(node).len() == bvh.num_elements(node));
            } else {
                assert!(bvh.leaf_bodies(node).is_empty());
            }
        }
    }

    #[test]
    fn single_element_cluster_has_zero_extent() {
        let curve = random_curve(10, 9);
        let bvh = SegmentBvh::new(&curve);
        let leaf = (0..bvh.num_nodes())
            .map(NodeId)
            .find(|&n| bvh.is_leaf(n))
            .unwrap();
        let bounds = bvh.viewspace_bounds(leaf, &[10.0, 10.0, 10.0]);
        assert!(bounds.max_extent() < 1e-12);
    }

    #[test]
    fn viewspace_bounds_split_along_and_across() {
        // Two bodies on the x axis, seen from far along y.
        let curve = PolyCurve::open(&faer::mat![
            [-1.0, 0.0, 0.0],
            [-0.5, 0.0, 0.0],
            [0.5, 0.0, 0.0],
            [1.0, 0.0, 0.0],
        ]);
        let bvh = SegmentBvh::with_leaf_size(&curve, 3);
        let root = bvh.root();
        // Midpoints at -0.75, 0.0, 0.75 with masses 0.5, 1.0, 0.5; centre at origin.
        assert!(bvh.center_of_mass(root) == [0.0, 0.0, 0.0]);

        let from_y = bvh.viewspace_bounds(root, &[0.0, 5.0, 0.0]);
        assert!((from_y.radial - 0.75).abs() < 1e-12);
        assert!(from_y.linear.abs() < 1e-12);

        let from_x = bvh.viewspace_bounds(root, &[5.0, 0.0, 0.0]);
        assert!((from_x.linear - 0.75).abs() < 1e-12);
        assert!(from_x.radial.abs() < 1e-12);
    }

    #[test]
    fn empty_curve_builds_single_empty_root() {
        let curve = PolyCurve::default();
        let bvh = SegmentBvh::new(&curve);
        assert!(bvh.num_nodes() == 1);
        assert!(bvh.num_elements(bvh.root()) == 0);
        assert!(bvh.is_leaf(bvh.root()));
    }
}
