/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the upward and downward passes of the propagated far-field product.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Upward/downward propagation of far-field contributions through the hierarchy.
//!
//! The per-node values of a propagated product live in a [`PropagationScratch`] owned by the
//! caller, indexed by [`NodeId`]. The hierarchy itself is never written to, so independent
//! products may run concurrently as long as each uses its own scratch.

use sobolev_bct_geometry::{ClusterHierarchy, NodeId};

use crate::cluster_pair::ClusterPair;

/// Transient per-node values of a single propagated product.
#[derive(Debug, Clone, Default)]
pub struct PropagationScratch {
    /// Mass-weighted sum of the input over each node's elements.
    upward: Vec<f64>,

    /// Sum of the pending contributions of a node and all of its ancestors.
    downward: Vec<f64>,

    /// Far-field contribution gathered from the admissible pairs a node is the row side of.
    pending: Vec<f64>,
}

impl PropagationScratch {
    pub fn new(num_nodes: usize) -> Self {
        Self {
            upward: vec![0.0; num_nodes],
            downward: vec![0.0; num_nodes],
            pending: vec![0.0; num_nodes],
        }
    }

    pub fn for_hierarchy<H: ClusterHierarchy + ?Sized>(hierarchy: &H) -> Self {
        Self::new(hierarchy.num_nodes())
    }

    /// Zeroes every field, resizing to `num_nodes` if needed.
    pub fn reset(&mut self, num_nodes: usize) {
        for field in [&mut self.upward, &mut self.downward, &mut self.pending] {
            field.clear();
            field.resize(num_nodes, 0.0);
        }
    }

    pub fn upward(&self, node: NodeId) -> f64 {
        self.upward[node.index()]
    }

    pub fn downward(&self, node: NodeId) -> f64 {
        self.downward[node.index()]
    }

    pub fn pending(&self, node: NodeId) -> f64 {
        self.pending[node.index()]
    }
}

/// Post-order pass setting each node's mass-weighted sum of `values` over its elements.
pub fn upward_pass<H>(hierarchy: &H, values: &[f64], scratch: &mut PropagationScratch)
where
    H: ClusterHierarchy + ?Sized,
{
    let mut stack = vec![(hierarchy.root(), false)];

    while let Some((node, expanded)) = stack.pop() {
        let children = hierarchy.children(node);

        if children.is_empty() {
            scratch.upward[node.index()] = hierarchy
                .leaf_bodies(node)
                .iter()
                .map(|body| body.mass * values[body.index])
                .sum();
        } else if expanded {
            scratch.upward[node.index()] =
                children.iter().map(|child| scratch.upward[child.index()]).sum();
        } else {
            stack.push((node, true));
            stack.extend(children.iter().map(|&child| (child, false)));
        }
    }
}

/// Adds `a_IJ * upward(J)` to the pending value of `I` for every admissible pair `(I, J)`.
pub fn accumulate_far_field(
    pairs: &[ClusterPair],
    coefficients: &[f64],
    scratch: &mut PropagationScratch,
) {
    for (pair, a_ij) in pairs.iter().zip(coefficients) {
        scratch.pending[pair.first.index()] += a_ij * scratch.upward[pair.second.index()];
    }
}

/// Pre-order pass summing pending values from the root down, writing each leaf's total to
/// the output entries of its elements.
pub fn downward_pass<H>(hierarchy: &H, scratch: &mut PropagationScratch, output: &mut [f64])
where
    H: ClusterHierarchy + ?Sized,
{
    let mut stack = vec![(hierarchy.root(), 0.0)];

    while let Some((node, parent_value)) = stack.pop() {
        let value = parent_value + scratch.pending[node.index()];
        scratch.downward[node.index()] = value;

        let children = hierarchy.children(node);
        if children.is_empty() {
            for body in hierarchy.leaf_bodies(node) {
                output[body.index] = value;
            }
        } else {
            stack.extend(children.iter().map(|&child| (child, value)));
        }
    }
}
