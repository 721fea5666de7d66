/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the cluster hierarchy contract consumed by the block cluster tree.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};

use crate::vector::Point3;

/// Stable identifier of a hierarchy node, an index into the hierarchy's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single curve element seen as a point mass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassPoint {
    /// Representative position of the element (its midpoint).
    pub position: Point3,

    /// Mass of the element (its length).
    pub mass: f64,

    /// Original element index on the curve.
    pub index: usize,
}

/// Spread of a cluster as observed from an external point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewspaceBounds {
    /// Extent perpendicular to the viewing direction.
    pub radial: f64,

    /// Extent along the viewing direction.
    pub linear: f64,
}

impl ViewspaceBounds {
    #[inline(always)]
    pub fn max_extent(&self) -> f64 {
        self.radial.max(self.linear)
    }
}

/// Read-only access to a spatial hierarchy over the elements of a curve.
///
/// Nodes are addressed by [`NodeId`]. The element sets of the children of a node partition
/// the element set of that node, and `cluster_indices` of a node lists the same elements as
/// the bodies returned by [`ClusterHierarchy::cluster_bodies`].
pub trait ClusterHierarchy {
    fn root(&self) -> NodeId;

    /// Total number of nodes; every `NodeId` handed out is below this bound.
    fn num_nodes(&self) -> usize;

    /// Ordered children of a node, empty iff the node is a leaf.
    fn children(&self, node: NodeId) -> &[NodeId];

    fn num_elements(&self, node: NodeId) -> usize;

    fn center_of_mass(&self, node: NodeId) -> Point3;

    /// Sum of the masses of the elements in the cluster.
    fn total_mass(&self, node: NodeId) -> f64;

    /// Angular/linear spread of the cluster seen from `from`.
    fn viewspace_bounds(&self, node: NodeId, from: &Point3) -> ViewspaceBounds;

    /// Original element indices contained in the cluster.
    fn cluster_indices(&self, node: NodeId) -> &[usize];

    /// Element bodies stored directly on a leaf. Empty for internal nodes.
    fn leaf_bodies(&self, node: NodeId) -> &[MassPoint];

    fn is_leaf(&self, node: NodeId) -> bool {
        self.children(node).is_empty()
    }

    /// Collects the bodies of every leaf below `node`, in depth-first child order.
    fn cluster_bodies(&self, node: NodeId) -> Vec<MassPoint> {
        let mut bodies = Vec::with_capacity(self.num_elements(node));
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            let children = self.children(current);
            if children.is_empty() {
                bodies.extend_from_slice(self.leaf_bodies(current));
            } else {
                stack.extend(children.iter().rev());
            }
        }

        bodies
    }
}
