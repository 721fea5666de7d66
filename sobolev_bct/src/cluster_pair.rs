/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the cluster pair handle and the classified pair collections.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};
use sobolev_bct_geometry::NodeId;

/// Two hierarchy nodes whose interaction block is classified and multiplied as a unit.
///
/// The pair does not own the nodes; both ids index into the hierarchy the tree was built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterPair {
    /// Row side of the block. Multiplication results are written to its elements.
    pub first: NodeId,

    /// Column side of the block.
    pub second: NodeId,
}

impl ClusterPair {
    pub fn new(first: NodeId, second: NodeId) -> Self {
        Self { first, second }
    }

    /// Whether both sides are the same cluster.
    #[inline(always)]
    pub fn is_diagonal(&self) -> bool {
        self.first == self.second
    }
}

/// Result of classifying every cluster pair reachable from `(root, root)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairLists {
    /// Well-separated pairs, approximated in the far field.
    pub admissible: Vec<ClusterPair>,

    /// Near or small pairs, evaluated exactly.
    pub inadmissible: Vec<ClusterPair>,
}
