/////////////////////////////////////////////////////////////////////////////////////////////
//
// Classifies cluster pairs into admissible and inadmissible blocks.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Admissibility classification of cluster pairs.
//!
//! Starting from `(root, root)`, pairs are resolved breadth first. Each round either files a
//! pair as admissible (well separated, approximated in the far field), files it as
//! inadmissible (evaluated exactly), drops it (an empty side), or replaces it with the cartesian
//! product of its sides' children for the next round.

use sobolev_bct_geometry::{vector, ClusterHierarchy, NodeId};
use tracing::{debug, trace, warn};

use crate::cluster_pair::{ClusterPair, PairLists};

/// Pairs whose combined element count is at most this are never subdivided.
pub const SMALL_BLOCK_ELEMENTS: usize = 8;

/// Classifies every pair reachable from `(root, root)`.
///
/// Returns the pair lists and the number of subdivision rounds it took.
pub fn classify<H>(hierarchy: &H, separation_coeff: f64) -> (PairLists, usize)
where
    H: ClusterHierarchy + ?Sized,
{
    let root = hierarchy.root();
    let mut lists = PairLists::default();
    let mut unresolved = vec![ClusterPair::new(root, root)];
    let mut rounds = 0;

    while !unresolved.is_empty() {
        trace!(round = rounds, unresolved = unresolved.len(), "splitting cluster pairs");
        unresolved = split_inadmissible_pairs(hierarchy, separation_coeff, &unresolved, &mut lists);
        rounds += 1;
    }

    debug!(
        admissible = lists.admissible.len(),
        inadmissible = lists.inadmissible.len(),
        rounds,
        "classified cluster pairs"
    );

    (lists, rounds)
}

/// Runs one classification round, returning the pairs left for the next round.
fn split_inadmissible_pairs<H>(
    hierarchy: &H,
    separation_coeff: f64,
    unresolved: &[ClusterPair],
    lists: &mut PairLists,
) -> Vec<ClusterPair>
where
    H: ClusterHierarchy + ?Sized,
{
    let mut next_pairs = Vec::new();

    for pair in unresolved {
        let s1 = hierarchy.num_elements(pair.first);
        let s2 = hierarchy.num_elements(pair.second);

        if s1 == 0 || s2 == 0 {
            continue;
        }

        if s1 == 1 && s2 == 1 {
            // Singletons are always multiplied exactly.
            lists.inadmissible.push(*pair);
        } else if is_pair_admissible(hierarchy, pair, separation_coeff) {
            lists.admissible.push(*pair);
        } else if is_pair_small_enough(hierarchy, pair) {
            lists.inadmissible.push(*pair);
        } else if hierarchy.is_leaf(pair.first) && hierarchy.is_leaf(pair.second) {
            // Two multi-element leaves cannot be refined further.
            lists.inadmissible.push(*pair);
        } else {
            for &c1 in split_side(hierarchy, &pair.first) {
                for &c2 in split_side(hierarchy, &pair.second) {
                    next_pairs.push(ClusterPair::new(c1, c2));
                }
            }
        }
    }

    next_pairs
}

/// Children of a node, or the node itself when it is a leaf.
fn split_side<'h, H>(hierarchy: &'h H, node: &'h NodeId) -> &'h [NodeId]
where
    H: ClusterHierarchy + ?Sized,
{
    let children = hierarchy.children(*node);
    if children.is_empty() {
        std::slice::from_ref(node)
    } else {
        children
    }
}

/// Whether a block is cheap enough to evaluate exactly without further subdivision.
pub fn is_pair_small_enough<H>(hierarchy: &H, pair: &ClusterPair) -> bool
where
    H: ClusterHierarchy + ?Sized,
{
    let s1 = hierarchy.num_elements(pair.first);
    let s2 = hierarchy.num_elements(pair.second);
    s1 <= 1 || s2 <= 1 || s1 + s2 <= SMALL_BLOCK_ELEMENTS
}

/// Well-separatedness test.
///
/// A pair of distinct clusters is admissible when the larger of the two clusters' viewspace
/// extents, each seen from the other cluster's centre of mass, is strictly less than
/// `separation_coeff` times the distance between the centres. A cluster paired with itself,
/// and a pair whose centres coincide, is never admissible.
pub fn is_pair_admissible<H>(hierarchy: &H, pair: &ClusterPair, separation_coeff: f64) -> bool
where
    H: ClusterHierarchy + ?Sized,
{
    if pair.is_diagonal() {
        return false;
    }

    let c1 = hierarchy.center_of_mass(pair.first);
    let c2 = hierarchy.center_of_mass(pair.second);
    let distance = vector::distance(&c1, &c2);

    if !(distance > 0.0 && distance.is_finite()) {
        warn!(
            first = pair.first.index(),
            second = pair.second.index(),
            distance,
            "distinct clusters with coincident centres of mass"
        );
        return false;
    }

    let spread1 = hierarchy.viewspace_bounds(pair.first, &c2);
    let spread2 = hierarchy.viewspace_bounds(pair.second, &c1);

    let max_radial = spread1.radial.max(spread2.radial);
    let max_linear = spread1.linear.max(spread2.linear);

    max_radial.max(max_linear) < separation_coeff * distance
}
