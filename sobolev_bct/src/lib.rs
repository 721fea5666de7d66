/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API for the Sobolev block cluster tree crate.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Block Cluster Tree for fractional Sobolev kernels on curves
//!
//! This crate applies the dense N x N interaction matrix of a fractional, hyper-singular
//! kernel between the segments of a polygonal curve without ever forming it. Pairs of
//! clusters from a spatial hierarchy are classified once into well-separated (admissible)
//! blocks, approximated by a single monopole per cluster, and near (inadmissible) blocks,
//! evaluated exactly. A matrix-vector product then costs roughly O(N log N).
//!
//! For distinct, non-adjacent elements `i` and `j` the kernel weight is
//! `a(i, j) = l(i) l(j) / |mid(i) - mid(j)|^(beta - alpha)`, and the operator applied to a
//! field `v` with one 3-vector per element is
//! `out(i) = 2 * ( (sum_j a(i, j)) v(i) - sum_j a(i, j) v(j) )`.
//!
//! # Features:
//! - Breadth-first admissibility classification with a Barnes-Hut style separation test
//! - Three multiplication modes: exact through the block structure, direct monopole, and
//!   monopole via upward/downward propagation through the hierarchy
//! - Per-call scratch buffers, so products on a shared tree may run concurrently
//! - Accuracy diagnostics comparing exact and approximated blocks
//!
//! # Example: Fast Matrix-Vector Product
//!
//! ```
//! use faer::Mat;
//! use sobolev_bct::{BctParams, BlockClusterTree, MultiplyMode};
//! use sobolev_bct_geometry::{CurveTopology, PolyCurve, SegmentBvh};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // A helix with 500 vertices
//! let n = 500;
//! let points = Mat::from_fn(n, 3, |i, j| {
//!     let t = 8.0 * std::f64::consts::PI * i as f64 / n as f64;
//!     match j {
//!         0 => t.cos(),
//!         1 => t.sin(),
//!         _ => 0.5 * t,
//!     }
//! });
//! let curve = PolyCurve::open(&points);
//!
//! // Spatial hierarchy over the curve's segments
//! let bvh = SegmentBvh::new(&curve);
//!
//! // A smaller separation coefficient is more accurate, but admits fewer blocks
//! let params = BctParams {
//!     separation_coeff: 0.25,
//!     alpha: 2.0,
//!     beta: 4.0,
//!     epsilon: 0.0,
//! };
//!
//! let tree = BlockClusterTree::new(&curve, &bvh, params)?;
//! tree.print_data();
//!
//! // One 3-vector per curve element
//! let v = Mat::from_fn(curve.num_elements(), 3, |i, j| ((i + j) as f64).sin());
//!
//! let fast = tree.multiply(v.as_ref(), MultiplyMode::MonopolePropagated)?;
//! let exact = tree.multiply(v.as_ref(), MultiplyMode::ExactDecomposition)?;
//! assert_eq!(fast.nrows(), exact.nrows());
//!
//! // Check how much the far-field approximation costs in accuracy
//! let report = tree.compare_blocks();
//! println!("{report}");
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! 1. Yu, C., Schumacher, H., & Crane, K. (2021).
//!    *Repulsive Curves.* *ACM Transactions on Graphics*, **40**(2).
//!
//! 2. Barnes, J., & Hut, P. (1986).
//!    *A hierarchical O(N log N) force-calculation algorithm.* *Nature*, **324**, 446–449.

mod admissibility;
mod block_cluster_tree;
mod cluster_pair;
mod error;
mod kernel;
mod multiply;
mod params;
mod propagation;
mod validation;

pub mod profiling;
pub mod progress;

#[cfg(test)]
mod test_support;

#[doc(inline)]
pub use {
    admissibility::{classify, is_pair_admissible, is_pair_small_enough, SMALL_BLOCK_ELEMENTS},
    block_cluster_tree::BlockClusterTree,
    cluster_pair::{ClusterPair, PairLists},
    error::BctError,
    multiply::MultiplyMode,
    params::BctParams,
    profiling::{ProfileSection, ProfilingContext, ProfilingSnapshot},
    propagation::PropagationScratch,
    validation::{AccuracyReport, BlockComparison, POOR_BLOCK_PERCENT},
};
