/////////////////////////////////////////////////////////////////////////////////////////////
//
// Compares exact and monopole-approximated blocks to report approximation accuracy.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Accuracy diagnostics for the far-field approximation.
//!
//! Blocks here use the negated convention `block(i, j) = -m_i m_j / dist^(beta - alpha)`.
//! None of this is on the multiplication path; it exists to judge separation coefficients.

use std::fmt;

use faer::Mat;
use serde::{Deserialize, Serialize};
use sobolev_bct_geometry::{ClusterHierarchy, CurveTopology};
use tracing::debug;

use crate::{
    block_cluster_tree::BlockClusterTree,
    cluster_pair::ClusterPair,
    kernel,
    progress::{self, ProgressMsg},
};

/// Admissible blocks whose relative error exceeds this percentage are reported individually.
pub const POOR_BLOCK_PERCENT: f64 = 50.0;

/// Error of one admissible block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockComparison {
    pub pair: ClusterPair,
    pub first_size: usize,
    pub second_size: usize,

    /// Frobenius norm of the exact block.
    pub norm: f64,

    /// Frobenius norm of the exact block minus the approximated block.
    pub error: f64,

    pub relative_percent: f64,
}

/// Result of [`BlockClusterTree::compare_blocks`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    /// Frobenius norm of the error over all admissible blocks.
    pub total_error: f64,

    /// Frobenius norm of the exact operator over all blocks.
    pub total_norm: f64,

    /// `100 * total_error / total_norm`.
    pub relative_percent: f64,

    /// Admissible blocks with a relative error above [`POOR_BLOCK_PERCENT`].
    pub poor_blocks: Vec<BlockComparison>,
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.poor_blocks {
            writeln!(
                f,
                "({}, {}) error: {} ({} percent)",
                block.first_size, block.second_size, block.error, block.relative_percent
            )?;
        }
        write!(
            f,
            "Total error = {} ({} percent; total norm = {})",
            self.total_error, self.relative_percent, self.total_norm
        )
    }
}

#[inline]
fn relative_percent(error: f64, norm: f64) -> f64 {
    if norm > 0.0 {
        100.0 * error / norm
    } else if error == 0.0 {
        0.0
    } else {
        f64::INFINITY
    }
}

impl<'a, C, H> BlockClusterTree<'a, C, H>
where
    C: CurveTopology,
    H: ClusterHierarchy,
{
    /// Dense exact block of a pair, zero between adjacent elements.
    ///
    /// Rows follow the bodies of `pair.first`, columns the bodies of `pair.second`.
    pub fn full_block(&self, pair: &ClusterPair) -> Mat<f64> {
        let bodies_i = self.hierarchy.cluster_bodies(pair.first);
        let bodies_j = self.hierarchy.cluster_bodies(pair.second);
        let power = self.params.kernel_power();

        Mat::from_fn(bodies_i.len(), bodies_j.len(), |i, j| {
            let (bi, bj) = (&bodies_i[i], &bodies_j[j]);
            if self.curve.are_adjacent(bi.index, bj.index) {
                0.0
            } else {
                -kernel::interaction(&bi.position, bi.mass, &bj.position, bj.mass, power)
            }
        })
    }

    /// Dense monopole approximation of a pair's block, `-m_i a_IJ m_j`.
    ///
    /// Adjacent elements are not excluded. The centres of the pair must be distinct.
    pub fn approx_block(&self, pair: &ClusterPair) -> Mat<f64> {
        let bodies_i = self.hierarchy.cluster_bodies(pair.first);
        let bodies_j = self.hierarchy.cluster_bodies(pair.second);

        let a_ij = kernel::far_field_coefficient(
            &self.hierarchy.center_of_mass(pair.first),
            &self.hierarchy.center_of_mass(pair.second),
            self.params.kernel_power(),
        );

        Mat::from_fn(bodies_i.len(), bodies_j.len(), |i, j| {
            -bodies_i[i].mass * a_ij * bodies_j[j].mass
        })
    }

    /// Measures the Frobenius error of the monopole approximation over all admissible
    /// blocks, relative to the norm of the whole operator.
    ///
    /// Inadmissible blocks are evaluated exactly, so they only add to the norm.
    pub fn compare_blocks(&self) -> AccuracyReport {
        let mut total_norm_sq = 0.0;
        let mut total_error_sq = 0.0;
        let mut poor_blocks = Vec::new();

        for pair in &self.pairs.inadmissible {
            let norm = self.full_block(pair).norm_l2();
            total_norm_sq += norm * norm;
        }

        for pair in &self.pairs.admissible {
            let full = self.full_block(pair);
            let approx = self.approx_block(pair);

            let norm = full.norm_l2();
            let error = (&full - &approx).norm_l2();
            let relative = relative_percent(error, norm);

            if relative > POOR_BLOCK_PERCENT {
                let comparison = BlockComparison {
                    pair: *pair,
                    first_size: full.nrows(),
                    second_size: full.ncols(),
                    norm,
                    error,
                    relative_percent: relative,
                };
                progress::emit(
                    &self.progress_sink,
                    ProgressMsg::PoorBlockApproximation {
                        first_size: comparison.first_size,
                        second_size: comparison.second_size,
                        error,
                        relative_percent: relative,
                    },
                );
                poor_blocks.push(comparison);
            }

            total_norm_sq += norm * norm;
            total_error_sq += error * error;
        }

        let total_error = total_error_sq.sqrt();
        let total_norm = total_norm_sq.sqrt();
        let report = AccuracyReport {
            total_error,
            total_norm,
            relative_percent: relative_percent(total_error, total_norm),
            poor_blocks,
        };

        debug!(
            total_error = report.total_error,
            relative_percent = report.relative_percent,
            poor_blocks = report.poor_blocks.len(),
            "compared admissible blocks"
        );

        progress::emit(
            &self.progress_sink,
            ProgressMsg::AccuracySummary {
                total_error: report.total_error,
                total_norm: report.total_norm,
                relative_percent: report.relative_percent,
            },
        );

        report
    }

    /// Runs [`BlockClusterTree::compare_blocks`] and prints the report to stdout, dumping
    /// both blocks of every poorly approximated pair.
    pub fn print_accuracy_report(&self) -> AccuracyReport {
        let report = self.compare_blocks();

        for block in &report.poor_blocks {
            println!("({}, {})", block.first_size, block.second_size);
            println!("Full:\n{:?}", self.full_block(&block.pair));
            println!("Approx:\n{:?}", self.approx_block(&block.pair));
            println!(
                "Error: {} ({} percent)",
                block.error, block.relative_percent
            );
        }
        println!(
            "Total error = {} ({} percent; total norm = {})",
            report.total_error, report.relative_percent, report.total_norm
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BctParams;
    use crate::progress::RecordingSink;
    use crate::test_support::helix;
    use equator::assert;
    use sobolev_bct_geometry::{PolyCurve, SegmentBvh};

    fn long_helix() -> PolyCurve {
        helix(256, 8.0, 40.0, false)
    }

    #[test]
    fn exact_classification_has_no_error() {
        let curve = helix(64, 2.0, 8.0, false);
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::new(0.0, 2.0, 4.0, 0.0))
            .unwrap();

        let report = tree.compare_blocks();
        assert!(report.total_error == 0.0);
        assert!(report.relative_percent == 0.0);
        assert!(report.total_norm > 0.0);
        assert!(report.poor_blocks.is_empty());
    }

    #[test]
    fn small_separation_is_accurate() {
        let curve = long_helix();
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::new(0.1, 2.0, 4.0, 0.0))
            .unwrap();
        assert!(!tree.admissible_pairs().is_empty());

        let report = tree.compare_blocks();
        assert!(report.total_error > 0.0);
        assert!(report.relative_percent < 10.0);
    }

    #[test]
    fn larger_separation_is_not_more_accurate() {
        let curve = long_helix();
        let bvh = SegmentBvh::new(&curve);
        let tight = BlockClusterTree::new(&curve, &bvh, BctParams::new(0.05, 2.0, 4.0, 0.0))
            .unwrap()
            .compare_blocks();
        let loose = BlockClusterTree::new(&curve, &bvh, BctParams::new(0.5, 2.0, 4.0, 0.0))
            .unwrap()
            .compare_blocks();

        assert!(tight.total_error <= loose.total_error);
        assert!(loose.total_error > 0.0);

        // The blocks partition the same operator, so its norm does not depend on the split.
        assert!((tight.total_norm - loose.total_norm).abs() <= 1e-10 * loose.total_norm);
    }

    #[test]
    fn approx_block_is_rank_one_outer_product() {
        let curve = long_helix();
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::new(0.3, 2.0, 4.0, 0.0))
            .unwrap();
        let pair = tree.admissible_pairs()[0];

        let approx = tree.approx_block(&pair);
        let bodies_i = bvh.cluster_bodies(pair.first);
        let bodies_j = bvh.cluster_bodies(pair.second);
        assert!(approx.nrows() == bodies_i.len());
        assert!(approx.ncols() == bodies_j.len());

        // Every 2x2 minor of a rank one matrix vanishes.
        if approx.nrows() > 1 && approx.ncols() > 1 {
            let minor = approx[(0, 0)] * approx[(1, 1)] - approx[(0, 1)] * approx[(1, 0)];
            assert!(minor.abs() <= 1e-12 * approx[(0, 0)].abs() * approx[(1, 1)].abs());
        }
        assert!((0..approx.nrows()).all(|i| approx[(i, 0)] < 0.0));
    }

    #[test]
    fn full_block_zeroes_neighbours() {
        let curve = helix(8, 1.0, 1.0, false);
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::default()).unwrap();
        let root = bvh.root();

        let block = tree.full_block(&ClusterPair::new(root, root));
        let bodies = bvh.cluster_bodies(root);
        for (i, bi) in bodies.iter().enumerate() {
            for (j, bj) in bodies.iter().enumerate() {
                if curve.are_adjacent(bi.index, bj.index) {
                    assert!(block[(i, j)] == 0.0);
                } else {
                    assert!(block[(i, j)] < 0.0);
                }
            }
        }
    }

    #[test]
    fn poor_blocks_are_reported_to_sink() {
        let sink = RecordingSink::new();

        let curve = long_helix();
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::new(0.9, 2.0, 4.0, 0.0))
            .unwrap()
            .with_progress_sink(sink.clone());
        let report = tree.compare_blocks();

        assert!(!report.poor_blocks.is_empty());
        assert!(report
            .poor_blocks
            .iter()
            .all(|b| b.relative_percent > POOR_BLOCK_PERCENT));
        assert!(sink.poor_blocks() == report.poor_blocks.len());

        let messages = sink.take();
        assert!(matches!(
            messages.last(),
            Some(ProgressMsg::AccuracySummary { .. })
        ));
    }

    #[test]
    fn poor_block_figures_match_their_blocks() {
        let curve = long_helix();
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::new(0.9, 2.0, 4.0, 0.0))
            .unwrap();
        let report = tree.print_accuracy_report();
        assert!(!report.poor_blocks.is_empty());

        for block in &report.poor_blocks {
            let full = tree.full_block(&block.pair);
            let approx = tree.approx_block(&block.pair);
            let error = (&full - &approx).norm_l2();
            let norm = full.norm_l2();

            assert!(block.first_size == full.nrows());
            assert!(block.second_size == full.ncols());
            assert!((block.error - error).abs() <= 1e-12 * error);
            assert!((block.norm - norm).abs() <= 1e-12 * norm);
            assert!((block.relative_percent - 100.0 * error / norm).abs() <= 1e-9);
        }
    }

    #[test]
    fn report_serializes_to_json() {
        let curve = helix(48, 2.0, 8.0, false);
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::new(0.4, 2.0, 4.0, 0.0))
            .unwrap();
        let report = tree.compare_blocks();

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("relative_percent"));
        let summary = format!("total norm = {})", report.total_norm);
        assert!(report.to_string().ends_with(&summary));
    }
}
