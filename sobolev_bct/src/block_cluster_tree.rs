/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements construction and bookkeeping of the block cluster tree.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::fmt::{self, Debug};
use std::sync::Arc;

use sobolev_bct_geometry::{ClusterHierarchy, CurveTopology, Point3};
use tracing::{debug, trace};

use crate::{
    admissibility,
    cluster_pair::{ClusterPair, PairLists},
    error::BctError,
    kernel,
    params::BctParams,
    progress::{self, ProgressMsg, ProgressSink},
};

/// A hierarchical block decomposition of the dense element-to-element interaction matrix
/// of a curve.
///
/// Construction classifies every block reachable from `(root, root)` as admissible (far
/// field, approximated by a single monopole per cluster) or inadmissible (near field,
/// evaluated exactly). The pair lists are immutable afterwards; the curve and the hierarchy
/// are borrowed and must not change for the lifetime of the tree.
///
/// The generic parameters `C` and `H` must implement [`CurveTopology`] and
/// [`ClusterHierarchy`] respectively.
pub struct BlockClusterTree<'a, C, H>
where
    C: CurveTopology,
    H: ClusterHierarchy,
{
    /// Curve whose elements index the rows of the operator.
    pub(crate) curve: &'a C,

    /// Spatial hierarchy over the curve's elements.
    pub(crate) hierarchy: &'a H,

    /// Kernel exponents and admissibility threshold.
    pub(crate) params: BctParams,

    /// Classified blocks.
    pub(crate) pairs: PairLists,

    /// Number of subdivision rounds the classification took.
    pub(crate) rounds: usize,

    /// `a_IJ` for each admissible pair, in the same order as `pairs.admissible`.
    pub(crate) far_field_coefficients: Vec<f64>,

    /// Hierarchy mass of each element, indexed by element.
    pub(crate) element_masses: Vec<f64>,

    /// Midpoint of each element, indexed by element.
    pub(crate) midpoints: Vec<Point3>,

    /// Length of each element, indexed by element.
    pub(crate) lengths: Vec<f64>,

    /// Optional listener for diagnostic events.
    pub(crate) progress_sink: Option<Arc<dyn ProgressSink>>,
}

impl<'a, C, H> BlockClusterTree<'a, C, H>
where
    C: CurveTopology,
    H: ClusterHierarchy,
{
    /// Classifies all cluster pairs of `hierarchy` and returns the ready-to-use tree.
    ///
    /// # Arguments
    /// * `curve`: The curve the hierarchy was built over.
    /// * `hierarchy`: Spatial hierarchy whose leaves cover every element of `curve`.
    /// * `params`: Separation coefficient and kernel exponents.
    ///
    /// # Errors
    /// Returns [`BctError::InvalidParameter`] if `params` fails validation.
    pub fn new(curve: &'a C, hierarchy: &'a H, params: BctParams) -> Result<Self, BctError> {
        Self::new_with_progress(curve, hierarchy, params, None)
    }

    /// As [`BlockClusterTree::new`], reporting classification and validation events to
    /// `progress_sink`.
    pub fn new_with_progress(
        curve: &'a C,
        hierarchy: &'a H,
        params: BctParams,
        progress_sink: Option<Arc<dyn ProgressSink>>,
    ) -> Result<Self, BctError> {
        params.validate()?;

        let (pairs, rounds) = admissibility::classify(hierarchy, params.separation_coeff);

        let power = params.kernel_power();
        let far_field_coefficients = pairs
            .admissible
            .iter()
            .map(|pair| {
                kernel::far_field_coefficient(
                    &hierarchy.center_of_mass(pair.first),
                    &hierarchy.center_of_mass(pair.second),
                    power,
                )
            })
            .collect();

        let num_elements = curve.num_elements();
        let mut element_masses = vec![0.0; num_elements];
        for body in hierarchy.cluster_bodies(hierarchy.root()) {
            element_masses[body.index] = body.mass;
        }

        let midpoints = (0..num_elements).map(|e| curve.midpoint(e)).collect();
        let lengths = (0..num_elements).map(|e| curve.length(e)).collect();

        debug!(
            elements = num_elements,
            admissible = pairs.admissible.len(),
            inadmissible = pairs.inadmissible.len(),
            separation_coeff = params.separation_coeff,
            "built block cluster tree"
        );

        progress::emit(
            &progress_sink,
            ProgressMsg::PairsClassified {
                admissible: pairs.admissible.len(),
                inadmissible: pairs.inadmissible.len(),
                rounds,
            },
        );

        Ok(Self {
            curve,
            hierarchy,
            params,
            pairs,
            rounds,
            far_field_coefficients,
            element_masses,
            midpoints,
            lengths,
            progress_sink,
        })
    }

    /// Replaces the listener used for later reports, such as
    /// [`BlockClusterTree::compare_blocks`].
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress_sink = Some(sink);
        self
    }

    pub fn params(&self) -> &BctParams {
        &self.params
    }

    /// Number of curve elements, the row count of fields passed to the multiply routines.
    pub fn num_elements(&self) -> usize {
        self.curve.num_elements()
    }

    pub fn admissible_pairs(&self) -> &[ClusterPair] {
        &self.pairs.admissible
    }

    pub fn inadmissible_pairs(&self) -> &[ClusterPair] {
        &self.pairs.inadmissible
    }

    /// Number of breadth-first rounds the classification took.
    pub fn classification_rounds(&self) -> usize {
        self.rounds
    }

    /// Per-element masses taken from the hierarchy's bodies.
    pub fn element_masses(&self) -> &[f64] {
        &self.element_masses
    }

    /// Text summary of the pair counts.
    pub fn summary(&self) -> String {
        format!(
            "{} admissible pairs\n{} inadmissible pairs",
            self.pairs.admissible.len(),
            self.pairs.inadmissible.len()
        )
    }

    /// Prints [`BlockClusterTree::summary`] to stdout.
    pub fn print_data(&self) {
        println!("{}", self.summary());
    }

    /// Exact kernel entry between two elements, zero for adjacent elements.
    #[inline(always)]
    pub(crate) fn exact_entry(&self, i: usize, j: usize, power: f64) -> f64 {
        if self.curve.are_adjacent(i, j) {
            0.0
        } else if self.midpoints[i] == self.midpoints[j] {
            trace!(first = i, second = j, "skipping coincident non-adjacent elements");
            0.0
        } else {
            kernel::interaction(
                &self.midpoints[i],
                self.lengths[i],
                &self.midpoints[j],
                self.lengths[j],
                power,
            )
        }
    }
}

impl<C, H> Debug for BlockClusterTree<'_, C, H>
where
    C: CurveTopology,
    H: ClusterHierarchy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockClusterTree")
            .field("num_elements", &self.num_elements())
            .field("params", &self.params)
            .field("admissible_pairs", &self.pairs.admissible.len())
            .field("inadmissible_pairs", &self.pairs.inadmissible.len())
            .field("rounds", &self.rounds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::closure_sink;
    use crate::test_support::helix;
    use equator::assert;
    use sobolev_bct_geometry::{PolyCurve, SegmentBvh};
    use std::sync::Mutex;

    #[test]
    fn summary_reports_pair_counts() {
        let curve = helix(90, 3.0, 9.0, false);
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::default()).unwrap();

        let expected = format!(
            "{} admissible pairs\n{} inadmissible pairs",
            tree.admissible_pairs().len(),
            tree.inadmissible_pairs().len()
        );
        assert!(tree.summary() == expected);
        assert!(tree.classification_rounds() > 1);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let curve = helix(10, 1.0, 1.0, false);
        let bvh = SegmentBvh::new(&curve);
        let params = BctParams::new(f64::INFINITY, 2.0, 4.0, 0.0);

        match BlockClusterTree::new(&curve, &bvh, params) {
            Err(BctError::InvalidParameter { name, .. }) => assert!(name == "separation_coeff"),
            other => panic!("Expected InvalidParameter error, got {:?}", other),
        }
    }

    #[test]
    fn element_masses_are_segment_lengths() {
        let curve = helix(25, 1.0, 2.0, true);
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::default()).unwrap();

        for (e, &mass) in tree.element_masses().iter().enumerate() {
            assert!(mass == curve.length(e));
        }
    }

    #[test]
    fn empty_curve_builds_empty_tree() {
        let curve = PolyCurve::default();
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::default()).unwrap();
        assert!(tree.num_elements() == 0);
        assert!(tree.admissible_pairs().is_empty());
        assert!(tree.inadmissible_pairs().is_empty());
    }

    #[test]
    fn construction_reports_classification() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink_received = Arc::clone(&received);
        let (sink, handle) = closure_sink(16, move |msg| {
            if let Ok(mut messages) = sink_received.lock() {
                messages.push(msg);
            }
        });

        let curve = helix(40, 2.0, 4.0, false);
        let bvh = SegmentBvh::new(&curve);
        let tree =
            BlockClusterTree::new_with_progress(&curve, &bvh, BctParams::default(), Some(sink))
                .unwrap();
        let admissible = tree.admissible_pairs().len();
        drop(tree);
        handle.join().unwrap();

        let messages = received.lock().unwrap();
        assert!(messages.len() == 1);
        match &messages[0] {
            ProgressMsg::PairsClassified {
                admissible: reported,
                ..
            } => assert!(*reported == admissible),
            other => panic!("Expected PairsClassified, got {:?}", other),
        }
    }

    #[test]
    fn attached_sink_receives_later_reports() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink_received = Arc::clone(&received);
        let (sink, handle) = closure_sink(1 << 12, move |msg| {
            if let Ok(mut messages) = sink_received.lock() {
                messages.push(msg);
            }
        });

        let curve = helix(40, 2.0, 4.0, false);
        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::default())
            .unwrap()
            .with_progress_sink(sink);
        tree.compare_blocks();
        drop(tree);
        handle.join().unwrap();

        let messages = received.lock().unwrap();
        assert!(!messages
            .iter()
            .any(|msg| matches!(msg, ProgressMsg::PairsClassified { .. })));
        assert!(messages
            .iter()
            .any(|msg| matches!(msg, ProgressMsg::AccuracySummary { .. })));
    }

    #[test]
    fn coincident_components_do_not_interact() {
        let points = faer::mat![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0]];
        let mut curve = PolyCurve::default();
        curve.add_component(&points, false);
        curve.add_component(&points, false);

        let bvh = SegmentBvh::new(&curve);
        let tree = BlockClusterTree::new(&curve, &bvh, BctParams::default()).unwrap();
        let power = tree.params().kernel_power();

        // Elements 0 and 2 lie on top of each other without sharing a vertex.
        assert!(!curve.are_adjacent(0, 2));
        assert!(tree.exact_entry(0, 2, power) == 0.0);
        assert!(tree.exact_entry(0, 3, power) > 0.0);
    }
}
