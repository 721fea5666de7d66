/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the exact, monopole and propagated matrix-vector products of the tree.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Matrix-vector products against the implicit interaction operator.
//!
//! For distinct, non-adjacent elements `i` and `j` the operator's off-diagonal weight is
//! `a(i, j) = l(i) l(j) / dist(mid(i), mid(j))^(beta - alpha)`. Applied to a field `v` of one
//! 3-vector per element it gives
//!
//! `out(i) = 2 * ( (sum_j a(i, j)) * v(i) - sum_j a(i, j) * v(j) )`.
//!
//! Inadmissible blocks are always evaluated exactly. The [`MultiplyMode`] picks how the
//! admissible blocks are handled.

use faer::{Mat, MatRef};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sobolev_bct_geometry::{vector, ClusterHierarchy, CurveTopology, Point3};

use crate::{
    block_cluster_tree::BlockClusterTree,
    cluster_pair::ClusterPair,
    error::BctError,
    profiling::{timed, ProfileSection, ProfilingContext},
    propagation::{self, PropagationScratch},
};

/// How the admissible (far-field) blocks are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MultiplyMode {
    /// Every block is evaluated with the exact kernel. Same cost as a dense product, but
    /// computed through the block structure; useful as a reference.
    ExactDecomposition,

    /// Each admissible block is replaced by its monopole approximation and applied directly,
    /// pair by pair.
    MonopoleDirect,

    /// Monopole approximation applied through an upward/downward pass over the hierarchy.
    #[default]
    MonopolePropagated,
}

/// Contributions of one block to the rows of its first side.
type RowContributions = Vec<(usize, Point3)>;

#[inline(always)]
fn field_row(v: MatRef<'_, f64>, i: usize) -> Point3 {
    [*v.get(i, 0), *v.get(i, 1), *v.get(i, 2)]
}

#[inline(always)]
fn add_to_row(out: &mut Mat<f64>, i: usize, value: &Point3) {
    for k in 0..3 {
        out[(i, k)] += value[k];
    }
}

fn scatter(out: &mut Mat<f64>, contributions: Vec<RowContributions>) {
    for rows in contributions {
        for (i, value) in rows {
            add_to_row(out, i, &value);
        }
    }
}

impl<'a, C, H> BlockClusterTree<'a, C, H>
where
    C: CurveTopology + Sync,
    H: ClusterHierarchy + Sync,
{
    /// Applies the operator to `v`, returning a new (N, 3) field.
    ///
    /// # Arguments
    /// * `v`: Input field of shape (N, 3), one row per curve element.
    /// * `mode`: How admissible blocks are applied.
    ///
    /// # Errors
    /// Returns [`BctError::FieldShapeMismatch`] if `v` is not (N, 3).
    pub fn multiply(&self, v: MatRef<'_, f64>, mode: MultiplyMode) -> Result<Mat<f64>, BctError> {
        let mut out = Mat::<f64>::zeros(self.num_elements(), 3);
        self.multiply_into(v, &mut out, mode, None)?;
        Ok(out)
    }

    /// As [`BlockClusterTree::multiply`], adding the time spent in each cost centre to
    /// `profiler`.
    pub fn multiply_with_profiling(
        &self,
        v: MatRef<'_, f64>,
        mode: MultiplyMode,
        profiler: &ProfilingContext,
    ) -> Result<Mat<f64>, BctError> {
        let mut out = Mat::<f64>::zeros(self.num_elements(), 3);
        self.multiply_into(v, &mut out, mode, Some(profiler))?;
        Ok(out)
    }

    /// Adds the operator applied to `v` into `out`.
    pub fn multiply_into(
        &self,
        v: MatRef<'_, f64>,
        out: &mut Mat<f64>,
        mode: MultiplyMode,
        profiler: Option<&ProfilingContext>,
    ) -> Result<(), BctError> {
        self.check_shapes(v, out)?;

        timed(profiler, ProfileSection::IllSeparated, || {
            self.accumulate_exact(&self.pairs.inadmissible, v, out)
        });

        match mode {
            MultiplyMode::ExactDecomposition => {
                timed(profiler, ProfileSection::WellSeparated, || {
                    self.accumulate_exact(&self.pairs.admissible, v, out)
                });
            }
            MultiplyMode::MonopoleDirect => {
                timed(profiler, ProfileSection::WellSeparated, || {
                    self.accumulate_monopole(v, out, profiler)
                });
            }
            MultiplyMode::MonopolePropagated => {
                timed(profiler, ProfileSection::WellSeparated, || {
                    self.accumulate_propagated(v, out)
                });
            }
        }

        Ok(())
    }

    /// Adds the exact near-field product of the inadmissible blocks into `out`.
    pub fn multiply_inadmissible(
        &self,
        v: MatRef<'_, f64>,
        out: &mut Mat<f64>,
    ) -> Result<(), BctError> {
        self.check_shapes(v, out)?;
        self.accumulate_exact(&self.pairs.inadmissible, v, out);
        Ok(())
    }

    /// Adds the exact product of the admissible blocks into `out`.
    pub fn multiply_admissible_exact(
        &self,
        v: MatRef<'_, f64>,
        out: &mut Mat<f64>,
    ) -> Result<(), BctError> {
        self.check_shapes(v, out)?;
        self.accumulate_exact(&self.pairs.admissible, v, out);
        Ok(())
    }

    /// Adds the monopole approximation of the admissible blocks into `out`, pair by pair.
    pub fn multiply_admissible(
        &self,
        v: MatRef<'_, f64>,
        out: &mut Mat<f64>,
    ) -> Result<(), BctError> {
        self.check_shapes(v, out)?;
        self.accumulate_monopole(v, out, None);
        Ok(())
    }

    /// Adds the monopole approximation of the admissible blocks into `out` using the
    /// upward/downward passes.
    pub fn multiply_admissible_fast(
        &self,
        v: MatRef<'_, f64>,
        out: &mut Mat<f64>,
    ) -> Result<(), BctError> {
        self.check_shapes(v, out)?;
        self.accumulate_propagated(v, out);
        Ok(())
    }

    /// Applies the raw far-field operator to a single scalar field.
    ///
    /// Resets `scratch`, gathers mass-weighted sums up the hierarchy, adds
    /// `a_IJ * upward(J)` to every admissible row cluster `I`, pushes the accumulated values
    /// down to the leaves and finally scales each entry by its element's mass. The result
    /// holds `m_i * sum_{(I, J) admissible, i in I} a_IJ * sum_{j in J} m_j * values_j`.
    ///
    /// # Errors
    /// Returns [`BctError::FieldShapeMismatch`] if `values` does not have one entry per element.
    pub fn multiply_far_field(
        &self,
        values: &[f64],
        scratch: &mut PropagationScratch,
    ) -> Result<Vec<f64>, BctError> {
        let n = self.num_elements();
        if values.len() != n {
            return Err(BctError::FieldShapeMismatch {
                expected_rows: n,
                found_rows: values.len(),
                found_cols: 1,
            });
        }
        Ok(self.far_field(values, scratch))
    }

    fn far_field(&self, values: &[f64], scratch: &mut PropagationScratch) -> Vec<f64> {
        scratch.reset(self.hierarchy.num_nodes());
        propagation::upward_pass(self.hierarchy, values, scratch);
        propagation::accumulate_far_field(
            &self.pairs.admissible,
            &self.far_field_coefficients,
            scratch,
        );

        let mut result = vec![0.0; values.len()];
        propagation::downward_pass(self.hierarchy, scratch, &mut result);

        for (r, mass) in result.iter_mut().zip(&self.element_masses) {
            *r *= mass;
        }
        result
    }

    fn check_shapes(&self, v: MatRef<'_, f64>, out: &Mat<f64>) -> Result<(), BctError> {
        let n = self.num_elements();
        if v.nrows() != n || v.ncols() != 3 {
            return Err(BctError::FieldShapeMismatch {
                expected_rows: n,
                found_rows: v.nrows(),
                found_cols: v.ncols(),
            });
        }
        if out.nrows() != n || out.ncols() != 3 {
            return Err(BctError::OutputShapeMismatch {
                expected_rows: n,
                expected_cols: 3,
                found_rows: out.nrows(),
                found_cols: out.ncols(),
            });
        }
        Ok(())
    }

    /// Exact product of each block in `pairs`, computed per block in parallel and
    /// accumulated in list order.
    fn accumulate_exact(&self, pairs: &[ClusterPair], v: MatRef<'_, f64>, out: &mut Mat<f64>) {
        let contributions: Vec<RowContributions> = pairs
            .par_iter()
            .map(|pair| self.exact_block_product(pair, v))
            .collect();

        scatter(out, contributions);
    }

    fn exact_block_product(&self, pair: &ClusterPair, v: MatRef<'_, f64>) -> RowContributions {
        let power = self.params.kernel_power();
        let rows = self.hierarchy.cluster_indices(pair.first);
        let cols = self.hierarchy.cluster_indices(pair.second);

        rows.iter()
            .map(|&i| {
                // Row i of the block dotted with the all-ones vector and with v.
                let mut a_times_one = 0.0;
                let mut a_times_v = [0.0; 3];

                for &j in cols {
                    let a_ij = self.exact_entry(i, j, power);
                    a_times_one += a_ij;
                    a_times_v = vector::add(&a_times_v, &vector::scale(&field_row(v, j), a_ij));
                }

                let self_term = vector::scale(&field_row(v, i), a_times_one);
                (i, vector::scale(&vector::sub(&self_term, &a_times_v), 2.0))
            })
            .collect()
    }

    fn accumulate_monopole(
        &self,
        v: MatRef<'_, f64>,
        out: &mut Mat<f64>,
        profiler: Option<&ProfilingContext>,
    ) {
        let contributions: Vec<RowContributions> = self
            .pairs
            .admissible
            .par_iter()
            .zip(self.far_field_coefficients.par_iter())
            .map(|(pair, &a_ij)| self.monopole_block_product(pair, a_ij, v, profiler))
            .collect();

        scatter(out, contributions);
    }

    fn monopole_block_product(
        &self,
        pair: &ClusterPair,
        a_ij: f64,
        v: MatRef<'_, f64>,
        profiler: Option<&ProfilingContext>,
    ) -> RowContributions {
        let (bodies_i, bodies_j) = timed(profiler, ProfileSection::Traversal, || {
            (
                self.hierarchy.cluster_bodies(pair.first),
                self.hierarchy.cluster_bodies(pair.second),
            )
        });

        // a_IJ * w_J^T 1_J
        let a_wf_1 = a_ij * bodies_j.iter().map(|b| b.mass).sum::<f64>();

        // a_IJ * w_J^T v_J
        let a_wf_v = vector::scale(
            &bodies_j.iter().fold([0.0; 3], |acc, b| {
                vector::add(&acc, &vector::scale(&field_row(v, b.index), b.mass))
            }),
            a_ij,
        );

        bodies_i
            .iter()
            .map(|b| {
                let self_term = vector::scale(&field_row(v, b.index), a_wf_1);
                let value = vector::scale(&vector::sub(&self_term, &a_wf_v), 2.0 * b.mass);
                (b.index, value)
            })
            .collect()
    }

    /// Uses `out = 2 (diag(h) v - A_far v)` with `h = A_far 1`, so the row sums cost one
    /// extra scalar application instead of one per coordinate.
    fn accumulate_propagated(&self, v: MatRef<'_, f64>, out: &mut Mat<f64>) {
        let n = self.num_elements();

        // Column 0 is the all-ones field, columns 1..=3 are the coordinates of v.
        let columns: Vec<Vec<f64>> = (0..4usize)
            .into_par_iter()
            .map(|c| {
                let values: Vec<f64> = match c {
                    0 => vec![1.0; n],
                    _ => (0..n).map(|i| *v.get(i, c - 1)).collect(),
                };
                let mut scratch = PropagationScratch::for_hierarchy(self.hierarchy);
                self.far_field(&values, &mut scratch)
            })
            .collect();

        let row_sums = &columns[0];
        for k in 0..3 {
            let far = &columns[k + 1];
            for i in 0..n {
                out[(i, k)] += 2.0 * (row_sums[i] * *v.get(i, k) - far[i]);
            }
        }
    }
}
