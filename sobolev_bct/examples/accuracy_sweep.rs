/////////////////////////////////////////////////////////////////////////////////////////////
//
// Sweeps the separation coefficient and reports far-field accuracy against block counts.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sobolev_bct::{BctParams, BlockClusterTree, MultiplyMode};
use sobolev_bct_geometry::{CurveTopology, PolyCurve, SegmentBvh};

fn main() {
    let n = 2_000;
    let points = Mat::from_fn(n, 3, |i, j| {
        let t = 12.0 * std::f64::consts::PI * i as f64 / n as f64;
        match j {
            0 => (1.0 + 0.3 * (5.0 * t).cos()) * t.cos(),
            1 => (1.0 + 0.3 * (5.0 * t).cos()) * t.sin(),
            _ => 0.2 * t,
        }
    });
    let curve = PolyCurve::open(&points);
    let bvh = SegmentBvh::new(&curve);

    let mut rng = StdRng::seed_from_u64(7);
    let field = Mat::from_fn(curve.num_elements(), 3, |_, _| rng.random_range(-1.0..1.0));

    println!("=== sobolev_bct Accuracy Sweep (N = {}) ===\n", curve.num_elements());
    println!("Theta\tAdmissible\tInadmissible\tBlock error(%)\tProduct error(%)");
    println!("{}", "-".repeat(80));

    for theta in [0.05, 0.1, 0.25, 0.5, 1.0] {
        let params = BctParams {
            separation_coeff: theta,
            ..Default::default()
        };

        let tree = match BlockClusterTree::new(&curve, &bvh, params) {
            Ok(tree) => tree,
            Err(err) => {
                eprintln!("{theta}\tfailed: {err}");
                continue;
            }
        };

        let report = tree.compare_blocks();

        let product_error = match (
            tree.multiply(field.as_ref(), MultiplyMode::MonopolePropagated),
            tree.multiply(field.as_ref(), MultiplyMode::ExactDecomposition),
        ) {
            (Ok(fast), Ok(exact)) => {
                let norm = exact.norm_l2();
                if norm > 0.0 {
                    100.0 * (&fast - &exact).norm_l2() / norm
                } else {
                    0.0
                }
            }
            _ => f64::NAN,
        };

        println!(
            "{theta}\t{}\t\t{}\t\t{:.4}\t\t{:.4}",
            tree.admissible_pairs().len(),
            tree.inadmissible_pairs().len(),
            report.relative_percent,
            product_error
        );
    }
}
