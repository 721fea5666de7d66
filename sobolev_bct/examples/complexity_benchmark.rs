/////////////////////////////////////////////////////////////////////////////////////////////
//
// Measures how construction and multiplication time scale with the number of curve elements.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

// Expected: O(N log N) for classification and for the propagated monopole product.

use faer::Mat;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sobolev_bct::{BctParams, BlockClusterTree, MultiplyMode, ProfilingContext};
use sobolev_bct_geometry::{CurveTopology, PolyCurve, SegmentBvh};
use std::time::Instant;

fn generate_helix(n: usize) -> PolyCurve {
    let points = Mat::from_fn(n, 3, |i, j| {
        let t = 20.0 * std::f64::consts::PI * i as f64 / n as f64;
        match j {
            0 => t.cos(),
            1 => t.sin(),
            _ => 0.1 * t,
        }
    });
    PolyCurve::closed(&points)
}

fn generate_field(n: usize, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Mat::from_fn(n, 3, |_, _| rng.random_range(-1.0..1.0))
}

fn run_benchmark(n: usize, seed: u64) -> (f64, f64, f64, usize, usize) {
    let curve = generate_helix(n);
    let field = generate_field(curve.num_elements(), seed);

    let start = Instant::now();
    let bvh = SegmentBvh::new(&curve);
    let tree = match BlockClusterTree::new(&curve, &bvh, BctParams::default()) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("  Failed to build tree: {err}");
            return (0.0, 0.0, 0.0, 0, 0);
        }
    };
    let build = start.elapsed().as_secs_f64();

    let profiling = ProfilingContext::new();
    let mut out = Mat::<f64>::zeros(curve.num_elements(), 3);

    let start = Instant::now();
    if let Err(err) = tree.multiply_into(
        field.as_ref(),
        &mut out,
        MultiplyMode::MonopolePropagated,
        Some(&profiling),
    ) {
        eprintln!("  Multiplication failed: {err}");
    }
    let fast = start.elapsed().as_secs_f64();

    let start = Instant::now();
    if let Err(err) = tree.multiply(field.as_ref(), MultiplyMode::ExactDecomposition) {
        eprintln!("  Multiplication failed: {err}");
    }
    let exact = start.elapsed().as_secs_f64();

    let snapshot = profiling.snapshot();
    println!(
        "  near field {:.3}s, far field {:.3}s, traversal {:.3}s",
        snapshot.ill_separated_nanos as f64 * 1e-9,
        snapshot.well_separated_nanos as f64 * 1e-9,
        snapshot.traversal_nanos as f64 * 1e-9,
    );

    (
        build,
        fast,
        exact,
        tree.admissible_pairs().len(),
        tree.inadmissible_pairs().len(),
    )
}

fn main() {
    println!("=== sobolev_bct Complexity Benchmark ===\n");

    let test_sizes = [1_000, 2_000, 5_000, 10_000, 20_000, 50_000];

    println!("N\tBuild(s)\tFast(s)\tExact(s)\tAdmissible\tInadmissible\tFast/(N*log(N))");
    println!("{}", "-".repeat(100));

    for &n in &test_sizes {
        println!("\nTesting N = {n}:");

        let (build, fast, exact, admissible, inadmissible) = run_benchmark(n, 42);

        let n_f64 = n as f64;
        let per_nlogn = fast / (n_f64 * n_f64.log2()) * 1e6;

        println!(
            "{n}\t{build:.3}\t\t{fast:.3}\t{exact:.3}\t\t{admissible}\t\t{inadmissible}\t\t{per_nlogn:.4}"
        );
    }

    println!("\n=== Analysis ===");
    println!("If Fast/(N*log(N)) stays roughly constant, the fast product is O(N log N).");
    println!("The exact product through the block structure grows as O(N^2).");
}
