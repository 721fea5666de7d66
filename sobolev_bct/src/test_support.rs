/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides test curves, random fields and a dense reference product for unit tests.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use faer::{Mat, MatRef};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sobolev_bct_geometry::{vector, CurveTopology, PolyCurve};

/// Closed or open helix of `n` vertices with radius 1 climbing `height` over `turns` turns.
pub fn helix(n: usize, turns: f64, height: f64, closed: bool) -> PolyCurve {
    let points = Mat::from_fn(n, 3, |i, j| {
        let t = i as f64 / n as f64;
        let angle = 2.0 * std::f64::consts::PI * turns * t;
        match j {
            0 => angle.cos(),
            1 => angle.sin(),
            _ => height * t,
        }
    });

    if closed {
        PolyCurve::closed(&points)
    } else {
        PolyCurve::open(&points)
    }
}

pub fn random_field(n: usize, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Mat::from_fn(n, 3, |_, _| rng.random_range(-1.0..1.0))
}

pub fn one_hot(n: usize, row: usize) -> Mat<f64> {
    Mat::from_fn(n, 3, |i, j| if i == row && j == 0 { 1.0 } else { 0.0 })
}

/// Applies the full operator with a direct double loop over all element pairs.
pub fn dense_product<C: CurveTopology>(curve: &C, power: f64, v: MatRef<'_, f64>) -> Mat<f64> {
    let n = curve.num_elements();
    let mut out = Mat::<f64>::zeros(n, 3);

    for i in 0..n {
        let mut row_sum = 0.0;
        let mut weighted = [0.0; 3];

        for j in 0..n {
            if curve.are_adjacent(i, j) {
                continue;
            }
            let d = vector::distance(&curve.midpoint(i), &curve.midpoint(j));
            let a = curve.length(i) * curve.length(j) / d.powf(power);
            row_sum += a;
            for k in 0..3 {
                weighted[k] += a * *v.get(j, k);
            }
        }

        for k in 0..3 {
            out[(i, k)] = 2.0 * (row_sum * *v.get(i, k) - weighted[k]);
        }
    }

    out
}

pub fn max_abs(m: &Mat<f64>) -> f64 {
    let mut max = 0.0f64;
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            max = max.max(m[(i, j)].abs());
        }
    }
    max
}

/// Largest entrywise difference, relative to the largest entry of `expected`.
pub fn relative_max_diff(actual: &Mat<f64>, expected: &Mat<f64>) -> f64 {
    assert_eq!(actual.nrows(), expected.nrows());
    assert_eq!(actual.ncols(), expected.ncols());
    let diff = actual - expected;
    max_abs(&diff) / max_abs(expected).max(f64::MIN_POSITIVE)
}
