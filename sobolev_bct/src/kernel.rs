/////////////////////////////////////////////////////////////////////////////////////////////
//
// Evaluates the fractional pairwise kernel between curve elements and clusters.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use sobolev_bct_geometry::{vector, Point3};

/// Power-law interaction between two point masses, `mass_i * mass_j / dist^power`.
///
/// Coincident positions contribute zero, like the excluded neighbour interactions.
#[inline(always)]
pub fn interaction(
    position_i: &Point3,
    mass_i: f64,
    position_j: &Point3,
    mass_j: f64,
    power: f64,
) -> f64 {
    let d = vector::distance(position_i, position_j);
    if d > 0.0 {
        mass_i * mass_j / d.powf(power)
    } else {
        0.0
    }
}

/// Far-field scalar `a_IJ = 1 / dist(c_I, c_J)^power` between two cluster centres.
///
/// Only called for admissible pairs, whose centres are strictly apart.
#[inline(always)]
pub fn far_field_coefficient(center_i: &Point3, center_j: &Point3, power: f64) -> f64 {
    1.0 / vector::distance(center_i, center_j).powf(power)
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    #[test]
    fn interaction_follows_power_law() {
        let a = interaction(&[0.0, 0.0, 0.0], 2.0, &[4.0, 0.0, 0.0], 3.0, 2.0);
        assert!(a == 6.0 / 16.0);
    }

    #[test]
    fn coincident_points_contribute_nothing() {
        let p = [1.0, 2.0, 3.0];
        assert!(interaction(&p, 1.0, &p, 1.0, 3.0) == 0.0);
    }

    #[test]
    fn far_field_coefficient_is_symmetric() {
        let c1 = [0.0, 1.0, 0.0];
        let c2 = [3.0, -3.0, 0.0];
        assert!(far_field_coefficient(&c1, &c2, 2.0) == 1.0 / 25.0);
        assert!(far_field_coefficient(&c1, &c2, 2.5) == far_field_coefficient(&c2, &c1, 2.5));
    }
}
