/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the tree parameters controlling admissibility and the kernel exponents.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares the tree parameters controlling admissibility and the kernel exponents.
use serde::{Deserialize, Serialize};

use crate::error::BctError;

/// Parameters of a [`BlockClusterTree`](crate::BlockClusterTree).
///
/// The interaction between two distinct, non-adjacent curve elements decays as
/// `dist^-(beta - alpha)`. The separation coefficient decides how far apart two clusters must
/// be, relative to their spread, before their interaction is approximated.
///
/// ### Default Values
/// - `separation_coeff`: `0.25`
/// - `alpha`: `2.0`
/// - `beta`: `4.0`
/// - `epsilon`: `0.0`
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
#[serde(default)]
pub struct BctParams {
    /// Admissibility threshold. A pair of clusters is approximated when the larger spread
    /// of the two is strictly less than `separation_coeff` times their centroid distance.
    /// Smaller values are more accurate and more expensive.
    pub separation_coeff: f64,

    /// First kernel exponent.
    pub alpha: f64,

    /// Second kernel exponent.
    pub beta: f64,

    /// Regularisation value. Stored for consumers of the tree, not used by the
    /// multiplication routines.
    pub epsilon: f64,
}

impl Default for BctParams {
    fn default() -> Self {
        BctParams {
            separation_coeff: 0.25,
            alpha: 2.0,
            beta: 4.0,
            epsilon: 0.0,
        }
    }
}

impl BctParams {
    pub fn new(separation_coeff: f64, alpha: f64, beta: f64, epsilon: f64) -> Self {
        Self {
            separation_coeff,
            alpha,
            beta,
            epsilon,
        }
    }

    /// Effective power of the interaction kernel, `beta - alpha`.
    #[inline(always)]
    pub fn kernel_power(&self) -> f64 {
        self.beta - self.alpha
    }

    /// Rejects non-finite values and a negative separation coefficient.
    pub fn validate(&self) -> Result<(), BctError> {
        let checks = [
            ("separation_coeff", self.separation_coeff),
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("epsilon", self.epsilon),
        ];

        for (name, value) in checks {
            if !value.is_finite() {
                return Err(BctError::InvalidParameter { name, value });
            }
        }

        if self.separation_coeff < 0.0 {
            return Err(BctError::InvalidParameter {
                name: "separation_coeff",
                value: self.separation_coeff,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    #[test]
    fn kernel_power_is_beta_minus_alpha() {
        let params = BctParams::new(0.5, 3.0, 6.5, 0.0);
        assert!(params.kernel_power() == 3.5);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let params: BctParams = serde_json::from_str(r#"{ "separation_coeff": 0.1 }"#).unwrap();
        assert!(params.separation_coeff == 0.1);
        assert!(params.alpha == BctParams::default().alpha);
        assert!(params.beta == BctParams::default().beta);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(BctParams::default().validate().is_ok());

        let negative = BctParams::new(-0.1, 2.0, 4.0, 0.0);
        match negative.validate() {
            Err(BctError::InvalidParameter { name, .. }) => assert!(name == "separation_coeff"),
            other => panic!("Expected InvalidParameter error, got {:?}", other),
        }

        let nan_beta = BctParams::new(0.25, 2.0, f64::NAN, 0.0);
        match nan_beta.validate() {
            Err(BctError::InvalidParameter { name, .. }) => assert!(name == "beta"),
            other => panic!("Expected InvalidParameter error, got {:?}", other),
        }
    }
}
