/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares the error type returned by block cluster tree operations.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use std::error::Error;
use std::fmt;

/// Errors that can occur when building or applying a block cluster tree.
///
/// Numeric degeneracies (coincident centroids, coincident midpoints) are not reported here;
/// they are resolved by the classifier and kernel as documented on those routines.
#[derive(Debug, Clone, PartialEq)]
pub enum BctError {
    /// A tree parameter is non-finite or out of range.
    InvalidParameter { name: &'static str, value: f64 },

    /// The input field does not have one 3-vector row per curve element.
    FieldShapeMismatch {
        expected_rows: usize,
        found_rows: usize,
        found_cols: usize,
    },

    /// The output buffer does not match the input field's shape.
    OutputShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        found_rows: usize,
        found_cols: usize,
    },
}

impl fmt::Display for BctError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BctError::InvalidParameter { name, value } => {
                write!(f, "invalid block cluster tree parameter {}: {}", name, value)
            }
            BctError::FieldShapeMismatch {
                expected_rows,
                found_rows,
                found_cols,
            } => write!(
                f,
                "input field has shape ({}, {}), expected ({}, 3)",
                found_rows, found_cols, expected_rows
            ),
            BctError::OutputShapeMismatch {
                expected_rows,
                expected_cols,
                found_rows,
                found_cols,
            } => write!(
                f,
                "output buffer has shape ({}, {}), expected ({}, {})",
                found_rows, found_cols, expected_rows, expected_cols
            ),
        }
    }
}

impl Error for BctError {}
