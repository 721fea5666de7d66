/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports the curve and hierarchy contracts used across the sobolev_bct crates.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Geometry collaborators for the [`sobolev_bct`] crate
//!
//! The block cluster tree treats the curve and its spatial hierarchy as external, read-only
//! collaborators. This crate declares those contracts ([`CurveTopology`] and
//! [`ClusterHierarchy`]) and provides reference implementations: [`PolyCurve`], a group of
//! open or closed polylines, and [`SegmentBvh`], a median-split bounding volume hierarchy
//! over the curve's segments.
//!
//! [`sobolev_bct`]: https://docs.rs/sobolev_bct
mod bvh;
mod curve;
mod hierarchy;

pub mod vector;

pub use {
    bvh::{Aabb, SegmentBvh},
    curve::{CurveTopology, PolyCurve},
    hierarchy::{ClusterHierarchy, MassPoint, NodeId, ViewspaceBounds},
    vector::Point3,
};
