/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides small fixed-size 3D vector helpers shared by the curve and hierarchy types.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

/// A point or direction in 3D space.
pub type Point3 = [f64; 3];

#[inline(always)]
pub fn add(a: &Point3, b: &Point3) -> Point3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline(always)]
pub fn sub(a: &Point3, b: &Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline(always)]
pub fn scale(a: &Point3, s: f64) -> Point3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline(always)]
pub fn dot(a: &Point3, b: &Point3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline(always)]
pub fn norm(a: &Point3) -> f64 {
    dot(a, a).sqrt()
}

/// Standard euclidean distance
#[inline(always)]
pub fn distance(a: &Point3, b: &Point3) -> f64 {
    norm(&sub(a, b))
}

#[inline(always)]
pub fn midpoint(a: &Point3, b: &Point3) -> Point3 {
    scale(&add(a, b), 0.5)
}
