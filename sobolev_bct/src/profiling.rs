/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides explicit timing counters for profiling block cluster tree products.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Timing counters for the three cost centres of a multiply call.
//!
//! A [`ProfilingContext`] is created by the caller and passed into the multiply routines that
//! should be measured. Counters are atomic so a single context may be shared by concurrent
//! calls; they are never read by the multiplication itself.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Cost centres tracked by a [`ProfilingContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSection {
    /// Far-field work on admissible pairs.
    WellSeparated,

    /// Exact work on inadmissible pairs.
    IllSeparated,

    /// Gathering cluster bodies and walking the hierarchy.
    Traversal,
}

#[derive(Debug, Default)]
struct Counter {
    nanos: AtomicU64,
    calls: AtomicU64,
}

impl Counter {
    fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::Relaxed);
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.nanos.store(0, Ordering::Relaxed);
        self.calls.store(0, Ordering::Relaxed);
    }
}

/// Cumulative timings, in nanoseconds, plus the number of timed sections.
#[derive(Debug, Default)]
pub struct ProfilingContext {
    well_separated: Counter,
    ill_separated: Counter,
    traversal: Counter,
}

/// Point-in-time copy of a [`ProfilingContext`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilingSnapshot {
    pub well_separated_nanos: u64,
    pub well_separated_calls: u64,
    pub ill_separated_nanos: u64,
    pub ill_separated_calls: u64,
    pub traversal_nanos: u64,
    pub traversal_calls: u64,
}

impl ProfilingContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, section: ProfileSection) -> &Counter {
        match section {
            ProfileSection::WellSeparated => &self.well_separated,
            ProfileSection::IllSeparated => &self.ill_separated,
            ProfileSection::Traversal => &self.traversal,
        }
    }

    pub fn record(&self, section: ProfileSection, elapsed: Duration) {
        self.counter(section).record(elapsed);
    }

    /// Runs `f`, adding its wall time to `section`.
    pub fn time<T>(&self, section: ProfileSection, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.record(section, start.elapsed());
        result
    }

    pub fn reset(&self) {
        self.well_separated.reset();
        self.ill_separated.reset();
        self.traversal.reset();
    }

    pub fn snapshot(&self) -> ProfilingSnapshot {
        ProfilingSnapshot {
            well_separated_nanos: self.well_separated.nanos.load(Ordering::Relaxed),
            well_separated_calls: self.well_separated.calls.load(Ordering::Relaxed),
            ill_separated_nanos: self.ill_separated.nanos.load(Ordering::Relaxed),
            ill_separated_calls: self.ill_separated.calls.load(Ordering::Relaxed),
            traversal_nanos: self.traversal.nanos.load(Ordering::Relaxed),
            traversal_calls: self.traversal.calls.load(Ordering::Relaxed),
        }
    }
}

/// Times `f` against `profiler` when one is supplied.
#[inline]
pub(crate) fn timed<T>(
    profiler: Option<&ProfilingContext>,
    section: ProfileSection,
    f: impl FnOnce() -> T,
) -> T {
    match profiler {
        Some(p) => p.time(section, f),
        None => f(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use equator::assert;

    #[test]
    fn sections_are_counted_independently() {
        let profiler = ProfilingContext::new();
        profiler.record(ProfileSection::WellSeparated, Duration::from_nanos(10));
        profiler.record(ProfileSection::WellSeparated, Duration::from_nanos(5));
        profiler.record(ProfileSection::Traversal, Duration::from_nanos(7));

        let snap = profiler.snapshot();
        assert!(snap.well_separated_nanos == 15);
        assert!(snap.well_separated_calls == 2);
        assert!(snap.traversal_nanos == 7);
        assert!(snap.ill_separated_calls == 0);
    }

    #[test]
    fn time_returns_closure_value_and_reset_clears() {
        let profiler = ProfilingContext::new();
        let value = profiler.time(ProfileSection::IllSeparated, || 42);
        assert!(value == 42);
        assert!(profiler.snapshot().ill_separated_calls == 1);

        profiler.reset();
        assert!(profiler.snapshot() == ProfilingSnapshot::default());
    }
}
