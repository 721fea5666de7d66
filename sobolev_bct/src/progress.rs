/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines diagnostic messages, sinks, and helper functions for block cluster tree reporting.
//
// Created on: 19 Oct 2026     Author: Daniel Owen 
//
// Copyright (c) 2026, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Diagnostic event reporting for tree construction and accuracy validation.

use std::fmt::{self, Debug};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

/// Events emitted while building or validating a block cluster tree.
#[derive(Debug, Clone)]
pub enum ProgressMsg {
    /// Pair classification finished.
    PairsClassified {
        admissible: usize,
        inadmissible: usize,
        rounds: usize,
    },

    /// An admissible block whose monopole approximation is poor.
    PoorBlockApproximation {
        first_size: usize,
        second_size: usize,
        error: f64,
        relative_percent: f64,
    },

    /// Aggregate result of an accuracy validation.
    AccuracySummary {
        total_error: f64,
        total_norm: f64,
        relative_percent: f64,
    },
}

impl fmt::Display for ProgressMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressMsg::PairsClassified {
                admissible,
                inadmissible,
                rounds,
            } => write!(
                f,
                "{admissible} admissible and {inadmissible} inadmissible pairs after {rounds} rounds"
            ),
            ProgressMsg::PoorBlockApproximation {
                first_size,
                second_size,
                error,
                relative_percent,
            } => write!(
                f,
                "poor ({first_size}, {second_size}) block: error {error} ({relative_percent} percent)"
            ),
            ProgressMsg::AccuracySummary {
                total_error,
                total_norm,
                relative_percent,
            } => write!(
                f,
                "total error = {total_error} ({relative_percent} percent; total norm = {total_norm})"
            ),
        }
    }
}

/// Sink that consumes progress messages.
pub trait ProgressSink: Send + Sync + Debug {
    fn emit(&self, msg: ProgressMsg);
}

/// Progress sink that forwards messages over a channel.
#[derive(Debug)]
pub struct ClosureSink {
    tx: mpsc::SyncSender<ProgressMsg>,
}

impl ProgressSink for ClosureSink {
    #[inline]
    fn emit(&self, msg: ProgressMsg) {
        let _ = self.tx.try_send(msg);
    }
}

/// Spawns a listener thread that runs a handler closure for each progress message.
///
/// The listener exits once every clone of the returned sink has been dropped.
pub fn closure_sink<F>(
    buffer: usize,
    mut handler: F,
) -> (Arc<dyn ProgressSink>, thread::JoinHandle<()>)
where
    F: FnMut(ProgressMsg) + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel::<ProgressMsg>(buffer.max(1));
    let sink: Arc<dyn ProgressSink> = Arc::new(ClosureSink { tx });

    let handle = thread::spawn(move || {
        while let Ok(msg) = rx.recv() {
            handler(msg);
        }
    });

    (sink, handle)
}

/// Progress sink that keeps every message in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<ProgressMsg>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Removes and returns the messages recorded so far.
    pub fn take(&self) -> Vec<ProgressMsg> {
        match self.messages.lock() {
            Ok(mut messages) => std::mem::take(&mut *messages),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }

    /// Number of recorded poor-block warnings.
    pub fn poor_blocks(&self) -> usize {
        match self.messages.lock() {
            Ok(messages) => count_poor_blocks(&messages),
            Err(poisoned) => count_poor_blocks(&poisoned.into_inner()),
        }
    }
}

fn count_poor_blocks(messages: &[ProgressMsg]) -> usize {
    messages
        .iter()
        .filter(|msg| matches!(msg, ProgressMsg::PoorBlockApproximation { .. }))
        .count()
}

impl ProgressSink for RecordingSink {
    fn emit(&self, msg: ProgressMsg) {
        match self.messages.lock() {
            Ok(mut messages) => messages.push(msg),
            Err(poisoned) => poisoned.into_inner().push(msg),
        }
    }
}

#[inline]
pub(crate) fn emit(sink: &Option<Arc<dyn ProgressSink>>, msg: ProgressMsg) {
    if let Some(sink) = sink {
        sink.emit(msg);
    }
}
