/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines progress reporting messages, sinks, and helper functions for long-running loops.
//
// Created on: 15 Nov 2025
//
// Copyright (c) 2025, the mincurv contributors. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Progress reporting primitives for long-running computations.

use std::fmt::Debug;
use std::sync::{Arc, mpsc};
use std::thread;

/// Progress events emitted while gridding.
#[derive(Debug, Clone)]
pub enum ProgressMsg {
    /// Iteration status of the Krylov solver for one value channel of the spline weights.
    SolverIteration {
        channel: usize,
        iter: usize,
        residual: f64,
        progress: f64,
    },

    /// Iteration status of the relaxation loop.
    RelaxationIteration {
        iter: usize,
        max_iterations: usize,
        residual: f64,
    },

    /// Arbitrary informational message.
    Message { message: String },
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
/// The thread exits once every clone of the returned sink has been dropped.
/// Messages are discarded rather than blocking the solver when the buffer is full.
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

/// Calculates the fraction of solver progress from the current residual,
/// the starting residual and the requested tolerance, on a log scale.
/// Returns a value in `[0, 1]`.
#[inline]
pub(crate) fn progress_from_rel(current_res: f64, start_res: f64, target_res: f64) -> f64 {
    if current_res <= target_res {
        1.0
    } else if start_res <= target_res || !current_res.is_finite() {
        0.0
    } else {
        let done = (start_res.log10() - current_res.log10())
            / (start_res.log10() - target_res.log10());
        done.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn progress_is_clamped_to_unit_interval() {
        assert_eq!(progress_from_rel(1e-7, 1.0, 1e-6), 1.0);
        assert_eq!(progress_from_rel(10.0, 1.0, 1e-6), 0.0);
        let half = progress_from_rel(1e-3, 1.0, 1e-6);
        assert!((half - 0.5).abs() < 1e-12);
        assert_eq!(progress_from_rel(f64::NAN, 1.0, 1e-6), 0.0);
    }

    #[test]
    fn closure_sink_delivers_messages_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_handler = Arc::clone(&seen);
        let (sink, handle) = closure_sink(16, move |msg| {
            if let ProgressMsg::RelaxationIteration { iter, .. } = msg {
                seen_in_handler.lock().unwrap().push(iter);
            }
        });

        for iter in 1..=3 {
            sink.emit(ProgressMsg::RelaxationIteration {
                iter,
                max_iterations: 3,
                residual: 0.5,
            });
        }
        drop(sink);
        handle.join().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }
}
