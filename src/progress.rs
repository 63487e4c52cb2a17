//! # Progress Reporting and Cancellation
//!
//! The pipeline typically runs on a worker thread behind a UI or CLI. The
//! only traffic back to the caller is a stream of completion percentages and
//! the terminal result, so the sink trait here is the whole cross-thread
//! surface: the worker never touches caller-owned state directly.
//!
//! Percentages are monotonically non-decreasing and always end with a final
//! `100` once the canvas is fully composed. Observing them never changes the
//! pipeline's result.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

/// Receives completion percentages (0-100) while a conversion runs.
pub trait ProgressSink: Send {
    /// Called with the current completion percentage.
    fn percent(&self, pct: u8);
}

/// Sink that discards every update.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn percent(&self, _pct: u8) {}
}

/// Sink that forwards percentages through a standard mpsc channel.
///
/// This is the intended bridge to a calling thread: the worker sends, the
/// caller drains the receiver in its own execution context. A disconnected
/// receiver is ignored; progress is observational and must never fail the
/// run.
pub struct ChannelSink {
    tx: mpsc::Sender<u8>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<u8>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn percent(&self, pct: u8) {
        let _ = self.tx.send(pct);
    }
}

/// Sink that invokes a closure.
pub struct FnSink<F: Fn(u8) + Send>(F);

impl<F: Fn(u8) + Send> FnSink<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F: Fn(u8) + Send> ProgressSink for FnSink<F> {
    fn percent(&self, pct: u8) {
        (self.0)(pct)
    }
}

/// Cooperative cancellation flag, checked at grid row boundaries.
///
/// Cloneable and cheap to share; cancelling discards the partially built
/// canvas and nothing is ever persisted.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next row boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
