//! Collaborator interfaces consumed by the multiplexed-wait subsystem.
//!
//! The subsystem does not own an event loop, a scheduler or a file table.
//! It is embedded in a runtime that provides three things: an
//! edge-triggered readiness-notification channel, mutexes that suspend only
//! the calling user-level thread, and a notification point that fires
//! whenever any descriptor is closed.

use crate::events::{Interest, RawEvent};
use crate::prelude::*;

/// Identity of the currently running logical thread.
///
/// Comparable only. Holding an id never keeps the thread it names alive,
/// and an id may be compared long after its thread has exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UthreadId(pub usize);

/// A signal mask, one bit per signal number.
#[repr(transparent)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SigSet {
    bits: u64,
}

impl SigSet {
    pub fn new(bits: u64) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }
}

/// Callback invoked whenever any descriptor is closed, for any descriptor
/// number, whether or not this subsystem is tracking it.
pub type CloseCb = Box<dyn Fn(FileDesc) + Send + Sync>;

/// The edge-triggered readiness-notification facility.
///
/// A registration lives until the descriptor itself is closed; closing
/// implicitly drops it, so there is no deregistration method.
pub trait EdgeChannel: Send + Sync {
    /// Subscribe `fd` for edge notifications on the given conditions.
    ///
    /// Fails with `ENOSYS` when this descriptor kind cannot be watched for
    /// the requested combination of conditions.
    fn register(&self, fd: FileDesc, interest: Interest) -> Result<()>;

    /// Block the calling logical thread until an edge event arrives or
    /// `timeout_ms` elapses; `timeout_ms < 0` blocks indefinitely.
    ///
    /// Returns the number of entries written into `events`. Callers of this
    /// crate never see the entries; see the crate-level documentation.
    fn wait(&self, events: &mut [RawEvent], timeout_ms: i32) -> Result<usize>;
}

/// A mutex from the user-level threading library.
///
/// `lock` suspends only the calling logical thread, never the kernel
/// context it is multiplexed onto. A thread that locked the mutex must be
/// the one to unlock it.
pub trait RawUthreadMutex: Send + Sync {
    fn lock(&self);
    fn unlock(&self);
}

/// The surrounding runtime, supplied once by the embedder.
pub trait UthreadRuntime: Send + Sync {
    /// Create the process-wide notification channel.
    ///
    /// Called exactly once; `capacity_hint` is the number of descriptors
    /// the channel should expect to watch.
    fn create_channel(&self, capacity_hint: usize) -> Result<Arc<dyn EdgeChannel>>;

    /// Allocate a mutex whose `lock` suspends only the calling uthread.
    fn new_mutex(&self) -> Box<dyn RawUthreadMutex>;

    /// Identity of the currently running uthread.
    fn current_uthread(&self) -> UthreadId;

    /// Register a callback to run whenever any descriptor is closed.
    fn register_close_cb(&self, cb: CloseCb);

    /// Replace the caller's signal mask, returning the previous one.
    fn set_sigmask(&self, mask: SigSet) -> SigSet;
}
