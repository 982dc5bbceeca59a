//! The process-wide record of descriptors watched by any `select` caller.

use crate::mutex::{UthMutex, UthMutexGuard};
use crate::prelude::*;
use crate::rt::RawUthreadMutex;

/// The tracking set.
///
/// A descriptor is a member exactly when it has been registered with the
/// notification channel and has not since been closed. Membership tests and
/// conditional inserts happen under one lock acquisition so two callers can
/// never register the same descriptor twice.
pub(crate) struct TrackedFds {
    set: UthMutex<FdBitSet>,
}

impl TrackedFds {
    pub fn new(raw: Box<dyn RawUthreadMutex>) -> Self {
        Self {
            set: UthMutex::new(raw, FdBitSet::default()),
        }
    }

    /// Lock the set for a compound test-and-insert sequence.
    pub fn lock(&self) -> UthMutexGuard<'_, FdBitSet> {
        self.set.lock()
    }

    pub fn is_tracked(&self, fd: FileDesc) -> bool {
        self.lock().contains(fd)
    }

    /// Remove `fd` unconditionally. Idempotent.
    pub fn untrack(&self, fd: FileDesc) {
        self.lock().remove(fd);
    }
}

/// Fixed-capacity bit set over descriptor numbers.
///
/// Descriptors at or above `FD_SETSIZE` are not trackable: tests on them
/// answer `false` and inserts are silently dropped, never an error.
pub(crate) struct FdBitSet {
    words: [u64; FD_SETSIZE / 64],
}

impl Default for FdBitSet {
    fn default() -> Self {
        Self {
            words: [0; FD_SETSIZE / 64],
        }
    }
}

impl FdBitSet {
    pub fn contains(&self, fd: FileDesc) -> bool {
        let fd = fd as usize;
        if fd >= FD_SETSIZE {
            return false;
        }
        self.words[fd / 64] & (1 << (fd % 64)) != 0
    }

    pub fn insert(&mut self, fd: FileDesc) -> bool {
        let fd = fd as usize;
        if fd >= FD_SETSIZE {
            return false;
        }
        let newly_inserted = self.words[fd / 64] & (1 << (fd % 64)) == 0;
        self.words[fd / 64] |= 1 << (fd % 64);
        newly_inserted
    }

    pub fn remove(&mut self, fd: FileDesc) {
        let fd = fd as usize;
        if fd >= FD_SETSIZE {
            return;
        }
        self.words[fd / 64] &= !(1 << (fd % 64));
    }
}
