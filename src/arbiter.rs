//! Arbitration of the single blocking-wait slot.
//!
//! The tracking set is shared by every `select` caller in the process, so
//! one caller's channel wait could consume the edge events another caller
//! is relying on. We do not know when the other caller last waited, so once
//! ownership of the wait slot changes hands, the only safe assumption is
//! that the pending events are gone and the new caller must be told to
//! re-probe instead of blocking. An owner identity records which logical
//! thread waited most recently; the mutex guarding it doubles as the queue
//! that keeps extra would-be waiters asleep.

use crate::mutex::{UthMutex, UthMutexGuard};
use crate::rt::{RawUthreadMutex, UthreadId};

pub(crate) struct WaitArbiter {
    owner: UthMutex<Option<UthreadId>>,
}

/// Outcome of consulting the arbiter.
pub(crate) enum Claim<'a> {
    /// Ownership just moved to this caller. Any pending edge event may
    /// already have been consumed by the previous owner's wait, so the
    /// caller must optimistically report readiness instead of blocking.
    Deferred,
    /// This caller was already the owner and may block. The guard must be
    /// held across the channel wait and dropped only after it returns; that
    /// is what queues other claimants instead of letting them issue
    /// concurrent waits.
    ClaimedForWait(UthMutexGuard<'a, Option<UthreadId>>),
}

impl WaitArbiter {
    pub fn new(raw: Box<dyn RawUthreadMutex>) -> Self {
        Self {
            owner: UthMutex::new(raw, None),
        }
    }

    pub fn try_claim_or_defer(&self, current: UthreadId) -> Claim<'_> {
        let mut owner = self.owner.lock();
        if *owner != Some(current) {
            // Could thrash if two uthreads keep fighting over ownership.
            *owner = Some(current);
            return Claim::Deferred;
        }
        Claim::ClaimedForWait(owner)
    }
}
