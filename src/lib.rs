//! Level-triggered `select`/`pselect` emulation for user-level threads.
//!
//! This crate implements the POSIX multiplexed-wait calls on top of a host
//! whose only readiness-notification primitive is edge-triggered: the host
//! reports that a descriptor *becomes* readable, not that it *is* readable.
//! The emulation is deliberately spurious and only works with applications
//! that use non-blocking I/O.
//!
//! When a descriptor is mentioned in a `select` call for the first time, it
//! is registered with the notification channel and the call immediately
//! reports the descriptor as ready for whatever was asked. This is usually
//! not true; the application must probe all of its descriptors once with
//! non-blocking operations after the call returns. Later `select` calls find
//! the descriptor already tracked, so any edge event that arrived after the
//! probe wakes them up (or keeps them from blocking in the first place).
//!
//! One tracking set is kept per process. It records every descriptor watched
//! by *any* caller, and regardless of whether the caller asked for read,
//! write or exceptional conditions, the descriptor is watched for all of
//! them until it closes. This trades spurious wakeups for simplicity.
//!
//! Because the tracking set is process-wide, one caller's blocking wait
//! could consume the edge events another caller is relying on. Only one
//! logical thread is therefore allowed inside the channel wait at a time;
//! the others either return optimistically or queue on a mutex. See
//! [`SelectService`] for the arbitration protocol.
//!
//! The surrounding runtime (the user-level threading library, the
//! notification facility and the descriptor-close notification point) is
//! consumed through the traits in [`rt`].

#[macro_use]
extern crate log;

#[macro_use]
pub mod errno;
pub mod prelude;

mod arbiter;
mod mutex;
mod select;
mod tracking;

pub mod events;
pub mod fd_set;
pub mod rt;
pub mod time;

pub use self::errno::{Errno, Error, ErrorLocation, Result};
pub use self::events::{Interest, RawEvent};
pub use self::fd_set::FdSetExt;
pub use self::mutex::{UthMutex, UthMutexGuard};
pub use self::rt::{CloseCb, EdgeChannel, RawUthreadMutex, SigSet, UthreadId, UthreadRuntime};
pub use self::select::{install_runtime, pselect, select, SelectService};
pub use self::time::{timespec_t, timeval_t};

/// A descriptor number as seen by the I/O subsystem.
pub type FileDesc = u32;

/// The largest descriptor number (exclusive) the subsystem can track.
pub const FD_SETSIZE: usize = libc::FD_SETSIZE;

#[cfg(test)]
pub(crate) mod test_util;
