//! The multiplexed-wait algorithm and its process-wide service object.

use libc::c_int;
use spin::Once;

use crate::arbiter::{Claim, WaitArbiter};
use crate::events::{Interest, RawEvent};
use crate::fd_set::FdSetOptionExt;
use crate::prelude::*;
use crate::rt::{EdgeChannel, SigSet, UthreadRuntime};
use crate::time::{self, timespec_t, timeval_t};
use crate::tracking::TrackedFds;

/// All the state the emulation needs: the notification channel, the
/// process-wide tracking set and the wait arbiter.
///
/// The process-wide instance behind [`select`] and [`pselect`] is created
/// on the first call to either entry point and never torn down. `new` is
/// public so an embedder (or a test) can also run a private instance.
pub struct SelectService {
    runtime: Arc<dyn UthreadRuntime>,
    channel: Arc<dyn EdgeChannel>,
    tracked: Arc<TrackedFds>,
    arbiter: WaitArbiter,
}

impl SelectService {
    /// Create a service instance on the given runtime.
    ///
    /// The subsystem is unusable without the notification channel, so a
    /// failure to create one is fatal.
    pub fn new(runtime: Arc<dyn UthreadRuntime>) -> Arc<Self> {
        let channel = runtime
            .create_channel(FD_SETSIZE)
            .expect("select failed to create the notification channel");
        let tracked = Arc::new(TrackedFds::new(runtime.new_mutex()));
        let arbiter = WaitArbiter::new(runtime.new_mutex());

        // Closed descriptors only need to leave the tracking set; their
        // channel registration dies with them. The membership probe before
        // the locked removal is slightly racy, but a descriptor added
        // concurrently will be closed later and retired then.
        let cb_tracked = tracked.clone();
        runtime.register_close_cb(Box::new(move |fd| {
            if cb_tracked.is_tracked(fd) {
                cb_tracked.untrack(fd);
            }
        }));

        Arc::new(Self {
            runtime,
            channel,
            tracked,
            arbiter,
        })
    }

    /// Wait for readiness on any descriptor in the three interest sets.
    ///
    /// On success the return value is always `nfds`: every requested
    /// descriptor is reported ready, whether or not it is. Callers must
    /// discover the true state with non-blocking operations after every
    /// return. See the crate-level documentation for why this is the only
    /// sound answer on top of an edge-triggered facility.
    pub fn select(
        &self,
        nfds: c_int,
        readfds: Option<&libc::fd_set>,
        writefds: Option<&libc::fd_set>,
        exceptfds: Option<&libc::fd_set>,
        timeout: Option<&timeval_t>,
    ) -> Result<isize> {
        debug!(
            "select: nfds: {} read: {} write: {} except: {} timeout: {:?}",
            nfds,
            readfds.format(),
            writefds.format(),
            exceptfds.format(),
            timeout,
        );
        if nfds < 0 {
            return_errno!(EINVAL, "nfds must not be negative");
        }

        let mut changed_set = false;
        {
            let mut tracked = self.tracked.lock();
            for fd in 0..nfds as FileDesc {
                if !(readfds.is_set(fd) || writefds.is_set(fd) || exceptfds.is_set(fd)) {
                    continue;
                }
                if tracked.contains(fd) {
                    continue;
                }
                // Descriptors tracked for *any* reason are watched for
                // *all* conditions until they close.
                //
                // On failure the `?` drops the guard before the error
                // reaches the caller: reporting an error may close
                // descriptors, which re-enters the close callback, which
                // takes this same mutex.
                register_with_fallback(self.channel.as_ref(), fd)?;
                tracked.insert(fd);
                changed_set = true;
            }
        }
        // A freshly registered descriptor has unknown edge history: a state
        // change may have happened before the registration. Presume every
        // requested descriptor ready and let the caller probe; the next
        // call can block until there is edge activity.
        if changed_set {
            return Ok(nfds as isize);
        }

        match self.arbiter.try_claim_or_defer(self.runtime.current_uthread()) {
            Claim::Deferred => Ok(nfds as isize),
            Claim::ClaimedForWait(owner_guard) => {
                // Size the buffer for the whole tracking set, not nfds: the
                // set is shared by every select caller in the process.
                let mut events = Vec::new();
                if events.try_reserve_exact(FD_SETSIZE).is_err() {
                    drop(owner_guard);
                    return_errno!(ENOMEM, "cannot allocate the event buffer");
                }
                events.resize(FD_SETSIZE, RawEvent::default());

                // The returned events are discarded: we do not reconstruct
                // which descriptor fired, we just tell the caller that
                // everything it asked about is ready.
                let timeout_ms = time::timeout_to_ms(timeout);
                if let Err(e) = self.channel.wait(&mut events, timeout_ms) {
                    warn!("select: channel wait failed: {}", e);
                }
                drop(owner_guard);
                Ok(nfds as isize)
            }
        }
    }

    /// [`SelectService::select`] with a nanosecond timeout and a transient
    /// signal mask.
    ///
    /// The caller's mask is restored unconditionally, on both success and
    /// error. The substitution is not atomic against asynchronous signal
    /// delivery arriving before the blocking wait; this is a known
    /// limitation of the emulation.
    pub fn pselect(
        &self,
        nfds: c_int,
        readfds: Option<&libc::fd_set>,
        writefds: Option<&libc::fd_set>,
        exceptfds: Option<&libc::fd_set>,
        timeout: Option<&timespec_t>,
        sigmask: Option<&SigSet>,
    ) -> Result<isize> {
        let tv = timeout.copied().map(timeval_t::from);
        let origmask = sigmask.map(|mask| self.runtime.set_sigmask(*mask));
        let ret = self.select(nfds, readfds, writefds, exceptfds, tv.as_ref());
        if let Some(origmask) = origmask {
            self.runtime.set_sigmask(origmask);
        }
        ret
    }
}

/// Subscribe `fd` for every condition, falling back once to the reduced
/// interest set when the descriptor kind only supports readable and
/// hang-up.
fn register_with_fallback(channel: &dyn EdgeChannel, fd: FileDesc) -> Result<()> {
    match channel.register(fd, Interest::ALL) {
        Err(e) if e.errno() == ENOSYS => channel.register(fd, Interest::REDUCED),
        result => result,
    }
}

static RUNTIME: Once<Arc<dyn UthreadRuntime>> = Once::new();
static SERVICE: Once<Arc<SelectService>> = Once::new();

/// Install the runtime the process-wide service will be built on.
///
/// Must be called once, before the first [`select`] or [`pselect`] call.
/// Later calls are ignored.
pub fn install_runtime(runtime: Arc<dyn UthreadRuntime>) {
    RUNTIME.call_once(|| runtime);
}

fn service() -> &'static SelectService {
    SERVICE.call_once(|| {
        let runtime = RUNTIME
            .get()
            .expect("select used before a runtime was installed")
            .clone();
        SelectService::new(runtime)
    })
}

/// Process-wide [`SelectService::select`].
pub fn select(
    nfds: c_int,
    readfds: Option<&libc::fd_set>,
    writefds: Option<&libc::fd_set>,
    exceptfds: Option<&libc::fd_set>,
    timeout: Option<&timeval_t>,
) -> Result<isize> {
    service().select(nfds, readfds, writefds, exceptfds, timeout)
}

/// Process-wide [`SelectService::pselect`].
pub fn pselect(
    nfds: c_int,
    readfds: Option<&libc::fd_set>,
    writefds: Option<&libc::fd_set>,
    exceptfds: Option<&libc::fd_set>,
    timeout: Option<&timespec_t>,
    sigmask: Option<&SigSet>,
) -> Result<isize> {
    service().pselect(nfds, readfds, writefds, exceptfds, timeout, sigmask)
}
