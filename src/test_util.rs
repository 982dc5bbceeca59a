//! Mock collaborators for exercising the concurrency contracts.
//!
//! OS threads stand in for uthreads: the raw mutex is backed by
//! `std::sync::Mutex` + `Condvar`, and the logical-caller identity is
//! whatever a test last installed, so a test can impersonate any number of
//! callers deterministically.

use std::collections::{HashMap, VecDeque};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::events::{Interest, RawEvent};
use crate::prelude::*;
use crate::rt::{CloseCb, EdgeChannel, RawUthreadMutex, SigSet, UthreadId, UthreadRuntime};

/// A raw mutex exposing the lock/unlock pairing the uthread library would.
pub struct StdRawMutex {
    locked: Mutex<bool>,
    cv: Condvar,
}

impl StdRawMutex {
    pub fn new() -> Self {
        Self {
            locked: Mutex::new(false),
            cv: Condvar::new(),
        }
    }
}

impl RawUthreadMutex for StdRawMutex {
    fn lock(&self) {
        let mut locked = self.locked.lock().unwrap();
        while *locked {
            locked = self.cv.wait(locked).unwrap();
        }
        *locked = true;
    }

    fn unlock(&self) {
        let mut locked = self.locked.lock().unwrap();
        *locked = false;
        self.cv.notify_one();
    }
}

#[derive(Default)]
struct ChannelState {
    /// Edge events fired but not yet consumed by a wait.
    pending_edges: usize,
    /// Timeout of every wait that has entered, in order.
    waits: Vec<i32>,
    waiting: usize,
    max_waiting: usize,
}

/// A scriptable edge-triggered channel.
///
/// Registrations are recorded; `fail_register` scripts per-descriptor
/// failures, one per attempt. `wait` blocks until an edge is fired with
/// `fire_edge` or the timeout elapses, like the real facility would.
pub struct MockChannel {
    registered: Mutex<Vec<(FileDesc, Interest)>>,
    fail_scripts: Mutex<HashMap<FileDesc, VecDeque<Errno>>>,
    state: Mutex<ChannelState>,
    cv: Condvar,
}

impl MockChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            registered: Mutex::new(Vec::new()),
            fail_scripts: Mutex::new(HashMap::new()),
            state: Mutex::new(ChannelState::default()),
            cv: Condvar::new(),
        })
    }

    pub fn registered(&self) -> Vec<(FileDesc, Interest)> {
        self.registered.lock().unwrap().clone()
    }

    /// Make the next `register` attempts for `fd` fail with the given
    /// errnos, in order; attempts beyond the script succeed.
    pub fn fail_register(&self, fd: FileDesc, errnos: &[Errno]) {
        self.fail_scripts
            .lock()
            .unwrap()
            .entry(fd)
            .or_default()
            .extend(errnos.iter().copied());
    }

    /// Deliver one edge event, waking a blocked wait (or satisfying the
    /// next one immediately; edges persist until consumed).
    pub fn fire_edge(&self) {
        let mut state = self.state.lock().unwrap();
        state.pending_edges += 1;
        self.cv.notify_all();
    }

    /// The timeouts of every wait entered so far.
    pub fn recorded_waits(&self) -> Vec<i32> {
        self.state.lock().unwrap().waits.clone()
    }

    /// Block until at least `count` waits have entered since creation.
    pub fn wait_until_waits_started(&self, count: usize) {
        let mut state = self.state.lock().unwrap();
        while state.waits.len() < count {
            state = self.cv.wait(state).unwrap();
        }
    }

    /// The largest number of waits that were ever in flight at once.
    pub fn max_concurrent_waiters(&self) -> usize {
        self.state.lock().unwrap().max_waiting
    }
}

impl EdgeChannel for MockChannel {
    fn register(&self, fd: FileDesc, interest: Interest) -> Result<()> {
        if let Some(script) = self.fail_scripts.lock().unwrap().get_mut(&fd) {
            if let Some(errno) = script.pop_front() {
                return Err(errno!(errno, "scripted register failure"));
            }
        }
        self.registered.lock().unwrap().push((fd, interest));
        Ok(())
    }

    fn wait(&self, _events: &mut [RawEvent], timeout_ms: i32) -> Result<usize> {
        let deadline = if timeout_ms >= 0 {
            Some(Instant::now() + Duration::from_millis(timeout_ms as u64))
        } else {
            None
        };

        let mut state = self.state.lock().unwrap();
        state.waits.push(timeout_ms);
        state.waiting += 1;
        state.max_waiting = max(state.max_waiting, state.waiting);
        self.cv.notify_all();

        loop {
            if state.pending_edges > 0 {
                state.pending_edges -= 1;
                state.waiting -= 1;
                return Ok(1);
            }
            match deadline {
                None => {
                    state = self.cv.wait(state).unwrap();
                }
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        state.waiting -= 1;
                        return Ok(0);
                    }
                    let (next, _) = self.cv.wait_timeout(state, deadline - now).unwrap();
                    state = next;
                }
            }
        }
    }
}

/// A scriptable runtime.
pub struct MockRuntime {
    channel: Arc<MockChannel>,
    current: Mutex<UthreadId>,
    close_cbs: Mutex<Vec<CloseCb>>,
    sigmask: Mutex<SigSet>,
    sigmask_history: Mutex<Vec<SigSet>>,
}

impl MockRuntime {
    pub fn with_channel(channel: Arc<MockChannel>) -> Arc<Self> {
        Arc::new(Self {
            channel,
            current: Mutex::new(UthreadId(0)),
            close_cbs: Mutex::new(Vec::new()),
            sigmask: Mutex::new(SigSet::default()),
            sigmask_history: Mutex::new(Vec::new()),
        })
    }

    /// Impersonate a logical caller for subsequent calls.
    pub fn set_current(&self, id: UthreadId) {
        *self.current.lock().unwrap() = id;
    }

    /// Announce a descriptor close to every registered callback.
    pub fn fire_close(&self, fd: FileDesc) {
        for cb in self.close_cbs.lock().unwrap().iter() {
            cb(fd);
        }
    }

    /// Set the mask without recording it as an installation.
    pub fn set_sigmask_raw(&self, mask: SigSet) {
        *self.sigmask.lock().unwrap() = mask;
    }

    pub fn current_sigmask(&self) -> SigSet {
        *self.sigmask.lock().unwrap()
    }

    /// Every mask installed through `set_sigmask`, in order.
    pub fn sigmask_history(&self) -> Vec<SigSet> {
        self.sigmask_history.lock().unwrap().clone()
    }
}

impl UthreadRuntime for MockRuntime {
    fn create_channel(&self, _capacity_hint: usize) -> Result<Arc<dyn EdgeChannel>> {
        Ok(self.channel.clone())
    }

    fn new_mutex(&self) -> Box<dyn RawUthreadMutex> {
        Box::new(StdRawMutex::new())
    }

    fn current_uthread(&self) -> UthreadId {
        *self.current.lock().unwrap()
    }

    fn register_close_cb(&self, cb: CloseCb) {
        self.close_cbs.lock().unwrap().push(cb);
    }

    fn set_sigmask(&self, mask: SigSet) -> SigSet {
        let mut current = self.sigmask.lock().unwrap();
        self.sigmask_history.lock().unwrap().push(mask);
        std::mem::replace(&mut *current, mask)
    }
}
