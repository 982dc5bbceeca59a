//! Timeout representations and their unit conversions.
//!
//! `select` consumes a microsecond-resolution `timeval_t`, `pselect` a
//! nanosecond-resolution `timespec_t`, and the notification channel a
//! millisecond count. Conversions always round up so a bounded wait never
//! returns earlier than requested.

use std::time::Duration;

use crate::prelude::*;

#[allow(non_camel_case_types)]
pub type time_t = i64;

#[allow(non_camel_case_types)]
pub type suseconds_t = i64;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub struct timeval_t {
    sec: time_t,
    usec: suseconds_t,
}

impl timeval_t {
    pub fn new(sec: time_t, usec: suseconds_t) -> Result<Self> {
        let time = Self { sec, usec };
        time.validate()?;
        Ok(time)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sec >= 0 && self.usec >= 0 && self.usec < 1_000_000 {
            Ok(())
        } else {
            return_errno!(EINVAL, "invalid value for timeval_t");
        }
    }

    pub fn sec(&self) -> time_t {
        self.sec
    }

    pub fn usec(&self) -> suseconds_t {
        self.usec
    }

    pub fn as_duration(&self) -> Duration {
        Duration::new(self.sec as u64, (self.usec * 1_000) as u32)
    }

    /// The channel's millisecond unit: whole seconds plus microseconds
    /// rounded up.
    pub fn to_channel_ms(&self) -> i32 {
        (self.sec * 1_000 + div_round_up(self.usec, 1_000)) as i32
    }
}

impl From<Duration> for timeval_t {
    fn from(duration: Duration) -> timeval_t {
        let sec = duration.as_secs() as time_t;
        let usec = duration.subsec_micros() as i64;
        debug_assert!(sec >= 0); // usec >= 0 always holds
        timeval_t { sec, usec }
    }
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub struct timespec_t {
    sec: time_t,
    nsec: i64,
}

impl timespec_t {
    pub fn new(sec: time_t, nsec: i64) -> Result<Self> {
        let time = Self { sec, nsec };
        time.validate()?;
        Ok(time)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sec >= 0 && self.nsec >= 0 && self.nsec < 1_000_000_000 {
            Ok(())
        } else {
            return_errno!(EINVAL, "invalid value for timespec_t");
        }
    }

    pub fn sec(&self) -> time_t {
        self.sec
    }

    pub fn nsec(&self) -> i64 {
        self.nsec
    }
}

impl From<Duration> for timespec_t {
    fn from(duration: Duration) -> timespec_t {
        let sec = duration.as_secs() as time_t;
        let nsec = duration.subsec_nanos() as i64;
        debug_assert!(sec >= 0); // nsec >= 0 always holds
        timespec_t { sec, nsec }
    }
}

impl From<timespec_t> for timeval_t {
    fn from(time: timespec_t) -> timeval_t {
        let mut sec = time.sec;
        let mut usec = div_round_up(time.nsec, 1_000);
        if usec == 1_000_000 {
            sec += 1;
            usec = 0;
        }
        timeval_t { sec, usec }
    }
}

/// An absent timeout blocks indefinitely, which the channel spells `-1`.
pub fn timeout_to_ms(timeout: Option<&timeval_t>) -> i32 {
    match timeout {
        None => -1,
        Some(tv) => tv.to_channel_ms(),
    }
}

pub(crate) fn div_round_up(n: i64, d: i64) -> i64 {
    (n + d - 1) / d
}
