//! A data-carrying wrapper over the runtime's raw mutex.
//!
//! The raw lock/unlock pairing the threading library exposes is wrapped
//! into the usual guard discipline so that the data it protects can only be
//! reached while the lock is held. The multiplexed-wait algorithm relies on
//! one unusual property: a guard may be held across the channel's blocking
//! wait, which is how concurrent waiters are serialized.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use crate::rt::RawUthreadMutex;

pub struct UthMutex<T> {
    raw: Box<dyn RawUthreadMutex>,
    value: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for UthMutex<T> {}
unsafe impl<T: Send> Sync for UthMutex<T> {}

impl<T> UthMutex<T> {
    pub fn new(raw: Box<dyn RawUthreadMutex>, value: T) -> Self {
        Self {
            raw,
            value: UnsafeCell::new(value),
        }
    }

    pub fn lock(&self) -> UthMutexGuard<'_, T> {
        self.raw.lock();
        UthMutexGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }
}

pub struct UthMutexGuard<'a, T> {
    lock: &'a UthMutex<T>,
    // The raw mutex must be unlocked by the locking thread.
    _not_send: PhantomData<*const ()>,
}

impl<'a, T> Deref for UthMutexGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.value.get() }
    }
}

impl<'a, T> DerefMut for UthMutexGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<'a, T> Drop for UthMutexGuard<'a, T> {
    fn drop(&mut self) {
        self.lock.raw.unlock();
    }
}
