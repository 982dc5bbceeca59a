//! Safe accessors for `libc::fd_set`.

use libc::c_int;

use crate::prelude::*;

/// Safe methods for `libc::fd_set`
pub trait FdSetExt {
    fn new_empty() -> Self;
    fn set(&mut self, fd: FileDesc) -> Result<()>;
    fn unset(&mut self, fd: FileDesc) -> Result<()>;
    fn clear(&mut self);
    fn is_set(&self, fd: FileDesc) -> bool;
    fn is_empty(&self) -> bool;
}

impl FdSetExt for libc::fd_set {
    fn new_empty() -> Self {
        unsafe { core::mem::zeroed() }
    }

    fn set(&mut self, fd: FileDesc) -> Result<()> {
        if fd as usize >= FD_SETSIZE {
            return_errno!(EINVAL, "fd exceeds FD_SETSIZE");
        }
        unsafe { libc::FD_SET(fd as c_int, self) };
        Ok(())
    }

    fn unset(&mut self, fd: FileDesc) -> Result<()> {
        if fd as usize >= FD_SETSIZE {
            return_errno!(EINVAL, "fd exceeds FD_SETSIZE");
        }
        unsafe { libc::FD_CLR(fd as c_int, self) };
        Ok(())
    }

    fn clear(&mut self) {
        unsafe {
            libc::FD_ZERO(self);
        }
    }

    fn is_set(&self, fd: FileDesc) -> bool {
        if fd as usize >= FD_SETSIZE {
            return false;
        }
        unsafe { libc::FD_ISSET(fd as c_int, self as *const Self as *mut Self) }
    }

    fn is_empty(&self) -> bool {
        let set = unsafe {
            std::slice::from_raw_parts(self as *const Self as *const u64, FD_SETSIZE / 64)
        };
        set.iter().all(|&x| x == 0)
    }
}

pub(crate) trait FdSetOptionExt {
    fn is_set(&self, fd: FileDesc) -> bool;
    fn format(&self) -> String;
}

impl FdSetOptionExt for Option<&libc::fd_set> {
    fn is_set(&self, fd: FileDesc) -> bool {
        match self {
            Some(inner) => FdSetExt::is_set(*inner, fd),
            None => false,
        }
    }

    fn format(&self) -> String {
        match self {
            Some(inner) => {
                let set = unsafe {
                    std::slice::from_raw_parts(
                        *inner as *const libc::fd_set as *const u64,
                        FD_SETSIZE / 64,
                    )
                };
                format!("{:x?}", set)
            }
            None => "(empty)".to_string(),
        }
    }
}
