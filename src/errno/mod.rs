//! Errno-centric error handling.
//!
//! Every error carries a POSIX errno, a static message and the source
//! location that raised it. Errors are raised with the `errno!` and
//! `return_errno!` macros so that the location is captured automatically.

mod errno;
mod error;
#[macro_use]
mod macros;

pub use self::errno::Errno;
pub use self::error::{Error, ErrorLocation};

pub type Result<T> = core::result::Result<T, Error>;
