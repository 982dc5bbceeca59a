pub use std::cmp::{max, min};
pub use std::fmt::{Debug, Display};
pub use std::sync::Arc;

pub use crate::errno::Errno::{self, *};
pub use crate::errno::{Error, ErrorLocation, Result};
pub use crate::{FileDesc, FD_SETSIZE};
