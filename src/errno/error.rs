use core::fmt;

use super::Errno;

#[derive(Debug)]
pub struct Error {
    inner: (Errno, &'static str),
    location: Option<ErrorLocation>,
}

#[derive(Debug, Clone, Copy)]
pub struct ErrorLocation {
    line: u32,
    file: &'static str,
}

impl Error {
    pub fn embedded(inner: (Errno, &'static str), location: Option<ErrorLocation>) -> Error {
        Error { inner, location }
    }

    pub fn errno(&self) -> Errno {
        self.inner.0
    }
}

impl ErrorLocation {
    pub fn new(file: &'static str, line: u32) -> ErrorLocation {
        ErrorLocation { file, line }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.inner.0, self.inner.1)?;
        if let Some(location) = self.location {
            write!(f, " {}", location)?;
        }
        Ok(())
    }
}

impl fmt::Display for ErrorLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[line = {}, file = {}]", self.line, self.file)
    }
}

impl std::error::Error for Error {}
