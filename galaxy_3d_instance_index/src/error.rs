//! Error types for the instance index
//!
//! Contract violations surface synchronously to the caller of `add` or of a
//! constructor. Duplicate identifiers are not errors: `add` reports them
//! as `Ok(false)`.

use std::fmt;

/// Result type for instance index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Instance index errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Instance rejected by a container (e.g. spatial strategy given an
    /// instance without a bounding volume)
    InvalidInstance(String),

    /// Container or octree configuration rejected at construction
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInstance(msg) => write!(f, "Invalid instance: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an error and return it from the enclosing function.
///
/// # Example
///
/// ```ignore
/// index_bail!("galaxy3d::Octree", InvalidConfig, "max_depth {} too large", depth);
/// ```
#[macro_export]
macro_rules! index_bail {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::index_error!($source, "{}", message);
        return Err($crate::galaxy3d::Error::$variant(message));
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
