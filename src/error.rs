//! Error types for sierpinski-fill

use thiserror::Error;

/// Recoverable errors raised while building a fill provider.
///
/// The "different density per layer without a 3D structure" configuration is
/// deliberately not represented here: generating from it aborts the process
/// (see [`crate::SierpinskiFillProvider::generate`]).
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Density image could not be loaded
    #[error("File load error: {0}")]
    FileLoad(String),

    /// Global logger could not be installed
    #[error("Logger error: {0}")]
    Logger(String),
}

/// Result type alias for sierpinski-fill operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidParameter("test".to_string());
        assert_eq!(err.to_string(), "Invalid parameter: test");

        let err = Error::FileLoad("density.tga".to_string());
        assert_eq!(err.to_string(), "File load error: density.tga");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
