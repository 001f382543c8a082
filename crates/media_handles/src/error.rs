//! Error types shared by every handle wrapper

use thiserror::Error;

/// Handle creation errors
///
/// A native "create" call returned its sentinel value. The description names
/// the operation that failed; the native library's own last-error channel
/// carries the details.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleError {
    /// The native constructor returned the sentinel value
    #[error("{0}")]
    CreationFailed(&'static str),
}

impl HandleError {
    /// Description of the operation that failed
    pub fn description(&self) -> &'static str {
        match self {
            Self::CreationFailed(description) => description,
        }
    }
}

/// Result alias for handle creation
pub type HandleResult<T> = Result<T, HandleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_description() {
        let err = HandleError::CreationFailed("Making window failed");
        assert_eq!(err.to_string(), "Making window failed");
        assert_eq!(err.description(), "Making window failed");
    }
}
