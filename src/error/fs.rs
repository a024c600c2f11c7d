//! File system errors

use super::AutoconfError;

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> AutoconfError {
    AutoconfError::IoError {
        message: message.into(),
    }
}
