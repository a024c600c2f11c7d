//! Host runtime errors

use super::AutoconfError;

/// Creates a runtime unavailable error
pub fn unavailable(reason: impl Into<String>) -> AutoconfError {
    AutoconfError::RuntimeUnavailable {
        reason: reason.into(),
    }
}

/// Creates a component table read failed error
pub fn state_read_failed(path: impl Into<String>, reason: impl Into<String>) -> AutoconfError {
    AutoconfError::StateReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a component table write failed error
pub fn state_write_failed(path: impl Into<String>, reason: impl Into<String>) -> AutoconfError {
    AutoconfError::StateWriteFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
