//! Refresh barrier errors

use std::time::Duration;

use super::AutoconfError;

/// Creates a refresh timeout error
pub fn timeout(waited: Duration) -> AutoconfError {
    AutoconfError::RefreshTimeout {
        seconds: waited.as_secs(),
    }
}

/// Creates a refresh failed error
pub fn failed(reason: impl Into<String>) -> AutoconfError {
    AutoconfError::RefreshFailed {
        reason: reason.into(),
    }
}
