//! Archive directory listing errors

use super::AutoconfError;

/// Creates a scan failed error
pub fn failed(path: impl Into<String>, reason: impl Into<String>) -> AutoconfError {
    AutoconfError::ScanFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
