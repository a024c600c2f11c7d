//! Per-component lifecycle errors

use super::AutoconfError;

/// Creates an install failed error
pub fn install_failed(identity: impl Into<String>, reason: impl Into<String>) -> AutoconfError {
    AutoconfError::InstallFailed {
        identity: identity.into(),
        reason: reason.into(),
    }
}

/// Creates an uninstall failed error
pub fn uninstall_failed(identity: impl Into<String>, reason: impl Into<String>) -> AutoconfError {
    AutoconfError::UninstallFailed {
        identity: identity.into(),
        reason: reason.into(),
    }
}

/// Creates a start failed error
pub fn start_failed(identity: impl Into<String>, reason: impl Into<String>) -> AutoconfError {
    AutoconfError::StartFailed {
        identity: identity.into(),
        reason: reason.into(),
    }
}
