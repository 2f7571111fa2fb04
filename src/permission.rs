use crate::errors::AppError;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    pub fn denied_message(&self) -> &'static str {
        match self {
            Access::Read => "Read contacts permission not granted",
            Access::Write => "Write contacts permission not granted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// The platform's contacts permission. `request` may put a consent prompt in
/// front of the user; it never waits for the answer.
pub trait PermissionGate: Send + Sync {
    fn status(&self, access: Access) -> Result<PermissionStatus, AppError>;

    fn request(&self, access: Access) -> Result<(), AppError>;
}

/// Fails with `Permission` unless `access` is already granted. On denial a
/// consent request is fired for next time.
pub fn ensure_access(gate: &dyn PermissionGate, access: Access) -> Result<(), AppError> {
    if gate.status(access)? == PermissionStatus::Granted {
        return Ok(());
    }

    tracing::warn!(?access, "contacts permission missing, requesting consent");
    if let Err(e) = gate.request(access) {
        tracing::error!(error = %e, "could not request contacts permission");
    }
    Err(AppError::Permission(access.denied_message().to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionMode {
    Granted,
    Denied,
    ReadOnly,
}

impl PermissionMode {
    pub fn from(str: &str) -> Result<Self, AppError> {
        match str.to_lowercase().as_str() {
            "granted" => Ok(PermissionMode::Granted),
            "denied" => Ok(PermissionMode::Denied),
            "read-only" | "readonly" => Ok(PermissionMode::ReadOnly),
            _ => Err(AppError::Validation(format!(
                "'{}' is not a recognized permission mode (granted, denied, read-only)",
                str
            ))),
        }
    }
}

/// Fixed answers for hosts without a permission system. Counts consent
/// requests so callers can see a prompt would have been shown.
#[derive(Debug)]
pub struct StaticPermissions {
    mode: PermissionMode,
    requests: AtomicUsize,
}

impl StaticPermissions {
    pub fn new(mode: PermissionMode) -> Self {
        Self {
            mode,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionMode::Granted)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl PermissionGate for StaticPermissions {
    fn status(&self, access: Access) -> Result<PermissionStatus, AppError> {
        let granted = match (self.mode, access) {
            (PermissionMode::Granted, _) => true,
            (PermissionMode::ReadOnly, Access::Read) => true,
            _ => false,
        };
        Ok(if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        })
    }

    fn request(&self, _access: Access) -> Result<(), AppError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_mode_allows_everything() {
        let gate = StaticPermissions::granted();

        assert!(ensure_access(&gate, Access::Read).is_ok());
        assert!(ensure_access(&gate, Access::Write).is_ok());
        assert_eq!(gate.requests(), 0);
    }

    #[test]
    fn read_only_mode_blocks_writes_and_requests_consent() {
        let gate = StaticPermissions::new(PermissionMode::ReadOnly);

        assert!(ensure_access(&gate, Access::Read).is_ok());

        let err = ensure_access(&gate, Access::Write).unwrap_err();
        assert_eq!(err.code(), "PERMISSION_DENIED");
        assert_eq!(err.to_string(), "Write contacts permission not granted");
        assert_eq!(gate.requests(), 1);
    }

    #[test]
    fn parses_permission_modes() -> Result<(), AppError> {
        assert_eq!(PermissionMode::from("Denied")?, PermissionMode::Denied);
        assert_eq!(PermissionMode::from("read-only")?, PermissionMode::ReadOnly);
        assert!(PermissionMode::from("maybe").is_err());
        Ok(())
    }
}
