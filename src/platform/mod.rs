//! Picks the contacts store and permission gate for the target OS.
//!
//! Android and iOS talk to the device address book. Everywhere else the
//! store comes from configuration (in-memory or a JSON file) so the bridge
//! can run on desktops and CI.

#[cfg(target_os = "android")]
pub mod android;

#[cfg(target_os = "ios")]
pub mod ios;

use crate::config::Config;
use crate::errors::AppError;
use crate::permission::PermissionGate;
use crate::store::ContactsStore;
use std::sync::Arc;

#[cfg(not(any(target_os = "android", target_os = "ios")))]
use crate::{
    permission::StaticPermissions,
    store::{JsonStore, MemStore, StoreChoice},
};

pub fn native_store(config: &Config) -> Result<Box<dyn ContactsStore>, AppError> {
    #[cfg(target_os = "android")]
    {
        let _ = config;
        Ok(Box::new(android::AndroidContactsStore::new()))
    }
    #[cfg(target_os = "ios")]
    {
        let _ = config;
        Ok(Box::new(ios::IosContactsStore::new()))
    }
    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    {
        tracing::debug!(store = config.store.is_which(), "using configured contacts store");
        match config.store {
            StoreChoice::Mem => Ok(Box::new(MemStore::new())),
            StoreChoice::Json => Ok(Box::new(JsonStore::new(&config.json_path))),
        }
    }
}

pub fn native_permissions(config: &Config) -> Arc<dyn PermissionGate> {
    #[cfg(target_os = "android")]
    {
        let _ = config;
        Arc::new(android::AndroidPermissions::new())
    }
    #[cfg(target_os = "ios")]
    {
        let _ = config;
        Arc::new(ios::IosPermissions::new())
    }
    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    {
        Arc::new(StaticPermissions::new(config.permission))
    }
}

/// Human-readable OS name and version, e.g. `Android 14` or `iOS 17.4`.
pub fn platform_version() -> String {
    #[cfg(target_os = "android")]
    {
        android::platform_version().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read Android version");
            "Android".to_string()
        })
    }
    #[cfg(target_os = "ios")]
    {
        ios::platform_version()
    }
    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    {
        format!("{} {}", std::env::consts::OS, std::env::consts::ARCH)
    }
}
