use crate::errors::AppError;
use crate::helper;
use crate::permission::PermissionMode;
use crate::store::{StoreChoice, json::DEFAULT_JSON_PATH};
use std::path::PathBuf;

/// Runtime settings resolved from flags, environment and `.env`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreChoice,
    pub json_path: PathBuf,
    pub permission: PermissionMode,
}

impl Config {
    /// `store` and `permission` arrive as the raw flag values; the JSON
    /// store location comes from `JSON_STORAGE_PATH`.
    pub fn new(store: &str, permission: &str) -> Result<Self, AppError> {
        Ok(Self {
            store: StoreChoice::from(store)?,
            json_path: helper::get_env_value_by_key("JSON_STORAGE_PATH")
                .unwrap_or_else(|_| DEFAULT_JSON_PATH.to_string())
                .into(),
            permission: PermissionMode::from(permission)?,
        })
    }
}
