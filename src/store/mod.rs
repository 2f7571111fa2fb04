pub mod json;
pub mod memory;

use crate::domain::{DataKind, NewContact, RowResult};
use crate::errors::AppError;

pub use json::JsonStore;
pub use memory::{ContactTables, MemStore};

/// The native contacts database as the adapter sees it. Each platform
/// supplies one implementation; identifiers are whatever the platform uses,
/// carried as opaque strings.
pub trait ContactsStore: Send {
    /// Every phone row with its contact id and display name. The outer error
    /// means the query itself failed; inner errors are rows that could not
    /// be read.
    fn phone_rows(&self) -> Result<Vec<RowResult>, AppError>;

    /// Creates the contact container, then attaches name and phone. Returns
    /// the new contact id.
    fn insert_contact(&mut self, contact: &NewContact) -> Result<String, AppError>;

    /// Rewrites every `kind` row belonging to `id`; returns rows affected.
    fn update_data(&mut self, id: &str, kind: DataKind, value: &str) -> Result<usize, AppError>;

    /// Removes the contact container(s) for `id`, cascading to their data
    /// rows; returns containers removed.
    fn delete_contact(&mut self, id: &str) -> Result<usize, AppError>;

    fn medium(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChoice {
    Mem,
    Json,
}

impl StoreChoice {
    pub fn is_which(&self) -> &str {
        match self {
            StoreChoice::Mem => "mem",
            StoreChoice::Json => "json",
        }
    }

    pub fn from(str: &str) -> Result<Self, AppError> {
        match str.to_lowercase().as_str() {
            "mem" => Ok(StoreChoice::Mem),
            "json" => Ok(StoreChoice::Json),
            _ => Err(AppError::Validation(format!(
                "'{}' is not a recognized storage medium (mem, json)",
                str
            ))),
        }
    }
}
