use super::*;

use crate::helper;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_JSON_PATH: &str = "./.instance/contacts.json";

/// Contact tables kept in a JSON file. Reads load the file; writes load,
/// apply and save, so every call sees what the previous one left behind.
#[derive(Debug)]
pub struct JsonStore {
    pub path: PathBuf,
}

impl JsonStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<ContactTables, AppError> {
        if !fs::exists(&self.path)? {
            return Ok(ContactTables::new());
        }

        let mut file = OpenOptions::new().read(true).open(&self.path)?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;

        // serde_json will give an error if data is empty
        if data.trim().is_empty() {
            return Ok(ContactTables::new());
        }

        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, tables: &ContactTables) -> Result<(), AppError> {
        helper::create_file_parent(&self.path)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;

        let data = serde_json::to_string_pretty(tables)?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// Loads, applies `f` and writes the file back only when `changed`
    /// says the outcome touched something.
    fn mutate<T, F>(&self, f: F, changed: fn(&T) -> bool) -> Result<T, AppError>
    where
        F: FnOnce(&mut ContactTables) -> T,
    {
        let mut tables = self.load()?;
        let outcome = f(&mut tables);
        if changed(&outcome) {
            self.save(&tables)?;
        }
        Ok(outcome)
    }
}

impl ContactsStore for JsonStore {
    fn phone_rows(&self) -> Result<Vec<RowResult>, AppError> {
        Ok(self.load()?.phone_rows())
    }

    fn insert_contact(&mut self, contact: &NewContact) -> Result<String, AppError> {
        self.mutate(|tables| tables.insert_contact(contact), |_| true)
    }

    fn update_data(&mut self, id: &str, kind: DataKind, value: &str) -> Result<usize, AppError> {
        self.mutate(|tables| tables.update_data(id, kind, value), |rows| *rows > 0)
    }

    fn delete_contact(&mut self, id: &str) -> Result<usize, AppError> {
        self.mutate(|tables| tables.delete_contact(id), |rows| *rows > 0)
    }

    fn medium(&self) -> &str {
        "json"
    }
}
