use super::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One person as handed back to the host: every phone row the store holds
/// for an identifier, folded into a single record.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    pub phones: Vec<String>,
}

impl ContactRecord {
    pub fn new(id: String, name: String) -> Self {
        ContactRecord {
            id,
            name,
            phones: Vec::new(),
        }
    }
}

/// A phone row exactly as a native cursor yields it. Every column may come
/// back null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneRow {
    pub contact_id: Option<String>,
    pub display_name: Option<String>,
    pub number: Option<String>,
}

impl PhoneRow {
    pub fn new(contact_id: &str, display_name: &str, number: &str) -> Self {
        PhoneRow {
            contact_id: Some(contact_id.to_string()),
            display_name: Some(display_name.to_string()),
            number: Some(number.to_string()),
        }
    }

    /// Splits the row into `(id, name, number)`. A row without an id or a
    /// number cannot be attributed to anyone and is rejected.
    pub fn into_parts(self) -> Result<(String, String, String), AppError> {
        let id = self
            .contact_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::StoreOperation("Phone row has no contact id".to_string()))?;

        let number = self.number.ok_or_else(|| {
            AppError::StoreOperation(format!("Phone row for contact {} has no number", id))
        })?;

        Ok((id, self.display_name.unwrap_or_default(), number))
    }
}

/// Store rows may fail individually while the query as a whole succeeds.
pub type RowResult = Result<PhoneRow, AppError>;

/// Data category of a row attached to a contact container.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Name,
    Phone,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Name => "name",
            DataKind::Phone => "phone",
        }
    }
}

/// Label on a stored phone number. Contacts created here are always mobile.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneLabel {
    #[default]
    Mobile,
}

/// Everything needed to create a contact in a native store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    pub phone_label: PhoneLabel,
}

impl NewContact {
    pub fn mobile(name: String, phone: String) -> Self {
        NewContact {
            name,
            phone,
            phone_label: PhoneLabel::Mobile,
        }
    }
}

/// Folds phone rows into one record per contact id.
///
/// Records come out in the order their id was first seen and each record
/// keeps its numbers in row order. Rows that failed to read, or that lack an
/// id or number, are logged and skipped so one bad row never sinks the
/// listing.
pub fn aggregate_rows<I>(rows: I) -> Vec<ContactRecord>
where
    I: IntoIterator<Item = RowResult>,
{
    let mut contacts: Vec<ContactRecord> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let (id, name, number) = match row.and_then(PhoneRow::into_parts) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable contact row");
                continue;
            }
        };

        let position = match positions.get(&id) {
            Some(&position) => position,
            None => {
                contacts.push(ContactRecord::new(id.clone(), name));
                positions.insert(id, contacts.len() - 1);
                contacts.len() - 1
            }
        };

        contacts[position].phones.push(number);
    }

    contacts
}
