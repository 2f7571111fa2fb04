use super::*;

use crate::domain::{PhoneLabel, PhoneRow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A contact container. Data rows hang off it by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawContact {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRow {
    pub raw_contact_id: u64,
    pub kind: DataKind,
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<PhoneLabel>,
}

/// Containers plus their data rows, the same split a platform contacts
/// database uses. Ids are issued sequentially and never reused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactTables {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub raw_contacts: Vec<RawContact>,
    #[serde(default)]
    pub data: Vec<DataRow>,
}

impl ContactTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phone_rows(&self) -> Vec<RowResult> {
        let mut names: HashMap<u64, &str> = HashMap::new();
        for row in self.data.iter().filter(|row| row.kind == DataKind::Name) {
            names.entry(row.raw_contact_id).or_insert(row.value.as_str());
        }

        self.data
            .iter()
            .filter(|row| row.kind == DataKind::Phone)
            .map(|row| {
                Ok(PhoneRow {
                    contact_id: Some(row.raw_contact_id.to_string()),
                    display_name: names.get(&row.raw_contact_id).map(|name| name.to_string()),
                    number: Some(row.value.clone()),
                })
            })
            .collect()
    }

    pub fn create_container(&mut self) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.raw_contacts.push(RawContact { id });
        id
    }

    pub fn attach(
        &mut self,
        raw_contact_id: u64,
        kind: DataKind,
        value: &str,
        label: Option<PhoneLabel>,
    ) {
        self.data.push(DataRow {
            raw_contact_id,
            kind,
            value: value.to_string(),
            label,
        });
    }

    pub fn insert_contact(&mut self, contact: &NewContact) -> String {
        let id = self.create_container();
        self.attach(id, DataKind::Name, &contact.name, None);
        self.attach(id, DataKind::Phone, &contact.phone, Some(contact.phone_label));
        id.to_string()
    }

    pub fn update_data(&mut self, id: &str, kind: DataKind, value: &str) -> usize {
        let Some(id) = parse_id(id) else {
            return 0;
        };

        let mut updated = 0;
        for row in self
            .data
            .iter_mut()
            .filter(|row| row.raw_contact_id == id && row.kind == kind)
        {
            row.value = value.to_string();
            updated += 1;
        }
        updated
    }

    pub fn delete_contact(&mut self, id: &str) -> usize {
        let Some(id) = parse_id(id) else {
            return 0;
        };

        let before = self.raw_contacts.len();
        self.raw_contacts.retain(|raw| raw.id != id);
        let deleted = before - self.raw_contacts.len();

        if deleted > 0 {
            self.data.retain(|row| row.raw_contact_id != id);
        }
        deleted
    }
}

/// Ids issued here are plain integers; anything else names no contact.
fn parse_id(id: &str) -> Option<u64> {
    id.trim().parse::<u64>().ok()
}

/// Process-local store. Contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemStore {
    pub tables: ContactTables,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            tables: ContactTables::new(),
        }
    }
}

impl ContactsStore for MemStore {
    fn phone_rows(&self) -> Result<Vec<RowResult>, AppError> {
        Ok(self.tables.phone_rows())
    }

    fn insert_contact(&mut self, contact: &NewContact) -> Result<String, AppError> {
        Ok(self.tables.insert_contact(contact))
    }

    fn update_data(&mut self, id: &str, kind: DataKind, value: &str) -> Result<usize, AppError> {
        Ok(self.tables.update_data(id, kind, value))
    }

    fn delete_contact(&mut self, id: &str) -> Result<usize, AppError> {
        Ok(self.tables.delete_contact(id))
    }

    fn medium(&self) -> &str {
        "mem"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contact::aggregate_rows;

    fn new_contact(name: &str, phone: &str) -> NewContact {
        NewContact::mobile(name.to_string(), phone.to_string())
    }

    #[test]
    fn insert_creates_container_name_and_phone() {
        let mut tables = ContactTables::new();

        let id = tables.insert_contact(&new_contact("Ana", "555-0100"));

        assert_eq!(id, "1");
        assert_eq!(tables.raw_contacts, vec![RawContact { id: 1 }]);
        assert_eq!(tables.data.len(), 2);
        assert_eq!(tables.data[1].label, Some(PhoneLabel::Mobile));
        assert_eq!(aggregate_rows(tables.phone_rows())[0].name, "Ana");
    }

    #[test]
    fn extra_phone_rows_share_the_contact_id() {
        let mut tables = ContactTables::new();
        tables.insert_contact(&new_contact("Ana", "555-0100"));
        tables.attach(1, DataKind::Phone, "555-0101", Some(PhoneLabel::Mobile));

        let contacts = aggregate_rows(tables.phone_rows());

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].phones, vec!["555-0100", "555-0101"]);
    }

    #[test]
    fn update_touches_only_its_category() {
        let mut tables = ContactTables::new();
        tables.insert_contact(&new_contact("Ana", "555-0100"));

        assert_eq!(tables.update_data("1", DataKind::Phone, "555-0199"), 1);

        let contacts = aggregate_rows(tables.phone_rows());
        assert_eq!(contacts[0].name, "Ana");
        assert_eq!(contacts[0].phones, vec!["555-0199"]);
    }

    #[test]
    fn unknown_ids_affect_nothing() {
        let mut tables = ContactTables::new();
        tables.insert_contact(&new_contact("Ana", "555-0100"));

        assert_eq!(tables.update_data("42", DataKind::Name, "Zed"), 0);
        assert_eq!(tables.update_data("not-a-number", DataKind::Name, "Zed"), 0);
        assert_eq!(tables.delete_contact("42"), 0);
        assert_eq!(tables.data.len(), 2);
    }

    #[test]
    fn delete_cascades_to_data_rows() {
        let mut tables = ContactTables::new();
        tables.insert_contact(&new_contact("Ana", "555-0100"));
        tables.insert_contact(&new_contact("Bola", "555-0200"));

        assert_eq!(tables.delete_contact("1"), 1);

        assert!(tables.data.iter().all(|row| row.raw_contact_id == 2));
        assert_eq!(tables.phone_rows().len(), 1);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut tables = ContactTables::new();
        tables.insert_contact(&new_contact("Ana", "555-0100"));
        tables.delete_contact("1");

        let id = tables.insert_contact(&new_contact("Bola", "555-0200"));

        assert_eq!(id, "2");
    }

    #[test]
    fn every_phone_row_carries_its_own_contacts_name() {
        let mut tables = ContactTables::new();
        let early = tables.create_container();
        tables.attach(early, DataKind::Phone, "555-0001", Some(PhoneLabel::Mobile));
        for i in 0..500 {
            tables.insert_contact(&new_contact(&format!("User{i}"), &format!("555-{i:04}")));
        }
        tables.attach(early, DataKind::Name, "Late Name", None);

        let rows: Vec<PhoneRow> = tables.phone_rows().into_iter().flatten().collect();

        assert_eq!(rows.len(), 501);
        assert_eq!(rows[0].display_name.as_deref(), Some("Late Name"));
        assert_eq!(rows[1].display_name.as_deref(), Some("User0"));
        assert_eq!(rows[500].display_name.as_deref(), Some("User499"));
    }

    #[test]
    fn container_without_phone_is_not_listed() {
        let mut tables = ContactTables::new();
        let id = tables.create_container();
        tables.attach(id, DataKind::Name, "Orphan", None);

        assert!(tables.phone_rows().is_empty());
    }

    #[test]
    fn mem_store_reports_its_medium() -> Result<(), AppError> {
        let mut store = MemStore::new();
        store.insert_contact(&new_contact("Ana", "555-0100"))?;

        assert_eq!(store.medium(), "mem");
        assert_eq!(store.phone_rows()?.len(), 1);
        Ok(())
    }
}
