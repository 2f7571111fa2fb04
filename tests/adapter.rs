use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use contacts_bridge::prelude::*;

/// Scripted store: counts every call and fails the ones it is told to.
#[derive(Default)]
struct MockStore {
    rows: Vec<(Option<&'static str>, Option<&'static str>, Option<&'static str>)>,
    fail_query: bool,
    fail_insert: bool,
    calls: Arc<AtomicUsize>,
}

impl MockStore {
    fn with_calls(calls: &Arc<AtomicUsize>) -> Self {
        Self {
            calls: Arc::clone(calls),
            ..Self::default()
        }
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl ContactsStore for MockStore {
    fn phone_rows(&self) -> Result<Vec<RowResult>, AppError> {
        self.touch();
        if self.fail_query {
            return Err(AppError::StoreOperation("cursor closed".to_string()));
        }
        Ok(self
            .rows
            .iter()
            .map(|(id, name, number)| {
                Ok(PhoneRow {
                    contact_id: id.map(str::to_string),
                    display_name: name.map(str::to_string),
                    number: number.map(str::to_string),
                })
            })
            .collect())
    }

    fn insert_contact(&mut self, _contact: &NewContact) -> Result<String, AppError> {
        self.touch();
        if self.fail_insert {
            return Err(AppError::StoreOperation("insert rejected".to_string()));
        }
        Ok("1".to_string())
    }

    fn update_data(&mut self, _id: &str, _kind: DataKind, _value: &str) -> Result<usize, AppError> {
        self.touch();
        Ok(1)
    }

    fn delete_contact(&mut self, _id: &str) -> Result<usize, AppError> {
        self.touch();
        Ok(0)
    }

    fn medium(&self) -> &str {
        "mock"
    }
}

fn adapter_for(store: MockStore, gate: Arc<StaticPermissions>) -> ContactsAdapter {
    ContactsAdapter::with_store(Box::new(store), gate)
}

fn expect_error(response: MethodResponse, want_code: &str) -> String {
    match response {
        MethodResponse::Error { code, message } => {
            assert_eq!(code, want_code);
            message
        }
        other => panic!("expected {want_code} error, got {other:?}"),
    }
}

#[test]
fn rows_of_one_contact_are_grouped() {
    let store = MockStore {
        rows: vec![
            (Some("7"), Some("Ana"), Some("555-0100")),
            (Some("9"), Some("Bola"), Some("555-0200")),
            (Some("7"), Some("Ana"), Some("555-0101")),
        ],
        ..MockStore::default()
    };
    let adapter = adapter_for(store, Arc::new(StaticPermissions::granted()));

    let response = adapter.handle(&MethodCall::new("getContacts", Arguments::new()));

    let contacts = match response {
        MethodResponse::Success {
            result: Payload::Contacts(contacts),
        } => contacts,
        other => panic!("expected a contact list, got {other:?}"),
    };
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0].id, "7");
    assert_eq!(contacts[0].phones, vec!["555-0100", "555-0101"]);
    assert_eq!(contacts[1].name, "Bola");
}

#[test]
fn malformed_rows_are_skipped() -> Result<(), AppError> {
    let store = MockStore {
        rows: vec![
            (None, Some("Ghost"), Some("555-0000")),
            (Some("7"), None, Some("555-0100")),
            (Some("8"), Some("Nobody"), None),
        ],
        ..MockStore::default()
    };
    let adapter = adapter_for(store, Arc::new(StaticPermissions::granted()));

    let contacts = adapter.get_contacts()?;

    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].id, "7");
    assert_eq!(contacts[0].name, "");
    Ok(())
}

#[test]
fn failing_query_is_a_store_error() {
    let store = MockStore {
        fail_query: true,
        ..MockStore::default()
    };
    let adapter = adapter_for(store, Arc::new(StaticPermissions::granted()));

    let message = expect_error(
        adapter.handle(&MethodCall::new("getContacts", Arguments::new())),
        "STORE_ERROR",
    );

    assert!(message.starts_with("Failed to fetch contacts from device"));
}

#[test]
fn failing_insert_is_a_store_error() {
    let store = MockStore {
        fail_insert: true,
        ..MockStore::default()
    };
    let adapter = adapter_for(store, Arc::new(StaticPermissions::granted()));
    let args = Arguments::new()
        .with("name", "Ana")
        .with("phone", "555-0100");

    let message = expect_error(
        adapter.handle(&MethodCall::new("addContact", args)),
        "STORE_ERROR",
    );

    assert_eq!(message, "Failed to add contact: insert rejected");
}

#[test]
fn denied_read_never_queries_and_requests_consent_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(StaticPermissions::new(PermissionMode::Denied));
    let adapter = adapter_for(MockStore::with_calls(&calls), Arc::clone(&gate));

    let message = expect_error(
        adapter.handle(&MethodCall::new("getContacts", Arguments::new())),
        "PERMISSION_DENIED",
    );

    assert_eq!(message, "Read contacts permission not granted");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(gate.requests(), 1);
}

#[test]
fn read_only_permission_blocks_writes_only() {
    let calls = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(StaticPermissions::new(PermissionMode::ReadOnly));
    let adapter = adapter_for(MockStore::with_calls(&calls), gate);

    let listed = adapter.handle(&MethodCall::new("getContacts", Arguments::new()));
    let deleted = adapter.handle(&MethodCall::new(
        "deleteContact",
        Arguments::new().with("id", "7"),
    ));

    assert!(listed.is_success());
    assert_eq!(
        expect_error(deleted, "PERMISSION_DENIED"),
        "Write contacts permission not granted"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn invalid_arguments_never_reach_the_store() {
    let calls = Arc::new(AtomicUsize::new(0));
    let adapter = adapter_for(
        MockStore::with_calls(&calls),
        Arc::new(StaticPermissions::granted()),
    );

    let missing_phone = adapter.handle(&MethodCall::new(
        "addContact",
        Arguments::new().with("name", "Ana"),
    ));
    let missing_id = adapter.handle(&MethodCall::new(
        "updateContact",
        Arguments::new().with("name", "Ana"),
    ));
    let delete_without_id = adapter.handle(&MethodCall::new("deleteContact", Arguments::new()));

    assert_eq!(
        expect_error(missing_phone, "INVALID_ARGUMENT"),
        "Missing argument: phone"
    );
    assert_eq!(
        expect_error(missing_id, "INVALID_ARGUMENT"),
        "Missing argument: id"
    );
    assert_eq!(
        expect_error(delete_without_id, "INVALID_ARGUMENT"),
        "Missing argument: id"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn update_with_nothing_to_change_reports_false() {
    let calls = Arc::new(AtomicUsize::new(0));
    let adapter = adapter_for(
        MockStore::with_calls(&calls),
        Arc::new(StaticPermissions::granted()),
    );

    let response = adapter.handle(&MethodCall::new(
        "updateContact",
        Arguments::new().with("id", "7").with("name", "  "),
    ));

    assert_eq!(response, MethodResponse::success(Payload::Flag(false)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn delete_of_unknown_id_reports_false() {
    let adapter = adapter_for(MockStore::default(), Arc::new(StaticPermissions::granted()));

    let response = adapter.handle(&MethodCall::new(
        "deleteContact",
        Arguments::new().with("id", "404"),
    ));

    assert_eq!(response, MethodResponse::success(Payload::Flag(false)));
}

#[test]
fn unknown_method_is_not_implemented() {
    let calls = Arc::new(AtomicUsize::new(0));
    let adapter = adapter_for(
        MockStore::with_calls(&calls),
        Arc::new(StaticPermissions::granted()),
    );

    let response = adapter.handle(&MethodCall::new("shareContact", Arguments::new()));

    assert_eq!(response, MethodResponse::NotImplemented);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn detached_store_is_unavailable_but_version_still_answers() {
    let adapter = adapter_for(MockStore::default(), Arc::new(StaticPermissions::granted()));
    assert!(adapter.detach().is_some());

    let listed = adapter.handle(&MethodCall::new("getContacts", Arguments::new()));
    let version = adapter.handle(&MethodCall::new("getPlatformVersion", Arguments::new()));

    assert_eq!(
        expect_error(listed, "STORE_UNAVAILABLE"),
        "Contacts store is not attached"
    );
    assert!(version.is_success());
}

#[test]
fn reattached_store_serves_again() {
    let adapter = ContactsAdapter::new(Arc::new(StaticPermissions::granted()));
    assert!(!adapter.is_attached());

    adapter.attach(Box::new(MemStore::new()));
    let added = adapter.handle(&MethodCall::new(
        "addContact",
        Arguments::new().with("name", "Ana").with("phone", "555-0100"),
    ));

    assert_eq!(added, MethodResponse::success(Payload::Flag(true)));
    assert!(adapter.is_attached());
}

#[test]
fn name_only_update_keeps_the_phone() -> Result<(), AppError> {
    let adapter = ContactsAdapter::with_store(
        Box::new(MemStore::new()),
        Arc::new(StaticPermissions::granted()),
    );
    adapter.handle(&MethodCall::new(
        "addContact",
        Arguments::new().with("name", "Ana").with("phone", "555-0100"),
    ));

    let renamed = adapter.handle(&MethodCall::new(
        "updateContact",
        Arguments::new().with("id", "1").with("name", "Ana Maria"),
    ));
    let contacts = adapter.get_contacts()?;

    assert_eq!(renamed, MethodResponse::success(Payload::Flag(true)));
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].name, "Ana Maria");
    assert_eq!(contacts[0].phones, vec!["555-0100"]);
    Ok(())
}

#[test]
fn phone_only_update_keeps_the_name() -> Result<(), AppError> {
    let adapter = ContactsAdapter::with_store(
        Box::new(MemStore::new()),
        Arc::new(StaticPermissions::granted()),
    );
    adapter.handle(&MethodCall::new(
        "addContact",
        Arguments::new().with("name", "Ana").with("phone", "555-0100"),
    ));

    adapter.handle(&MethodCall::new(
        "updateContact",
        Arguments::new().with("id", "1").with("phone", "555-0199"),
    ));
    let contacts = adapter.get_contacts()?;

    assert_eq!(contacts[0].name, "Ana");
    assert_eq!(contacts[0].phones, vec!["555-0199"]);
    Ok(())
}
