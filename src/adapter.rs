//! The contact operation adapter: one named call in, one native store
//! operation, one normalized response out.

use crate::channel::{MethodCall, MethodResponse, Payload};
use crate::domain::contact::aggregate_rows;
use crate::domain::{
    AddContactRequest, ContactRecord, DeleteContactRequest, Operation, UpdateContactRequest,
};
use crate::errors::AppError;
use crate::permission::{Access, PermissionGate, ensure_access};
use crate::platform;
use crate::store::ContactsStore;
use std::sync::{Arc, Mutex};

/// Owns the store handle and serializes every call through it. The handle
/// comes and goes with the host (`attach` / `detach`); while it is absent
/// store-backed calls fail with `StoreUnavailable`.
pub struct ContactsAdapter {
    store: Mutex<Option<Box<dyn ContactsStore>>>,
    permissions: Arc<dyn PermissionGate>,
}

impl ContactsAdapter {
    /// An adapter with no store attached yet.
    pub fn new(permissions: Arc<dyn PermissionGate>) -> Self {
        Self {
            store: Mutex::new(None),
            permissions,
        }
    }

    pub fn with_store(
        store: Box<dyn ContactsStore>,
        permissions: Arc<dyn PermissionGate>,
    ) -> Self {
        let adapter = Self::new(permissions);
        adapter.attach(store);
        adapter
    }

    pub fn attach(&self, store: Box<dyn ContactsStore>) {
        tracing::debug!(medium = store.medium(), "attaching contacts store");
        match self.store.lock() {
            Ok(mut slot) => *slot = Some(store),
            Err(poisoned) => *poisoned.into_inner() = Some(store),
        }
    }

    pub fn detach(&self) -> Option<Box<dyn ContactsStore>> {
        tracing::debug!("detaching contacts store");
        match self.store.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.store.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Entry point for the method channel.
    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        tracing::debug!(method = %call.method, "handling method call");

        let result =
            Operation::parse(&call.method, &call.arguments).and_then(|op| self.dispatch(op));

        match &result {
            Err(AppError::NotImplemented(_)) => {
                tracing::debug!(method = %call.method, "method not implemented");
            }
            Err(e) => {
                tracing::warn!(method = %call.method, code = e.code(), error = %e, "method call failed");
            }
            Ok(_) => {}
        }
        MethodResponse::from(result)
    }

    pub fn dispatch(&self, operation: Operation) -> Result<Payload, AppError> {
        match operation {
            Operation::List => self.get_contacts().map(Payload::Contacts),
            Operation::Add(request) => self.add_contact(request).map(Payload::Flag),
            Operation::Update(request) => self.update_contact(&request).map(Payload::Flag),
            Operation::Delete(request) => self.delete_contact(&request).map(Payload::Flag),
            Operation::PlatformVersion => Ok(Payload::Text(platform::platform_version())),
        }
    }

    pub fn get_contacts(&self) -> Result<Vec<ContactRecord>, AppError> {
        self.locked_store(Access::Read, |store| {
            let rows = store
                .phone_rows()
                .map_err(|e| store_failure("fetch contacts from device", e))?;
            Ok(aggregate_rows(rows))
        })
    }

    /// Container, name and phone are written in that order. A failure part
    /// way through is reported and whatever was written stays.
    pub fn add_contact(&self, request: AddContactRequest) -> Result<bool, AppError> {
        let contact = request.into_new_contact();
        self.locked_store(Access::Write, |store| {
            let id = store
                .insert_contact(&contact)
                .map_err(|e| store_failure("add contact", e))?;
            tracing::debug!(%id, "contact added");
            Ok(true)
        })
    }

    pub fn update_contact(&self, request: &UpdateContactRequest) -> Result<bool, AppError> {
        self.locked_store(Access::Write, |store| {
            let mut rows_updated = 0;
            for (kind, value) in request.changes() {
                rows_updated += store
                    .update_data(&request.id, kind, value)
                    .map_err(|e| store_failure("update contact", e))?;
            }
            Ok(rows_updated > 0)
        })
    }

    pub fn delete_contact(&self, request: &DeleteContactRequest) -> Result<bool, AppError> {
        self.locked_store(Access::Write, |store| {
            let rows_deleted = store
                .delete_contact(&request.id)
                .map_err(|e| store_failure("delete contact", e))?;
            Ok(rows_deleted > 0)
        })
    }

    fn locked_store<T, F>(&self, access: Access, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut dyn ContactsStore) -> Result<T, AppError>,
    {
        let mut slot = self
            .store
            .lock()
            .map_err(|_| AppError::StoreUnavailable("Contacts store lock poisoned".to_string()))?;

        let store = slot
            .as_mut()
            .ok_or_else(|| AppError::StoreUnavailable("Contacts store is not attached".to_string()))?;

        ensure_access(self.permissions.as_ref(), access)?;

        f(&mut **store)
    }
}

/// Wraps a native failure with the operation it broke. Permission and
/// availability errors pass through with their own codes.
fn store_failure(action: &str, err: AppError) -> AppError {
    tracing::error!(error = %err, "failed to {}", action);
    match err {
        AppError::Permission(_) | AppError::StoreUnavailable(_) => err,
        _ => AppError::StoreOperation(format!("Failed to {}: {}", action, err)),
    }
}
