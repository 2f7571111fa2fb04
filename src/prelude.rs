pub use crate::adapter::ContactsAdapter;
pub use crate::channel::{self, Arguments, CHANNEL_NAME, MethodCall, MethodResponse, Payload};
pub use crate::cli::{command, run_app};
pub use crate::config::Config;
pub use crate::domain::{
    AddContactRequest, ContactRecord, DataKind, DeleteContactRequest, NewContact, Operation,
    PhoneLabel, PhoneRow, RowResult, UpdateContactRequest, contact::aggregate_rows,
};
pub use crate::errors::AppError;
pub use crate::permission::{
    Access, PermissionGate, PermissionMode, PermissionStatus, StaticPermissions,
};
pub use crate::platform;
pub use crate::store::{ContactTables, ContactsStore, JsonStore, MemStore, StoreChoice};
