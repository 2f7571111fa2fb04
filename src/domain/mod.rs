pub mod contact;
pub mod request;

use crate::errors::AppError;

pub use contact::{ContactRecord, DataKind, NewContact, PhoneLabel, PhoneRow, RowResult};
pub use request::{
    AddContactRequest, DeleteContactRequest, Method, Operation, UpdateContactRequest,
};
