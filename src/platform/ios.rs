// iOS contacts through the Contacts framework.
//
// Typed bindings from `objc2-contacts`. A fresh `CNContactStore` is created
// per call; the framework shares its database connection internally. Rows
// are synthesised one per phone number so the listing aggregates exactly as
// it does on other platforms.

#![cfg(target_os = "ios")]

use block2::RcBlock;
use objc2::msg_send;
use objc2::rc::Retained;
use objc2::runtime::{Bool, ProtocolObject};
use objc2::MainThreadMarker;
use objc2_contacts::{
    CNAuthorizationStatus, CNContact, CNContactFamilyNameKey, CNContactGivenNameKey,
    CNContactIdentifierKey, CNContactPhoneNumbersKey, CNContactStore, CNEntityType, CNErrorCode,
    CNKeyDescriptor, CNLabelPhoneNumberMobile, CNLabeledValue, CNMutableContact, CNPhoneNumber,
    CNSaveRequest,
};
use objc2_foundation::{NSArray, NSError, NSProcessInfo, NSString};
use objc2_ui_kit::UIDevice;

use crate::domain::{DataKind, NewContact, PhoneLabel, PhoneRow, RowResult};
use crate::errors::AppError;
use crate::permission::{Access, PermissionGate, PermissionStatus};
use crate::store::ContactsStore;

type KeyList = NSArray<ProtocolObject<dyn CNKeyDescriptor>>;

fn ns_err(context: &str, err: &NSError) -> AppError {
    AppError::StoreOperation(format!("{}: {}", context, err.localizedDescription()))
}

fn contact_store() -> Retained<CNContactStore> {
    // SAFETY: plain allocation of a framework object.
    unsafe { CNContactStore::new() }
}

fn keys_to_fetch() -> Retained<KeyList> {
    // SAFETY: framework constants are immutable NSStrings.
    let keys: [&'static NSString; 4] = unsafe {
        [
            CNContactIdentifierKey,
            CNContactGivenNameKey,
            CNContactFamilyNameKey,
            CNContactPhoneNumbersKey,
        ]
    };
    let descriptors: Vec<&ProtocolObject<dyn CNKeyDescriptor>> =
        keys.iter().map(|key| ProtocolObject::from_ref(*key)).collect();
    NSArray::from_slice(&descriptors)
}

fn display_name(contact: &CNContact) -> String {
    // SAFETY: both keys are in `keys_to_fetch`.
    let (given, family) = unsafe { (contact.givenName(), contact.familyName()) };
    format!("{} {}", given, family).trim().to_string()
}

fn phone_label(label: PhoneLabel) -> &'static NSString {
    // SAFETY: framework constant.
    unsafe {
        match label {
            PhoneLabel::Mobile => CNLabelPhoneNumberMobile,
        }
    }
}

fn phone_number(value: &str) -> Retained<CNPhoneNumber> {
    // SAFETY: any string is accepted; the framework keeps it verbatim.
    unsafe { CNPhoneNumber::phoneNumberWithStringValue(&NSString::from_str(value)) }
}

/// Fetches a mutable copy of `id`, `None` when no such contact exists.
fn mutable_contact(
    store: &CNContactStore,
    id: &str,
) -> Result<Option<Retained<CNMutableContact>>, AppError> {
    let keys = keys_to_fetch();
    let identifier = NSString::from_str(id);
    // SAFETY: keys are valid CNKeyDescriptors.
    let fetched = unsafe { store.unifiedContactWithIdentifier_keysToFetch_error(&identifier, &keys) };

    match fetched {
        Ok(contact) => {
            // SAFETY: CNContact's mutable copy is a CNMutableContact.
            let copy: Retained<CNMutableContact> = unsafe { msg_send![&*contact, mutableCopy] };
            Ok(Some(copy))
        }
        Err(err) if err.code() == CNErrorCode::RecordDoesNotExist.0 => Ok(None),
        Err(err) => Err(ns_err("Failed to fetch contact", &err)),
    }
}

fn execute(store: &CNContactStore, request: &CNSaveRequest) -> Result<(), AppError> {
    // SAFETY: `request` was filled from contacts of this store.
    unsafe { store.executeSaveRequest_error(request) }
        .map_err(|err| ns_err("Save request failed", &err))
}

/// `CNContactStore`, unified contacts of the default container.
#[derive(Debug, Default)]
pub struct IosContactsStore;

impl IosContactsStore {
    pub fn new() -> Self {
        Self
    }
}

impl ContactsStore for IosContactsStore {
    fn phone_rows(&self) -> Result<Vec<RowResult>, AppError> {
        let store = contact_store();
        let keys = keys_to_fetch();

        // SAFETY: predicate and keys come from the framework's own factories.
        let contacts = unsafe {
            let container = store.defaultContainerIdentifier();
            let predicate = CNContact::predicateForContactsInContainerWithIdentifier(&container);
            store.unifiedContactsMatchingPredicate_keysToFetch_error(&predicate, &keys)
        }
        .map_err(|err| ns_err("Failed to query contacts", &err))?;

        let mut rows = Vec::new();
        for contact in contacts.iter() {
            let name = display_name(&contact);
            // SAFETY: identifier and phone numbers were fetched.
            let (id, numbers) = unsafe { (contact.identifier(), contact.phoneNumbers()) };

            for labeled in numbers.iter() {
                // SAFETY: the payload of a phone entry is a CNPhoneNumber.
                let number = unsafe { labeled.value().stringValue() };
                rows.push(Ok(PhoneRow {
                    contact_id: Some(id.to_string()),
                    display_name: Some(name.clone()),
                    number: Some(number.to_string()),
                }));
            }
        }
        Ok(rows)
    }

    fn insert_contact(&mut self, contact: &NewContact) -> Result<String, AppError> {
        let store = contact_store();
        let number = phone_number(&contact.phone);

        // SAFETY: setters and factories follow the Contacts headers.
        let (created, request) = unsafe {
            let created = CNMutableContact::new();
            created.setGivenName(&NSString::from_str(&contact.name));

            let labeled = CNLabeledValue::<CNPhoneNumber>::labeledValueWithLabel_value(
                Some(phone_label(contact.phone_label)),
                &number,
            );
            created.setPhoneNumbers(&NSArray::from_retained_slice(&[labeled]));

            let request = CNSaveRequest::new();
            // nil container means the default container
            request.addContact_toContainerWithIdentifier(&created, None);
            (created, request)
        };
        execute(&store, &request)?;

        // SAFETY: the identifier is assigned by the save above.
        Ok(unsafe { created.identifier() }.to_string())
    }

    fn update_data(&mut self, id: &str, kind: DataKind, value: &str) -> Result<usize, AppError> {
        let store = contact_store();
        let Some(contact) = mutable_contact(&store, id)? else {
            return Ok(0);
        };

        let updated = match kind {
            DataKind::Name => {
                // SAFETY: CNMutableContact name setters take NSString.
                unsafe {
                    contact.setGivenName(&NSString::from_str(value));
                    contact.setFamilyName(&NSString::from_str(""));
                }
                1
            }
            DataKind::Phone => {
                // SAFETY: phone numbers were fetched with the contact.
                let current = unsafe { contact.phoneNumbers() };
                if current.count() == 0 {
                    return Ok(0);
                }

                let number = phone_number(value);
                let replaced: Vec<Retained<CNLabeledValue<CNPhoneNumber>>> = current
                    .iter()
                    // SAFETY: keeps the label, swaps the payload.
                    .map(|entry| unsafe { entry.labeledValueBySettingValue(&number) })
                    .collect();
                // SAFETY: array of CNLabeledValue<CNPhoneNumber>.
                unsafe { contact.setPhoneNumbers(&NSArray::from_retained_slice(&replaced)) };
                replaced.len()
            }
        };

        // SAFETY: `contact` is a CNMutableContact fetched from this store.
        let request = unsafe {
            let request = CNSaveRequest::new();
            request.updateContact(&contact);
            request
        };
        execute(&store, &request)?;
        Ok(updated)
    }

    fn delete_contact(&mut self, id: &str) -> Result<usize, AppError> {
        let store = contact_store();
        let Some(contact) = mutable_contact(&store, id)? else {
            return Ok(0);
        };

        // SAFETY: `contact` is a CNMutableContact fetched from this store.
        let request = unsafe {
            let request = CNSaveRequest::new();
            request.deleteContact(&contact);
            request
        };
        execute(&store, &request)?;
        Ok(1)
    }

    fn medium(&self) -> &str {
        "ios"
    }
}

/// Contacts authorization. iOS has one grant for reads and writes.
#[derive(Debug, Default)]
pub struct IosPermissions;

impl IosPermissions {
    pub fn new() -> Self {
        Self
    }
}

impl PermissionGate for IosPermissions {
    fn status(&self, _access: Access) -> Result<PermissionStatus, AppError> {
        // SAFETY: class method with no preconditions.
        let status = unsafe { CNContactStore::authorizationStatusForEntityType(CNEntityType::Contacts) };

        Ok(
            if status == CNAuthorizationStatus::Authorized
                || status == CNAuthorizationStatus::Limited
            {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            },
        )
    }

    /// Shows the system prompt while undetermined. Once denied only the
    /// Settings app can change it and the handler reports `false`.
    fn request(&self, _access: Access) -> Result<(), AppError> {
        let handler: RcBlock<dyn Fn(Bool, *mut NSError)> =
            RcBlock::new(|granted: Bool, error: *mut NSError| {
                if granted.as_bool() {
                    tracing::info!("contacts access granted");
                    return;
                }
                // SAFETY: the framework passes nil or a live NSError.
                let reason = unsafe { error.as_ref() }.map(|e| e.localizedDescription().to_string());
                tracing::warn!(?reason, "contacts access not granted");
            });

        let store = contact_store();
        // SAFETY: the block is copied by the framework and outlives this call.
        unsafe { store.requestAccessForEntityType_completionHandler(CNEntityType::Contacts, &handler) };
        Ok(())
    }
}

/// `iOS <UIDevice.systemVersion>`. Off the main thread `UIDevice` is out of
/// reach, so the version comes from `NSProcessInfo` instead.
pub fn platform_version() -> String {
    let version = match MainThreadMarker::new() {
        // SAFETY: `currentDevice` is only touched on the main thread.
        Some(mtm) => unsafe { UIDevice::currentDevice(mtm).systemVersion() }.to_string(),
        None => {
            let v = NSProcessInfo::processInfo().operatingSystemVersion();
            format!("{}.{}.{}", v.majorVersion, v.minorVersion, v.patchVersion)
        }
    };
    format!("iOS {}", version)
}
