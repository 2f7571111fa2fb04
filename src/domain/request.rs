use super::*;

use crate::channel::Arguments;
use std::str::FromStr;

/// Method names understood on the `contacts_bridge` channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GetContacts,
    AddContact,
    UpdateContact,
    DeleteContact,
    GetPlatformVersion,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GetContacts => "getContacts",
            Method::AddContact => "addContact",
            Method::UpdateContact => "updateContact",
            Method::DeleteContact => "deleteContact",
            Method::GetPlatformVersion => "getPlatformVersion",
        }
    }
}

impl FromStr for Method {
    type Err = AppError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "getContacts" => Ok(Method::GetContacts),
            "addContact" => Ok(Method::AddContact),
            "updateContact" => Ok(Method::UpdateContact),
            "deleteContact" => Ok(Method::DeleteContact),
            "getPlatformVersion" => Ok(Method::GetPlatformVersion),
            _ => Err(AppError::NotImplemented(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddContactRequest {
    pub name: String,
    pub phone: String,
}

impl AddContactRequest {
    pub fn from_arguments(args: &Arguments) -> Result<Self, AppError> {
        Ok(Self {
            name: args.require("name")?,
            phone: args.require("phone")?,
        })
    }

    pub fn into_new_contact(self) -> NewContact {
        NewContact::mobile(self.name, self.phone)
    }
}

/// Blank `name`/`phone` values are dropped here, so whatever survives is a
/// field the caller actually wants changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateContactRequest {
    pub id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl UpdateContactRequest {
    pub fn from_arguments(args: &Arguments) -> Result<Self, AppError> {
        Ok(Self {
            id: args.require("id")?,
            name: non_blank(args.optional("name")?),
            phone: non_blank(args.optional("phone")?),
        })
    }

    /// Field updates to apply, name before phone.
    pub fn changes(&self) -> Vec<(DataKind, &str)> {
        let mut changes = Vec::with_capacity(2);
        if let Some(name) = &self.name {
            changes.push((DataKind::Name, name.as_str()));
        }
        if let Some(phone) = &self.phone {
            changes.push((DataKind::Phone, phone.as_str()));
        }
        changes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteContactRequest {
    pub id: String,
}

impl DeleteContactRequest {
    pub fn from_arguments(args: &Arguments) -> Result<Self, AppError> {
        Ok(Self {
            id: args.require("id")?,
        })
    }
}

/// A validated call, ready for the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    List,
    Add(AddContactRequest),
    Update(UpdateContactRequest),
    Delete(DeleteContactRequest),
    PlatformVersion,
}

impl Operation {
    /// Resolves the method name and checks its arguments. Unknown names
    /// fail with `NotImplemented` before any argument is looked at.
    pub fn parse(method: &str, args: &Arguments) -> Result<Self, AppError> {
        let operation = match method.parse::<Method>()? {
            Method::GetContacts => Operation::List,
            Method::AddContact => Operation::Add(AddContactRequest::from_arguments(args)?),
            Method::UpdateContact => {
                Operation::Update(UpdateContactRequest::from_arguments(args)?)
            }
            Method::DeleteContact => {
                Operation::Delete(DeleteContactRequest::from_arguments(args)?)
            }
            Method::GetPlatformVersion => Operation::PlatformVersion,
        };
        Ok(operation)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: serde_json::Value) -> Arguments {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let result = Operation::parse("foo", &args(json!({"id": "1"})));

        assert!(matches!(result, Err(AppError::NotImplemented(name)) if name == "foo"));
    }

    #[test]
    fn add_requires_name_and_phone() {
        let missing_phone = Operation::parse("addContact", &args(json!({"name": "Ana"})));
        let missing_name = Operation::parse("addContact", &args(json!({"phone": "555"})));
        let null_name =
            Operation::parse("addContact", &args(json!({"name": null, "phone": "555"})));

        assert_eq!(
            missing_phone.unwrap_err().to_string(),
            "Missing argument: phone"
        );
        assert_eq!(missing_name.unwrap_err().to_string(), "Missing argument: name");
        assert!(matches!(null_name, Err(AppError::Validation(_))));
    }

    #[test]
    fn add_accepts_empty_name() {
        let op = Operation::parse("addContact", &args(json!({"name": "", "phone": "555"})));

        assert_eq!(
            op.unwrap(),
            Operation::Add(AddContactRequest {
                name: String::new(),
                phone: "555".to_string(),
            })
        );
    }

    #[test]
    fn update_drops_blank_fields() {
        let op = Operation::parse(
            "updateContact",
            &args(json!({"id": "4", "name": "   ", "phone": "555-0199"})),
        )
        .unwrap();

        let Operation::Update(request) = op else {
            panic!("expected an update");
        };
        assert_eq!(request.name, None);
        assert_eq!(request.changes(), vec![(DataKind::Phone, "555-0199")]);
    }

    #[test]
    fn update_and_delete_require_id() {
        let update = Operation::parse("updateContact", &args(json!({"name": "Ana"})));
        let delete = Operation::parse("deleteContact", &Arguments::default());

        assert_eq!(update.unwrap_err().to_string(), "Missing argument: id");
        assert_eq!(delete.unwrap_err().to_string(), "Missing argument: id");
    }

    #[test]
    fn non_string_argument_is_rejected() {
        let result = Operation::parse("deleteContact", &args(json!({"id": 12})));

        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid argument: id must be a string"
        );
    }

    #[test]
    fn method_names_round_trip() {
        for method in [
            Method::GetContacts,
            Method::AddContact,
            Method::UpdateContact,
            Method::DeleteContact,
            Method::GetPlatformVersion,
        ] {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
    }
}
