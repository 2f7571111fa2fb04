use crate::helper::parse_key_value;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "contacts-bridge",
    version,
    about = "Bridge to the device address book"
)]
pub struct Cli {
    /// Storage choice off-device (mem, json)
    #[arg(long = "store", env = "STORAGE_CHOICE", default_value_t = String::from("json"), global = true)]
    pub storage_choice: String,

    /// Contacts permission to assume off-device (granted, denied, read-only)
    #[arg(long, env = "CONTACTS_PERMISSION", default_value_t = String::from("granted"), global = true)]
    pub permission: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommand and their flags
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List contacts with at least one phone number
    List,

    /// Add a new contact with a mobile number
    Add {
        /// Contact name
        #[arg(long)]
        name: String,

        /// Contact phone number
        #[arg(long)]
        phone: String,
    },

    /// Change the name and/or phone of an existing contact
    Update {
        /// Contact id as shown by `list`
        #[arg(long)]
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// Delete a contact by id
    Delete {
        /// Contact id as shown by `list`
        #[arg(long)]
        id: String,
    },

    /// Invoke a channel method by name and print the JSON response
    Call {
        /// Method name, e.g. getContacts
        method: String,

        /// Method argument as key=value, repeatable
        #[arg(long = "arg", value_parser = parse_key_value)]
        args: Vec<(String, String)>,
    },

    /// Answer JSON method calls read line by line from stdin
    Serve,

    /// Print the host platform version
    Version,
}
