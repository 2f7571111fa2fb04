use crate::{
    adapter::ContactsAdapter,
    channel::{self, Arguments, CHANNEL_NAME, MethodCall},
    cli::command::{Cli, Commands},
    config::Config,
    domain::{AddContactRequest, ContactRecord, DeleteContactRequest, UpdateContactRequest},
    errors::AppError,
    platform,
};
use clap::Parser;
use std::io;

pub fn run_app() -> Result<(), AppError> {
    let cli = Cli::parse();

    let config = Config::new(&cli.storage_choice, &cli.permission)?;
    let store = platform::native_store(&config)?;
    let adapter = ContactsAdapter::with_store(store, platform::native_permissions(&config));

    match cli.command {
        Commands::List => {
            let contacts = adapter.get_contacts()?;
            if contacts.is_empty() {
                println!("No contact yet");
                return Ok(());
            }

            for (mut i, c) in contacts.iter().enumerate() {
                i += 1;
                println!("{}", display_contact(i, c));
            }
            Ok(())
        }

        Commands::Add { name, phone } => {
            adapter.add_contact(AddContactRequest { name, phone })?;
            println!("Contact added successfully");
            Ok(())
        }

        Commands::Update { id, name, phone } => {
            let request = UpdateContactRequest {
                id,
                name: name.filter(|n| !n.trim().is_empty()),
                phone: phone.filter(|p| !p.trim().is_empty()),
            };

            if request.changes().is_empty() {
                return Err(AppError::Validation(
                    "Nothing to update: provide --name and/or --phone".to_string(),
                ));
            }

            if adapter.update_contact(&request)? {
                println!("Contact updated successfully");
            } else {
                eprintln!("Contact Not found");
            }
            Ok(())
        }

        Commands::Delete { id } => {
            if adapter.delete_contact(&DeleteContactRequest { id })? {
                println!("Contact deleted successfully");
            } else {
                eprintln!("Contact Not found");
            }
            Ok(())
        }

        Commands::Call { method, args } => {
            let call = MethodCall::new(&method, args.into_iter().collect::<Arguments>());
            let response = adapter.handle(&call);
            println!("{}", channel::encode_response(&response)?);
            Ok(())
        }

        Commands::Serve => {
            tracing::info!(channel = CHANNEL_NAME, "serving method calls on stdin");
            let handled = channel::serve(&adapter, io::stdin().lock(), io::stdout().lock())?;
            tracing::info!(handled, "input closed");
            Ok(())
        }

        Commands::Version => {
            println!("{}", platform::platform_version());
            Ok(())
        }
    }
}

pub fn display_contact(index: usize, contact: &ContactRecord) -> String {
    format!(
        "{index:>3}. {:<8} {:<20} {}",
        contact.id,
        contact.name,
        contact.phones.join(", ")
    )
}
