pub mod adapter;
pub mod channel;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod helper;
pub mod permission;
pub mod platform;
pub mod prelude;
pub mod store;
