use crate::errors::AppError;
use std::fs;
use std::path::Path;

pub fn create_file_parent<P: AsRef<Path>>(path: P) -> Result<(), AppError> {
    if let Some(parent) = path.as_ref().parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Reads `key` from the environment, loading `.env` first.
pub fn get_env_value_by_key(key: &str) -> Result<String, AppError> {
    dotenv::dotenv().ok();

    std::env::var(key).map_err(|_| AppError::Validation(format!("{} is not set", key)))
}

/// Splits a `key=value` pair as given on the command line.
pub fn parse_key_value(pair: &str) -> Result<(String, String), String> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", pair)),
    }
}
