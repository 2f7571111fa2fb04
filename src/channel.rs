//! Wire shapes for the `contacts_bridge` method channel, plus a line based
//! JSON codec so the adapter can be driven across a process boundary.

use crate::adapter::ContactsAdapter;
use crate::domain::ContactRecord;
use crate::errors::AppError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::io::{BufRead, Write};

pub const CHANNEL_NAME: &str = "contacts_bridge";

/// Loosely typed argument bag as the host sends it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// A string value, `None` when absent or null.
    pub fn optional(&self, key: &str) -> Result<Option<String>, AppError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(AppError::Validation(format!(
                "Invalid argument: {} must be a string",
                key
            ))),
        }
    }

    pub fn require(&self, key: &str) -> Result<String, AppError> {
        self.optional(key)?
            .ok_or_else(|| AppError::missing_argument(key))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Arguments {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Arguments(
            iter.into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,

    #[serde(default, deserialize_with = "deserialize_arguments")]
    pub arguments: Arguments,
}

impl MethodCall {
    pub fn new(method: &str, arguments: Arguments) -> Self {
        MethodCall {
            method: method.to_string(),
            arguments,
        }
    }
}

fn deserialize_arguments<'de, D>(deserializer: D) -> Result<Arguments, D::Error>
where
    D: Deserializer<'de>,
{
    let args = Option::<Arguments>::deserialize(deserializer)?;
    Ok(args.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Contacts(Vec<ContactRecord>),
    Flag(bool),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success { result: Payload },
    Error { code: String, message: String },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(result: Payload) -> Self {
        MethodResponse::Success { result }
    }

    pub fn error(err: &AppError) -> Self {
        MethodResponse::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }
}

impl From<Result<Payload, AppError>> for MethodResponse {
    fn from(result: Result<Payload, AppError>) -> Self {
        match result {
            Ok(payload) => MethodResponse::success(payload),
            Err(AppError::NotImplemented(_)) => MethodResponse::NotImplemented,
            Err(e) => MethodResponse::error(&e),
        }
    }
}

pub fn decode_call(line: &str) -> Result<MethodCall, AppError> {
    serde_json::from_str(line)
        .map_err(|e| AppError::Validation(format!("Malformed method call: {}", e)))
}

pub fn encode_response(response: &MethodResponse) -> Result<String, AppError> {
    Ok(serde_json::to_string(response)?)
}

/// Answers one request per input line until EOF, returning how many calls
/// were handled. Blank lines are ignored; undecodable lines get an error
/// response and the loop carries on.
pub fn serve<R, W>(adapter: &ContactsAdapter, input: R, mut output: W) -> Result<usize, AppError>
where
    R: BufRead,
    W: Write,
{
    let mut handled = 0;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match decode_call(&line) {
            Ok(call) => adapter.handle(&call),
            Err(e) => {
                tracing::warn!(error = %e, "rejecting undecodable request line");
                MethodResponse::error(&e)
            }
        };

        writeln!(output, "{}", encode_response(&response)?)?;
        output.flush()?;
        handled += 1;
    }

    Ok(handled)
}
