//! Request and response contracts of the workflow server.
//!
//! The server has gone through two generations of response shapes. Every
//! response type here accepts both and normalises them:
//!
//! | Endpoint                 | Request                    | Response                                  |
//! |--------------------------|----------------------------|-------------------------------------------|
//! | `/log_sequence_<station>`  | `{key}` or `{sequence}`    | `{sequence, task_data}` or `{status, data}` |
//! | `/complete_task_<station>` | `{employee_sequence}`      | `{status: "ok" \| "success"}` or `{ok, message}` |
//! | `/api/<catalog>`           | GET                        | `[..]` or `{status, data: [..]}`          |
//! | order form action          | order JSON                 | `{status, data}`, `{detail}` or plain text |

pub mod catalog;
pub mod completion;
pub mod sequence;
pub mod submit;

pub use catalog::CatalogKind;
pub use completion::{CompletionEnvelope, CompletionRequest};
pub use sequence::{LogRequest, LogResponse, TaskData};
pub use submit::{ORDER_ACCEPTED_MARKER, SubmitEnvelope};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A scanner station on the production floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Station {
    Gluing,
    Sewing,
}

impl Station {
    pub fn as_str(&self) -> &'static str {
        match self {
            Station::Gluing => "gluing",
            Station::Sewing => "sewing",
        }
    }

    /// Endpoint receiving captured keys or sequences.
    pub fn log_path(&self) -> &'static str {
        match self {
            Station::Gluing => "/log_sequence_gluing",
            Station::Sewing => "/log_sequence_sewing",
        }
    }

    /// Endpoint marking the employee's current task as done.
    pub fn complete_path(&self) -> &'static str {
        match self {
            Station::Gluing => "/complete_task_gluing",
            Station::Sewing => "/complete_task_sewing",
        }
    }

    /// Human-readable station title shown in the terminal header.
    pub fn title(&self) -> &'static str {
        match self {
            Station::Gluing => "Сборка",
            Station::Sewing => "Шитьё",
        }
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Station {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gluing" => Ok(Station::Gluing),
            "sewing" => Ok(Station::Sewing),
            _ => anyhow::bail!("Invalid station '{}'. Valid values: gluing, sewing", s),
        }
    }
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a string-like field. Numbers are accepted because the server
/// echoes numeric employee ids in some error paths.
pub(crate) fn string_field(
    value: Option<Value>,
    field: &'static str,
) -> Result<Option<String>, crate::errors::ProtocolError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(crate::errors::ProtocolError::UnexpectedType {
            field,
            expected: "string",
        }),
    }
}
