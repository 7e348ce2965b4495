use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{json_kind, string_field};
use crate::errors::ProtocolError;

/// Body of a `/log_sequence_<station>` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogRequest {
    /// Per-key variant: one request per keystroke of the capture.
    Key { key: String },
    /// Whole-sequence variant: one request per finished capture.
    Sequence { sequence: String },
}

impl LogRequest {
    pub fn key(key: impl Into<String>) -> Self {
        LogRequest::Key { key: key.into() }
    }

    pub fn sequence(sequence: impl Into<String>) -> Self {
        LogRequest::Sequence {
            sequence: sequence.into(),
        }
    }
}

/// Task payload returned for an identified employee.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskData {
    /// Server-side domain error shown instead of the task.
    Error(String),
    /// Field name to display value, in server order.
    Fields(Vec<(String, Value)>),
}

impl TaskData {
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let found = json_kind(&value);
        let Value::Object(mut map) = value else {
            return Err(ProtocolError::NotAnObject { found });
        };
        if let Some(error) = string_field(map.remove("error"), "error")? {
            return Ok(TaskData::Error(error));
        }
        Ok(TaskData::Fields(map.into_iter().collect()))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TaskData::Error(_))
    }
}

/// Normalised `/log_sequence_<station>` response.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Value")]
pub struct LogResponse {
    /// Identification text to display, usually the employee's name.
    pub sequence: Option<String>,
    pub task: Option<TaskData>,
}

impl LogResponse {
    fn from_map(mut map: Map<String, Value>) -> Result<Self, ProtocolError> {
        let sequence = string_field(map.remove("sequence"), "sequence")?;
        let task = match map.remove("task_data") {
            Some(Value::Null) | None => {
                string_field(map.remove("error"), "error")?.map(TaskData::Error)
            }
            Some(value) => Some(TaskData::from_value(value)?),
        };
        Ok(Self { sequence, task })
    }
}

impl TryFrom<Value> for LogResponse {
    type Error = ProtocolError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let found = json_kind(&value);
        let Value::Object(mut map) = value else {
            return Err(ProtocolError::NotAnObject { found });
        };
        match map.remove("data") {
            Some(Value::Object(inner)) => Self::from_map(inner),
            Some(Value::Null) | None => Self::from_map(map),
            Some(_) => Err(ProtocolError::UnexpectedType {
                field: "data",
                expected: "object",
            }),
        }
    }
}
