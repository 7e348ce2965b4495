use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{json_kind, string_field};
use crate::errors::ProtocolError;

/// Body of a `/complete_task_<station>` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub employee_sequence: String,
    /// Only sent to older gluing servers that expect the task id as well.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
}

impl CompletionRequest {
    pub fn new(employee_sequence: impl Into<String>) -> Self {
        Self {
            employee_sequence: employee_sequence.into(),
            task_id: None,
        }
    }

    pub fn with_task_id(mut self, task_id: i64) -> Self {
        self.task_id = Some(task_id);
        self
    }
}

/// Structured completion result shared by all stations.
///
/// Older servers answer `{"status": "ok"}` on one station and
/// `{"status": "success"}` on the other; both map to `ok = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct CompletionEnvelope {
    pub ok: bool,
    pub message: String,
}

impl CompletionEnvelope {
    pub fn success() -> Self {
        Self {
            ok: true,
            message: String::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

impl TryFrom<Value> for CompletionEnvelope {
    type Error = ProtocolError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let found = json_kind(&value);
        let Value::Object(mut map) = value else {
            return Err(ProtocolError::NotAnObject { found });
        };

        let mut message = string_field(map.remove("message"), "message")?;
        if message.is_none()
            && let Some(Value::Object(mut data)) = map.remove("data")
        {
            message = string_field(data.remove("error"), "error")?;
        }
        if message.is_none() {
            message = string_field(map.remove("detail"), "detail")?;
        }

        if let Some(ok) = map.remove("ok") {
            let Value::Bool(ok) = ok else {
                return Err(ProtocolError::UnexpectedType {
                    field: "ok",
                    expected: "boolean",
                });
            };
            return Ok(Self {
                ok,
                message: message.unwrap_or_default(),
            });
        }

        match string_field(map.remove("status"), "status")? {
            Some(status) => {
                let ok = matches!(status.as_str(), "ok" | "success");
                let message = message.unwrap_or_else(|| if ok { String::new() } else { status });
                Ok(Self { ok, message })
            }
            None => match message {
                Some(message) => Ok(Self::failure(message)),
                None => Err(ProtocolError::MissingField { field: "status" }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> CompletionEnvelope {
        CompletionEnvelope::try_from(value).unwrap()
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(CompletionRequest::new("A123")).unwrap();
        assert_eq!(body, json!({"employee_sequence": "A123"}));

        let with_task = CompletionRequest::new("7").with_task_id(15);
        assert_eq!(
            serde_json::to_value(with_task).unwrap(),
            json!({"employee_sequence": "7", "task_id": 15})
        );
    }

    #[test]
    fn test_legacy_ok_and_success_are_both_success() {
        assert!(parse(json!({"status": "ok"})).ok);
        assert!(parse(json!({"status": "success"})).ok);
    }

    #[test]
    fn test_structured_envelope() {
        let env = parse(json!({"ok": false, "message": "Этой брони больше нет"}));
        assert!(!env.ok);
        assert_eq!(env.message, "Этой брони больше нет");
    }

    #[test]
    fn test_error_message_from_data() {
        let env = parse(json!({
            "status": "error",
            "data": {"sequence": 12, "error": "Сотрудник не найден"}
        }));
        assert!(!env.ok);
        assert_eq!(env.message, "Сотрудник не найден");
    }

    #[test]
    fn test_error_message_from_legacy_message() {
        let env = parse(json!({"status": "error", "message": "Task ID not found"}));
        assert!(!env.ok);
        assert_eq!(env.message, "Task ID not found");
    }

    #[test]
    fn test_unknown_status_is_failure_with_status_text() {
        let env = parse(json!({"status": "pending"}));
        assert!(!env.ok);
        assert_eq!(env.message, "pending");
    }

    #[test]
    fn test_detail_only_is_failure() {
        let env = parse(json!({"detail": "Not Found"}));
        assert_eq!(env, CompletionEnvelope::failure("Not Found"));
    }

    #[test]
    fn test_empty_object_is_rejected() {
        let err = CompletionEnvelope::try_from(json!({})).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField { field: "status" }));
    }

    #[test]
    fn test_serializes_as_structured_envelope() {
        let json = serde_json::to_value(CompletionEnvelope::success()).unwrap();
        assert_eq!(json, json!({"ok": true, "message": ""}));
    }
}
