use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text the legacy order form searched for in plain-text responses.
pub const ORDER_ACCEPTED_MARKER: &str = "Заявка принята";

/// Structured result of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitEnvelope {
    pub ok: bool,
    pub message: String,
}

impl SubmitEnvelope {
    /// Interpret a response body.
    ///
    /// JSON bodies are read structurally (`{ok, message}`,
    /// `{status: "success", data: "<text>"}`, `{detail}`); anything else
    /// is treated as text and accepted only when it contains
    /// [`ORDER_ACCEPTED_MARKER`]. A non-success HTTP status is never `ok`.
    pub fn from_body(http_success: bool, body: &str) -> Self {
        let parsed = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Some(Self::from_object(map)),
            Ok(Value::String(text)) => Some(Self::from_text(&text)),
            _ => None,
        };
        let mut envelope = parsed.unwrap_or_else(|| Self::from_text(body));
        envelope.ok &= http_success;
        envelope
    }

    fn from_object(mut map: serde_json::Map<String, Value>) -> Self {
        let text = |value: Option<Value>| match value {
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        let message = text(map.remove("message"))
            .or_else(|| text(map.remove("data")))
            .or_else(|| text(map.remove("detail")))
            .unwrap_or_default();

        let ok = match (map.remove("ok"), map.remove("status")) {
            (Some(Value::Bool(ok)), _) => ok,
            (_, Some(Value::String(status))) => matches!(status.as_str(), "ok" | "success"),
            _ => message.contains(ORDER_ACCEPTED_MARKER),
        };

        Self { ok, message }
    }

    fn from_text(text: &str) -> Self {
        let message = text.trim().to_string();
        Self {
            ok: message.contains(ORDER_ACCEPTED_MARKER),
            message,
        }
    }
}
