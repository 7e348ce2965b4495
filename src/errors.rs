//! Typed error hierarchy for scanstation.
//!
//! One enum per subsystem:
//! - `ClientError` — HTTP transport and decoding failures
//! - `ProtocolError` — server payloads that match no known response shape
//! - `StationError` — scanner page state machine misuse
//! - `OrderError` / `PhotoError` — order draft and attachment failures

use thiserror::Error;

/// Malformed or unrecognised server payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Expected a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("Field '{field}' has unexpected type: expected {expected}")]
    UnexpectedType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Response has no '{field}' field")]
    MissingField { field: &'static str },

    #[error("Catalog response is neither a list nor a data envelope")]
    InvalidCatalog,
}

/// Errors from talking to the workflow server.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Server returned {status} for {path}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Invalid server URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Errors from the scanner page controller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StationError {
    #[error("No task is awaiting completion")]
    NoPendingTask,

    #[error("No employee sequence was captured for the displayed task")]
    MissingEmployeeSequence,

    #[error("A completion request is already in flight")]
    CompletionInFlight,
}

/// Photo attachment validation failures.
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("File '{file_name}' is {size} bytes, the limit is {limit} bytes")]
    TooLarge {
        file_name: String,
        size: u64,
        limit: u64,
    },

    #[error("File '{file_name}' has type {mime}, only images can be attached")]
    UnsupportedType { file_name: String, mime: String },

    #[error("File '{file_name}' is empty")]
    Empty { file_name: String },

    #[error("Failed to read photo at {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the order draft and its submission.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Line item {id} not found")]
    ItemNotFound { id: u32 },

    #[error("Line item {id} is not a mattress")]
    NotAMattress { id: u32 },

    #[error("Order has no line items")]
    EmptyOrder,

    #[error("An order submission is already in flight")]
    SubmitInFlight,

    #[error("Invalid price '{value}'")]
    InvalidPrice { value: String },

    #[error("Invalid delivery date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error(transparent)]
    Photo(#[from] PhotoError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_converts_into_client_error() {
        let err: ClientError = ProtocolError::InvalidCatalog.into();
        match &err {
            ClientError::Protocol(ProtocolError::InvalidCatalog) => {}
            _ => panic!("Expected ClientError::Protocol(InvalidCatalog)"),
        }
    }

    #[test]
    fn status_error_carries_code_and_path() {
        let err = ClientError::Status {
            path: "/complete_task_sewing".to_string(),
            status: 404,
            body: "missing".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("/complete_task_sewing"));
    }

    #[test]
    fn photo_error_converts_into_order_error() {
        let err: OrderError = PhotoError::Empty {
            file_name: "a.jpg".to_string(),
        }
        .into();
        assert!(matches!(err, OrderError::Photo(PhotoError::Empty { .. })));
        assert!(err.to_string().contains("a.jpg"));
    }

    #[test]
    fn item_not_found_carries_id() {
        let err = OrderError::ItemNotFound { id: 7 };
        match &err {
            OrderError::ItemNotFound { id } => assert_eq!(*id, 7),
            _ => panic!("Expected ItemNotFound"),
        }
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        assert_std_error(&ProtocolError::InvalidCatalog);
        assert_std_error(&StationError::NoPendingTask);
        assert_std_error(&OrderError::EmptyOrder);
        assert_std_error(&PhotoError::Empty {
            file_name: "x".into(),
        });
    }
}
