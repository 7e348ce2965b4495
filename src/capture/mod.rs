//! Keyboard sequence capture.
//!
//! Barcode scanners on the floor act as keyboards and type the employee
//! code wrapped in parentheses, e.g. `(1042)`. A `(` opens a capture,
//! characters accumulate, and `)` closes it and yields the sequence.
//!
//! Parentheses are control characters here and can never be part of a
//! payload. Captures do not nest: a `(` while capturing restarts the
//! capture and discards the partial buffer.

pub mod keys;

pub use keys::{Key, Modifier, NamedKey};

use serde::{Deserialize, Serialize};

pub const OPEN: char = '(';
pub const CLOSE: char = ')';

/// How captured keys are sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Buffer the capture and submit `{sequence}` once on `)`.
    #[default]
    Sequence,
    /// Submit `{key}` for every key of the capture, parens included.
    PerKey,
}

impl std::fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureMode::Sequence => write!(f, "sequence"),
            CaptureMode::PerKey => write!(f, "per_key"),
        }
    }
}

impl std::str::FromStr for CaptureMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "sequence" => Ok(CaptureMode::Sequence),
            "per_key" => Ok(CaptureMode::PerKey),
            _ => anyhow::bail!("Invalid capture mode '{}'. Valid values: sequence, per_key", s),
        }
    }
}

/// Why a finished capture was not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureRejection {
    /// `()` with nothing in between.
    Empty,
}

/// Result of feeding one key into a [`CaptureSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key had no effect on the session.
    Ignored,
    /// A `(` opened a capture. `discarded` holds the partial buffer of a
    /// capture that was still open.
    Started { discarded: Option<String> },
    /// A character was added to the open capture.
    Appended(char),
    /// A `)` closed the capture.
    Finished { sequence: String },
    /// A `)` closed the capture but its content is unusable.
    Rejected(CaptureRejection),
    /// A `)` arrived with no capture open.
    CloseWhileIdle,
}

/// Capture state of a scanner page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CaptureSession {
    #[default]
    Idle,
    Capturing { buffer: String },
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_active(&self) -> bool {
        matches!(self, CaptureSession::Capturing { .. })
    }

    /// The partial capture, empty when idle.
    pub fn buffer(&self) -> &str {
        match self {
            CaptureSession::Idle => "",
            CaptureSession::Capturing { buffer } => buffer,
        }
    }

    pub fn reset(&mut self) {
        *self = CaptureSession::Idle;
    }

    /// Advance the session by one keystroke.
    pub fn feed(&mut self, key: &Key) -> KeyOutcome {
        let c = match key {
            Key::Char(c) => *c,
            Key::Modifier(_) | Key::Named(_) => return KeyOutcome::Ignored,
        };

        match (std::mem::take(self), c) {
            (CaptureSession::Idle, OPEN) => {
                *self = CaptureSession::Capturing {
                    buffer: String::new(),
                };
                KeyOutcome::Started { discarded: None }
            }
            (CaptureSession::Capturing { buffer }, OPEN) => {
                *self = CaptureSession::Capturing {
                    buffer: String::new(),
                };
                let discarded = (!buffer.is_empty()).then_some(buffer);
                KeyOutcome::Started { discarded }
            }
            (CaptureSession::Capturing { buffer }, CLOSE) => {
                if buffer.is_empty() {
                    KeyOutcome::Rejected(CaptureRejection::Empty)
                } else {
                    KeyOutcome::Finished { sequence: buffer }
                }
            }
            (CaptureSession::Capturing { mut buffer }, c) => {
                buffer.push(c);
                *self = CaptureSession::Capturing { buffer };
                KeyOutcome::Appended(c)
            }
            (CaptureSession::Idle, CLOSE) => KeyOutcome::CloseWhileIdle,
            (CaptureSession::Idle, _) => KeyOutcome::Ignored,
        }
    }
}
