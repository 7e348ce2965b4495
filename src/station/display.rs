//! Task display model.
//!
//! Turns server `task_data` into an ordered list of elements the terminal
//! renderer draws. Empty values are skipped, the photo field becomes an
//! image element, and `<strong>` markup becomes emphasis.

use serde_json::Value;

use crate::protocol::TaskData;

/// Field holding the mattress photo (a URL or a base64 data URL).
pub const PHOTO_FIELD: &str = "Фото";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayElement {
    Field {
        label: String,
        value: String,
        emphasized: bool,
    },
    Photo {
        src: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskView {
    #[default]
    Empty,
    /// Server-side error shown in place of the task.
    Error(String),
    Task {
        elements: Vec<DisplayElement>,
        photo_expanded: bool,
    },
}

impl TaskView {
    pub fn from_task_data(data: &TaskData) -> Self {
        match data {
            TaskData::Error(message) => TaskView::Error(message.clone()),
            TaskData::Fields(fields) => {
                let elements = fields
                    .iter()
                    .filter_map(|(label, value)| {
                        let text = display_text(value)?;
                        if label == PHOTO_FIELD {
                            return Some(DisplayElement::Photo { src: text });
                        }
                        let (value, emphasized) = strip_strong(&text);
                        Some(DisplayElement::Field {
                            label: label.clone(),
                            value,
                            emphasized,
                        })
                    })
                    .collect();
                TaskView::Task {
                    elements,
                    photo_expanded: false,
                }
            }
        }
    }

    /// Completion controls are shown only alongside a task.
    pub fn controls_visible(&self) -> bool {
        matches!(self, TaskView::Task { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TaskView::Empty)
    }

    pub fn elements(&self) -> &[DisplayElement] {
        match self {
            TaskView::Task { elements, .. } => elements,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TaskView::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn photo(&self) -> Option<&str> {
        self.elements().iter().find_map(|e| match e {
            DisplayElement::Photo { src } => Some(src.as_str()),
            _ => None,
        })
    }

    /// Flip the photo between thumbnail and expanded. Returns the new
    /// state, `None` when there is no photo.
    pub fn toggle_photo(&mut self) -> Option<bool> {
        let has_photo = self.photo().is_some();
        match self {
            TaskView::Task { photo_expanded, .. } if has_photo => {
                *photo_expanded = !*photo_expanded;
                Some(*photo_expanded)
            }
            _ => None,
        }
    }

    pub fn photo_expanded(&self) -> bool {
        matches!(
            self,
            TaskView::Task {
                photo_expanded: true,
                ..
            }
        )
    }

    pub fn clear(&mut self) {
        *self = TaskView::Empty;
    }
}

/// Render a JSON value as display text. Falsy values (null, false, 0,
/// empty strings) are not displayed.
fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("да".to_string()),
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn strip_strong(text: &str) -> (String, bool) {
    let emphasized = text.contains("<strong>");
    if !emphasized {
        return (text.to_string(), false);
    }
    let plain = text.replace("<strong>", "").replace("</strong>", "");
    (plain, true)
}
