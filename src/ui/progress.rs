use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::ui::icons::{CHECK, CROSS};

/// Spinner shown while a request to the server is outstanding.
///
/// Hidden when stderr is not a terminal, so piped output stays clean.
pub struct RequestSpinner {
    bar: ProgressBar,
}

impl RequestSpinner {
    pub fn start(message: impl Into<String>) -> Self {
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} {elapsed:.dim}")
            .expect("progress bar template is a valid static string");
        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn succeed(self, message: impl AsRef<str>) {
        self.bar
            .finish_with_message(format!("{}{}", CHECK, style(message.as_ref()).green()));
    }

    pub fn fail(self, message: impl AsRef<str>) {
        self.bar
            .finish_with_message(format!("{}{}", CROSS, style(message.as_ref()).red()));
    }

    /// Remove the spinner without leaving a line behind.
    pub fn clear(self) {
        self.bar.finish_and_clear();
    }
}
