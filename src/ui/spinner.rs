//! Progress spinner.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::theme::TagcheckTheme;
use super::SpinnerHandle;

/// A progress spinner for long-running operations, drawn on stderr.
pub struct ProgressSpinner {
    bar: ProgressBar,
}

impl ProgressSpinner {
    /// Create a new spinner with a message.
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));

        Self { bar }
    }

    /// Create a spinner that doesn't show.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_and_clear(&mut self) {
        self.bar.finish_and_clear();
    }

    fn finish_error(&mut self, msg: &str) {
        self.bar.finish_and_clear();
        eprintln!("{}", TagcheckTheme::new().format_error(msg));
    }
}
