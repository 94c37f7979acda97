//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use tagcheck::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("lib/a.rb:1: W: [Tags/Order] ...");
//! ui.success("Done!");
//!
//! assert!(ui.has_message("Tags/Order"));
//! assert!(ui.has_success("Done"));
//! ```

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    error_blocks: Vec<(String, Vec<String>)>,
    spinners: Vec<String>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set whether this mock behaves as interactive.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Captured error blocks as (title, details).
    pub fn error_blocks(&self) -> &[(String, Vec<String>)] {
        &self.error_blocks
    }

    /// Messages of every spinner that was started.
    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    /// All captured messages joined by newlines.
    pub fn output(&self) -> String {
        self.messages.join("\n")
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    /// Whether an error message or error block mentions `msg`.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
            || self
                .error_blocks
                .iter()
                .any(|(title, details)| title.contains(msg) || details.iter().any(|d| d.contains(msg)))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_error_block(&mut self, title: &str, details: &[String]) {
        self.error_blocks.push((title.to_string(), details.to_vec()));
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner::new())
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Mock spinner that records its messages.
#[derive(Debug, Default)]
pub struct MockSpinner {
    messages: Vec<String>,
    status: Option<SpinnerStatus>,
}

/// How a mock spinner finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpinnerStatus {
    Cleared,
    Error(String),
}

impl MockSpinner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn status(&self) -> Option<&SpinnerStatus> {
        self.status.as_ref()
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn finish_and_clear(&mut self) {
        self.status = Some(SpinnerStatus::Cleared);
    }

    fn finish_error(&mut self, msg: &str) {
        self.status = Some(SpinnerStatus::Error(msg.to_string()));
    }
}
