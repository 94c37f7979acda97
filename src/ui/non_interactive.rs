//! Non-interactive UI for CI/headless environments.

use super::theme::TagcheckTheme;
use super::{OutputMode, ProgressSpinner, SpinnerHandle, UserInterface};

/// UI implementation for non-interactive mode.
///
/// Spinners are never drawn and no colors are used; report output goes to
/// stdout, diagnostics to stderr.
pub struct NonInteractiveUI {
    mode: OutputMode,
    theme: TagcheckTheme,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI.
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            theme: TagcheckTheme::plain(),
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn set_output_mode(&mut self, mode: OutputMode) {
        self.mode = mode;
    }

    fn message(&mut self, msg: &str) {
        println!("{}", msg);
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("{}", self.theme.format_warning(msg));
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn show_error_block(&mut self, title: &str, details: &[String]) {
        eprintln!("{}", self.theme.format_block(title, details));
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(ProgressSpinner::hidden())
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
