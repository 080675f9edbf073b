//! Progress spinner around a [`TextGenerator`].

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::generator::{GenerateError, TextGenerator};

const TICK_STRINGS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Shows a spinner with a message while each call runs.
///
/// Display only: the spinner is cleared when the call returns and never
/// touches the result.
#[derive(Debug, Clone)]
pub struct WithSpinner<G> {
    inner: G,
    message: String,
}

impl<G> WithSpinner<G> {
    /// Wraps `inner`, showing `message` next to the spinner.
    #[must_use]
    pub fn new(inner: G, message: impl Into<String>) -> Self {
        Self {
            inner,
            message: message.into(),
        }
    }
}

impl<G: TextGenerator> TextGenerator for WithSpinner<G> {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_strings(TICK_STRINGS)
                .template("{spinner:.blue} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(self.message.clone());
        spinner.enable_steady_tick(Duration::from_millis(80));

        let result = self.inner.generate(prompt);
        spinner.finish_and_clear();
        result
    }
}
