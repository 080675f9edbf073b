//! Exponential backoff around a [`TextGenerator`].

use std::time::Duration;

use tracing::warn;

use crate::generator::{GenerateError, TextGenerator};

/// Retries rate-limited calls with a doubling delay.
///
/// Before retry `n` (1-based) it sleeps `base_delay * 2^(n-1)`. Errors that
/// are not retryable return immediately; exhaustion returns the last error.
#[derive(Debug, Clone)]
pub struct Retrying<G> {
    inner: G,
    max_attempts: u32,
    base_delay: Duration,
}

impl<G> Retrying<G> {
    /// Wraps `inner`. `max_attempts` counts the first call and is at least 1.
    #[must_use]
    pub fn new(inner: G, max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }
}

impl<G: TextGenerator> TextGenerator for Retrying<G> {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let mut delay = self.base_delay;
        let mut attempt = 1;
        loop {
            match self.inner.generate(prompt) {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        "{e}. Retrying in {delay:?}"
                    );
                    std::thread::sleep(delay);
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
