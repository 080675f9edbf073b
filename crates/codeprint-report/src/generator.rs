//! The text generation seam.

use thiserror::Error;

/// Errors from a text generation service.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The API key environment variable is unset or empty.
    #[error("{var} environment variable is not set")]
    MissingApiKey {
        /// Variable that was read.
        var: String,
    },

    /// The service asked the caller to slow down.
    #[error("rate limited by the generation service: {body}")]
    RateLimited {
        /// Response body.
        body: String,
    },

    /// Any other non-success status.
    #[error("generation service returned {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The request never produced a response.
    #[error("failed to reach the generation service: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response did not carry any text.
    #[error("malformed response from the generation service: {0}")]
    MalformedResponse(String),
}

impl GenerateError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Turns a prompt into generated text.
pub trait TextGenerator {
    /// Sends `prompt` and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerateError`] if the service call fails.
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

impl<G: TextGenerator + ?Sized> TextGenerator for &G {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        (**self).generate(prompt)
    }
}

impl<G: TextGenerator + ?Sized> TextGenerator for Box<G> {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        (**self).generate(prompt)
    }
}
