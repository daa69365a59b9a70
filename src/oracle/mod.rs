//! Decision oracle boundary.
//!
//! The oracle plays the persona's mind: it reads a rendered
//! [`DecisionRequest`] and answers with free text that should contain one
//! JSON decision.  Parsing that text is [`decision::parse_reply`]'s job;
//! the oracle itself only moves text.
//!
//! An `Err` from [`DecisionOracle::decide`] means no reply could be obtained
//! at all (after the oracle's own retries) and ends the journey.

pub mod anthropic;
pub mod decision;
pub mod prompt;

use async_trait::async_trait;
use thiserror::Error;

use crate::executor::Screenshot;

pub use anthropic::AnthropicOracle;
pub use decision::{parse_reply, Decision, OracleReply};
pub use prompt::{build_request, PromptContext};

/// Errors from an oracle's transport layer.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-retryable API error.
    #[error("Oracle API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Every attempt failed with a retryable error.
    #[error("Oracle call failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// The API answered but the envelope could not be read.
    #[error("Invalid oracle response: {0}")]
    InvalidResponse(String),
}

/// One rendered request to the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Attached when vision is enabled and the executor can render.
    pub screenshot: Option<Screenshot>,
}

/// The persona's mind.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Return the raw reply text.
    async fn decide(&self, request: &DecisionRequest) -> Result<String, OracleError>;

    /// Short identifier for logs ("anthropic:claude-...").
    fn name(&self) -> String {
        "oracle".to_string()
    }
}

/// At most `max` bytes of `text`, cut on a char boundary.
pub(crate) fn excerpt(text: &str, max: usize) -> &str {
    let mut i = max.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    &text[..i]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_respects_char_boundary() {
        assert_eq!(excerpt("héllo", 2), "h");
        assert_eq!(excerpt("héllo", 100), "héllo");
        assert_eq!(excerpt("", 10), "");
    }
}
