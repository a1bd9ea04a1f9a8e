//! External model client interfaces.
//!
//! The core never talks to a provider directly: callers wire in whatever
//! chat/vision backend they run and the pipeline calls through these traits
//! at its two suspension points. Both calls carry an explicit deadline and
//! observe the shared [`CancelToken`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ModelError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Chat completion backend.
///
/// Implementations must return within `deadline` or fail with
/// [`ModelError::Timeout`]; the orchestrator treats timeouts as retryable.
pub trait ChatModel {
    fn chat(&self, messages: &[ChatMessage], deadline: Duration) -> Result<String, ModelError>;
}

/// Vision backend: answer a prompt about a PNG image.
pub trait VisionModel {
    fn analyze_image(
        &self,
        image_png: &[u8],
        prompt: &str,
        deadline: Duration,
    ) -> Result<String, ModelError>;
}

/// Cooperative cancellation flag shared between the caller and the pipeline.
///
/// The pipeline checks it before each model call; a set token aborts the
/// extraction with `ExtractionCancelled` and discards partial batch results.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Tunable deadlines and retry policy for the pipeline.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Deadline for a single vision call.
    pub vision_deadline: Duration,
    /// Deadline for a single chat call (per batch).
    pub chat_deadline: Duration,
    /// Retries per Tier-3 batch after a retryable failure.
    pub batch_retries: u32,
    /// DPI for page rasterization (vision OCR, logo detection).
    pub render_dpi: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            vision_deadline: Duration::from_secs(60),
            chat_deadline: Duration::from_secs(120),
            batch_retries: 2,
            render_dpi: 150,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_flips_once() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());

        let clone = token.clone();
        assert!(clone.is_cancelled());
    }
}
