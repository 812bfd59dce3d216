/// Chat-completion provider abstraction
///
/// The answer pipeline only needs "messages in, text out", so the hosted API
/// sits behind this trait and tests can swap in a mock.
use crate::{error::AppResult, models::CompletionMessage};

pub mod openai;

pub use openai::OpenAiProvider;

/// Trait for hosted chat-completion APIs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends the ordered role-tagged messages and returns the generated text, trimmed.
    ///
    /// No timeout, retry or cancellation is applied; callers decide what an error
    /// turns into.
    async fn complete(&self, messages: Vec<CompletionMessage>) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
