//! Language-model collaborator: prompt construction, chat client and retry policy.

pub mod openai;
pub mod prompts;
pub mod retry;

pub use openai::OpenAiChatClient;
pub use retry::{with_backoff, RetryPolicy};
