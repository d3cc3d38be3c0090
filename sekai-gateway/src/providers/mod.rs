pub mod openai;
pub mod provider;

pub use openai::OpenAiClient;
pub use provider::{ChatProvider, ProviderError};
