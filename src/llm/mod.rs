// LLM abstraction layer

pub mod provider;
pub mod mistral;

pub use provider::*;
pub use crate::types::{LLMMessage, LLMRequest, LLMResponse, TokenUsage};
