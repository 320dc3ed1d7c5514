//! 面向 OpenAI / Anthropic Claude / Google Gemini 的统一单次聊天调用

pub mod client;
pub mod config;
pub mod error;
pub mod http;
mod provider;
pub mod types;

pub use client::{ChatClient, ChatClientBuilder};
pub use config::{ClientConfig, ProviderConfig, ProviderKind};
pub use error::{ApiErrorKind, ChatError};
pub use tokio_util::sync::CancellationToken;
pub use types::ChatRequest;
