//! parla-providers: chat provider integrations.
//!
//! Implements the `ChatProvider` trait for OpenAI-compatible APIs and
//! Ollama, plus a scripted mock, and loads the parla configuration file.

pub mod config;
pub mod error;
pub mod mock;
pub mod ollama;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, ParlaConfig, ProviderConfig};
pub use error::ProviderError;
