//! Provider error types.
//!
//! Defined in `parla-core` so the tutor engine can classify failures.

pub use parla_core::error::ProviderError;
