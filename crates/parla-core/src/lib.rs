//! parla-core: Scheduler, vocabulary, progress store, and tutor engine.
//!
//! This crate defines the data model, the SM-2 spaced-repetition scheduler,
//! and the local progress store that the rest of parla builds on.

pub mod conversation;
pub mod deck;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod session;
pub mod srs;
pub mod statistics;
pub mod store;
pub mod topics;
pub mod traits;
