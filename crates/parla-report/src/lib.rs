//! parla-report: progress report rendering.
//!
//! Turns a [`parla_core::report::ProgressReport`] into a self-contained HTML
//! dashboard.

pub mod html;

pub use html::{generate_html, write_html_report};
