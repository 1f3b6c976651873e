//! Teaser Core - Backend logic for Teaser Studio
//!
//! This crate contains the acquisition, extraction, and compositing
//! pipeline with zero UI dependencies. It can be used by a web
//! front-end or a CLI tool.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod merge;
pub mod models;
pub mod orchestrator;
pub mod overlay;
pub mod probe;
pub mod scratch;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
