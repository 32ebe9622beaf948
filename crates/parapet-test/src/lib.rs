//! Test harness for the `parapet` binary.
//!
//! Holds the CLI regression suite and fixture helpers shared by it.

#[cfg(test)]
pub mod cli;

use std::path::PathBuf;

/// Absolute path to the shared test fixtures directory.
pub fn fixtures() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/parapet-test
    let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(|crates| crates.parent())
        .map(|root| root.join("tests/fixtures"))
        .unwrap_or_else(|| manifest.join("tests/fixtures"))
}

/// Absolute path to a single fixture file.
pub fn fixture(name: &str) -> PathBuf {
    fixtures().join(name)
}
