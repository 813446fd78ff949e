//! # coupe-config
//!
//! Declarative stack configuration for coupe:
//! - **Document**: raw serde model of `coupe.yaml`.
//! - **Validate**: structural checks, cross-reference resolution, defaulting.
//! - **Stack**: the normalized, immutable configuration with precomputed
//!   derived names, consumed by the topology compiler and the provisioner.

pub mod document;
pub mod stack;
pub mod validate;

use std::path::Path;

use coupe_common::constants::CONFIG_FILE_NAME;
use coupe_common::error::{CoupeError, Result};

pub use document::StackDocument;
pub use stack::{BrokerResourceConfig, Function, StackConfig, Trigger, TriggerKind};
pub use validate::validate;

/// Reads and parses `coupe.yaml` from a stack directory without validating.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, or not valid YAML
/// for the document shape (including unknown trigger discriminators).
pub fn load_document(dir: &Path) -> Result<StackDocument> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&path).map_err(|source| CoupeError::Io {
        path: path.clone(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| CoupeError::Validation {
        message: format!("{}: {source}", path.display()),
    })
}

/// Loads, parses, and validates the stack rooted at `dir`.
///
/// # Errors
///
/// Returns an error for I/O failures, malformed YAML, or any validation
/// failure; see [`validate::validate`].
pub fn load_stack(dir: &Path) -> Result<StackConfig> {
    let document = load_document(dir)?;
    validate(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_stack_reads_and_validates() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "\
name: blog
http_port: 9000
functions:
- name: api
  runtime: rust
  trigger:
    type: http
    route: /api
",
        )
        .expect("write config");

        let config = load_stack(dir.path()).expect("should load");
        assert_eq!(config.name, "blog");
        assert_eq!(config.http_port, 9000);
    }

    #[test]
    fn load_stack_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_stack(dir.path()).unwrap_err();
        assert!(matches!(err, CoupeError::Io { .. }));
    }

    #[test]
    fn load_stack_unknown_trigger_is_validation_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "\
name: blog
functions:
- name: tick
  runtime: rust
  trigger:
    type: timer
    schedule: '@hourly'
",
        )
        .expect("write config");

        let err = load_stack(dir.path()).unwrap_err();
        assert!(matches!(err, CoupeError::Validation { .. }));
        assert!(err.to_string().contains("timer"), "got: {err}");
    }
}
