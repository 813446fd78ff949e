//! Locating installed function templates under `~/.coupe/templates`.
//!
//! A function template for `(runtime, trigger)` lives at
//! `templates/functions/{runtime}/{trigger}` and contains a `trigger/`
//! runtime shim plus a `handler/` starter the operator replaces.

use std::path::{Path, PathBuf};

use coupe_common::error::{CoupeError, Result};
use coupe_config::TriggerKind;

/// Returns the template directory for a runtime/trigger pair.
#[must_use]
pub fn function_template(templates_root: &Path, runtime: &str, kind: TriggerKind) -> PathBuf {
    templates_root.join(runtime).join(kind.to_string())
}

/// Returns the handler starter directory inside a function template.
#[must_use]
pub fn handler_template(templates_root: &Path, runtime: &str, kind: TriggerKind) -> PathBuf {
    function_template(templates_root, runtime, kind).join("handler")
}

/// Checks that the template for a runtime/trigger pair is installed.
///
/// # Errors
///
/// Returns [`CoupeError::MissingTemplate`] if the directory does not exist.
pub fn require_template(templates_root: &Path, runtime: &str, kind: TriggerKind) -> Result<PathBuf> {
    let path = function_template(templates_root, runtime, kind);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(CoupeError::MissingTemplate {
            runtime: runtime.to_owned(),
            trigger: kind.to_string(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_paths_nest_runtime_then_trigger() {
        let root = Path::new("/tmp/templates/functions");
        assert_eq!(
            function_template(root, "rust", TriggerKind::Http),
            PathBuf::from("/tmp/templates/functions/rust/http")
        );
        assert_eq!(
            handler_template(root, "rust", TriggerKind::Queue),
            PathBuf::from("/tmp/templates/functions/rust/queue/handler")
        );
    }

    #[test]
    fn require_template_reports_missing_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = require_template(dir.path(), "rust", TriggerKind::Http).unwrap_err();
        match err {
            CoupeError::MissingTemplate { runtime, trigger, .. } => {
                assert_eq!(runtime, "rust");
                assert_eq!(trigger, "http");
            }
            other => panic!("expected missing template, got {other}"),
        }
    }

    #[test]
    fn require_template_accepts_existing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("rust/http")).expect("mkdir");
        assert!(require_template(dir.path(), "rust", TriggerKind::Http).is_ok());
    }
}
