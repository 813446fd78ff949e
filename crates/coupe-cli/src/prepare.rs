//! Build-directory preparation for `coupe deploy`.
//!
//! Materializes `<stack>/build` from the installed templates and the
//! operator's handler sources. Returns which containers ended up with a
//! `.env` file as an explicit [`EnvFileSet`] value for the compiler.

use std::path::{Path, PathBuf};

use coupe_common::error::{CoupeError, Result};
use coupe_config::StackConfig;
use coupe_topology::EnvFileSet;

use crate::fsutil;
use crate::templates;

/// Resolved output paths of one build.
#[derive(Debug, Clone)]
pub struct BuildLayout {
    /// Root of the build directory (`<stack>/build`).
    pub build_dir: PathBuf,
    /// Compose file the container runtime applies.
    pub compose_path: PathBuf,
    /// Directory holding the generated Caddyfile.
    pub caddy_dir: PathBuf,
    /// The generated Caddyfile.
    pub caddyfile_path: PathBuf,
}

impl BuildLayout {
    /// Computes the layout for a stack rooted at `source_dir`.
    #[must_use]
    pub fn new(source_dir: &Path) -> Self {
        let build_dir = source_dir.join("build");
        let caddy_dir = build_dir.join("platform").join("caddy");
        Self {
            compose_path: build_dir.join("docker-compose.yaml"),
            caddyfile_path: caddy_dir.join("Caddyfile"),
            build_dir,
            caddy_dir,
        }
    }
}

/// Prepares the build directory for every function in the stack.
///
/// Per function: copies the `(runtime, trigger)` template, replaces its
/// starter handler with the operator's source, copies the runtime support
/// packages, and hoists a `handler/.env` file (if any) next to the
/// Dockerfile so compose can pick it up.
///
/// # Errors
///
/// Returns [`CoupeError::MissingTemplate`] or
/// [`CoupeError::MissingHandlerSource`] for boundary check failures, and
/// I/O errors with the offending path otherwise.
pub fn prepare_build(
    source_dir: &Path,
    templates_root: &Path,
    config: &StackConfig,
) -> Result<EnvFileSet> {
    let layout = BuildLayout::new(source_dir);
    let packages_src = source_dir.join("packages");
    let packages_build = layout.build_dir.join("packages");
    fsutil::clean_dir(&packages_build)?;
    if packages_src.is_dir() {
        fsutil::copy_dir(&packages_src, &packages_build)?;
    }

    let mut env_files = EnvFileSet::new();
    for function in &config.functions {
        let template_dir =
            templates::require_template(templates_root, &function.runtime, function.trigger.kind())?;
        let handler_src = source_dir.join("functions").join(&function.name);
        if !handler_src.is_dir() {
            return Err(CoupeError::MissingHandlerSource {
                function: function.name.clone(),
                path: handler_src,
            });
        }

        let fn_build_dir = layout.build_dir.join("functions").join(&function.name);
        let handler_build_dir = fn_build_dir.join("handler");
        fsutil::clean_dir(&fn_build_dir)?;
        fsutil::copy_dir(&template_dir, &fn_build_dir)?;
        fsutil::clean_dir(&handler_build_dir)?;
        fsutil::copy_dir(&handler_src, &handler_build_dir)?;

        let fn_packages_dir = fn_build_dir.join("packages");
        let runtime_packages = packages_src.join(&function.runtime);
        if runtime_packages.is_dir() {
            fsutil::clean_dir(&fn_packages_dir)?;
            fsutil::copy_dir(&runtime_packages, &fn_packages_dir)?;
        }

        let env_file = handler_build_dir.join(".env");
        if env_file.is_file() {
            std::fs::rename(&env_file, fn_build_dir.join(".env")).map_err(|source| {
                CoupeError::Io {
                    path: env_file,
                    source,
                }
            })?;
            env_files.insert(function.container_name.clone());
        } else {
            tracing::debug!(
                function = function.name.as_str(),
                "no .env file found, skipping"
            );
        }
    }

    Ok(env_files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coupe_config::document::{FunctionEntry, StackDocument, TriggerEntry};

    fn config() -> StackConfig {
        coupe_config::validate(StackDocument {
            name: "blog".into(),
            http_port: 8080,
            functions: vec![FunctionEntry {
                name: "api".into(),
                runtime: "rust".into(),
                idle_timeout_secs: 300,
                trigger: TriggerEntry::Http {
                    route: "/api".into(),
                },
            }],
            queues: Vec::new(),
            streams: Vec::new(),
        })
        .expect("valid config")
    }

    fn install_template(templates_root: &Path) {
        let template = templates_root.join("rust/http");
        std::fs::create_dir_all(template.join("trigger")).expect("mkdir");
        std::fs::create_dir_all(template.join("handler")).expect("mkdir");
        std::fs::write(template.join("Dockerfile"), "FROM rust").expect("write");
        std::fs::write(template.join("handler/starter.rs"), "// starter").expect("write");
    }

    fn write_handler(source_dir: &Path, with_env: bool) {
        let handler = source_dir.join("functions/api");
        std::fs::create_dir_all(&handler).expect("mkdir");
        std::fs::write(handler.join("main.rs"), "fn main() {}").expect("write");
        if with_env {
            std::fs::write(handler.join(".env"), "SECRET=x").expect("write");
        }
    }

    #[test]
    fn build_dir_contains_template_and_handler_source() {
        let source = tempfile::tempdir().expect("tempdir");
        let templates = tempfile::tempdir().expect("tempdir");
        install_template(templates.path());
        write_handler(source.path(), false);

        let env_files =
            prepare_build(source.path(), templates.path(), &config()).expect("prepare");

        let fn_dir = source.path().join("build/functions/api");
        assert!(fn_dir.join("Dockerfile").exists());
        assert!(fn_dir.join("handler/main.rs").exists());
        // the template's starter handler was replaced, not merged
        assert!(!fn_dir.join("handler/starter.rs").exists());
        assert!(!env_files.contains("coupe_function_blog_api"));
    }

    #[test]
    fn env_file_is_hoisted_and_reported() {
        let source = tempfile::tempdir().expect("tempdir");
        let templates = tempfile::tempdir().expect("tempdir");
        install_template(templates.path());
        write_handler(source.path(), true);

        let env_files =
            prepare_build(source.path(), templates.path(), &config()).expect("prepare");

        let fn_dir = source.path().join("build/functions/api");
        assert!(fn_dir.join(".env").exists());
        assert!(!fn_dir.join("handler/.env").exists());
        assert!(env_files.contains("coupe_function_blog_api"));
    }

    #[test]
    fn missing_template_fails_before_touching_handlers() {
        let source = tempfile::tempdir().expect("tempdir");
        let templates = tempfile::tempdir().expect("tempdir");
        write_handler(source.path(), false);

        let err = prepare_build(source.path(), templates.path(), &config()).unwrap_err();
        assert!(matches!(err, CoupeError::MissingTemplate { .. }));
    }

    #[test]
    fn missing_handler_source_is_reported_with_function_name() {
        let source = tempfile::tempdir().expect("tempdir");
        let templates = tempfile::tempdir().expect("tempdir");
        install_template(templates.path());

        let err = prepare_build(source.path(), templates.path(), &config()).unwrap_err();
        match err {
            CoupeError::MissingHandlerSource { function, .. } => assert_eq!(function, "api"),
            other => panic!("expected missing handler source, got {other}"),
        }
    }
}
