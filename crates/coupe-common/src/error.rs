//! Unified error types for the coupe workspace.
//!
//! Validation and reference errors are raised before any side effect;
//! provisioning and external tool errors name the resource or command that
//! failed so the CLI can print a one-line diagnosis.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum CoupeError {
    /// The declarative document is malformed or ill-typed.
    #[error("invalid configuration: {message}")]
    Validation {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A trigger references a stream or queue that is not declared.
    #[error("function \"{function}\" references undeclared {kind} \"{name}\"")]
    UnresolvedReference {
        /// Kind of the missing resource (`"stream"` or `"queue"`).
        kind: &'static str,
        /// Name the trigger referenced.
        name: String,
        /// Function whose trigger holds the dangling reference.
        function: String,
    },

    /// No trigger template exists for a runtime/trigger combination.
    #[error("no {trigger} template for runtime \"{runtime}\" at {path}")]
    MissingTemplate {
        /// Runtime the function declared.
        runtime: String,
        /// Trigger kind the function declared.
        trigger: String,
        /// Template path that was checked.
        path: PathBuf,
    },

    /// A function's handler source directory does not exist.
    #[error("handler source for function \"{function}\" not found at {path}")]
    MissingHandlerSource {
        /// Function whose handler is missing.
        function: String,
        /// Path that was checked.
        path: PathBuf,
    },

    /// A broker lookup or create failed for a reason other than not-found.
    #[error("provisioning {resource} failed: {message}")]
    Provisioning {
        /// Broker resource that failed.
        resource: String,
        /// Broker-reported failure description.
        message: String,
    },

    /// An external tool (container runtime, proxy formatter) exited non-zero.
    #[error("external command `{command}` failed: {message}")]
    ExternalTool {
        /// The command line that was invoked.
        command: String,
        /// Captured output of the failing invocation.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// YAML serialization or deserialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying serde_yaml error.
        #[from]
        source: serde_yaml::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CoupeError>;
