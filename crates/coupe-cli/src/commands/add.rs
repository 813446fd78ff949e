//! `coupe add` — Add a function to the stack and scaffold its handler.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use coupe_common::constants::{CONFIG_FILE_NAME, function_templates_dir, package_templates_dir};
use coupe_common::error::CoupeError;
use coupe_config::TriggerKind;
use coupe_config::document::{FunctionEntry, TriggerEntry};

use crate::commands::scaffold::scaffold_runtime_packages;
use crate::{fsutil, templates};

/// Trigger selector for new functions.
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum TriggerArg {
    /// HTTP request routed through the reverse proxy.
    Http,
    /// Message on subscribed broker subjects.
    Pubsub,
    /// Batches pulled from a declared durable stream.
    Stream,
    /// Batches pulled from a declared work queue.
    Queue,
}

impl TriggerArg {
    const fn kind(self) -> TriggerKind {
        match self {
            Self::Http => TriggerKind::Http,
            Self::Pubsub => TriggerKind::PubSub,
            Self::Stream => TriggerKind::Stream,
            Self::Queue => TriggerKind::Queue,
        }
    }

    /// Default trigger entry for a fresh function; stream and queue
    /// references are left empty for the operator to fill in.
    fn entry(self, name: &str) -> TriggerEntry {
        match self {
            Self::Http => TriggerEntry::Http {
                route: format!("/{name}"),
            },
            Self::Pubsub => TriggerEntry::PubSub {
                subjects: Vec::new(),
            },
            Self::Stream => TriggerEntry::Stream {
                name: String::new(),
                batch_size: 1,
            },
            Self::Queue => TriggerEntry::Queue {
                name: String::new(),
                batch_size: 1,
            },
        }
    }
}

/// Arguments for the `add` command.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Name of the new function.
    pub name: String,

    /// Runtime identifier, e.g. `rust`.
    pub runtime: String,

    /// Trigger type for the function.
    #[arg(value_enum)]
    pub trigger: TriggerArg,

    /// Stack directory.
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

/// Executes the `add` command.
///
/// # Errors
///
/// Returns an error if the handler template is missing, a function with
/// the same name already exists, or the configuration cannot be rewritten.
pub fn execute(args: AddArgs) -> anyhow::Result<()> {
    let kind = args.trigger.kind();
    let _ = templates::require_template(&function_templates_dir(), &args.runtime, kind)?;
    let handler_template =
        templates::handler_template(&function_templates_dir(), &args.runtime, kind);

    let mut document = coupe_config::load_document(&args.dir)?;
    let handler_dir = args.dir.join("functions").join(&args.name);
    if handler_dir.exists() {
        return Err(CoupeError::Validation {
            message: format!("function {} already exists", args.name),
        }
        .into());
    }

    fsutil::copy_dir(&handler_template, &handler_dir)?;

    document.functions.push(FunctionEntry {
        name: args.name.clone(),
        runtime: args.runtime.clone(),
        idle_timeout_secs: coupe_common::constants::DEFAULT_IDLE_TIMEOUT_SECS,
        trigger: args.trigger.entry(&args.name),
    });
    fsutil::write_file(
        &args.dir.join(CONFIG_FILE_NAME),
        &serde_yaml::to_string(&document)?,
    )?;

    scaffold_runtime_packages(&args.dir, &package_templates_dir(), &args.runtime)?;

    println!("Function {} added to the stack", args.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_trigger_entries_match_the_document_shape() {
        match TriggerArg::Http.entry("api") {
            TriggerEntry::Http { route } => assert_eq!(route, "/api"),
            other => panic!("expected http entry, got {other:?}"),
        }
        match TriggerArg::Queue.entry("sender") {
            TriggerEntry::Queue { name, batch_size } => {
                assert!(name.is_empty());
                assert_eq!(batch_size, 1);
            }
            other => panic!("expected queue entry, got {other:?}"),
        }
    }
}
