//! `coupe init` — Create an empty stack configuration.

use std::path::PathBuf;

use clap::Args;
use coupe_common::constants::CONFIG_FILE_NAME;
use coupe_common::error::CoupeError;
use coupe_config::StackDocument;

use crate::fsutil;

/// Arguments for the `init` command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Name of the new stack.
    pub name: String,

    /// Directory to create the stack in.
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

/// Executes the `init` command.
///
/// # Errors
///
/// Returns an error if a `coupe.yaml` already exists in the target
/// directory or the file cannot be written.
pub fn execute(args: InitArgs) -> anyhow::Result<()> {
    let config_path = args.dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        return Err(CoupeError::Validation {
            message: format!("coupe stack already exists at {}", config_path.display()),
        }
        .into());
    }

    let document = StackDocument::empty(&args.name);
    fsutil::ensure_dir(&args.dir)?;
    fsutil::write_file(&config_path, &serde_yaml::to_string(&document)?)?;

    println!("Coupe stack created at {}", args.dir.display());
    Ok(())
}
