//! `coupe teardown` — Stop the stack and remove its build artifacts.

use std::path::PathBuf;

use clap::Args;
use coupe_common::error::CoupeError;

use crate::external::{ContainerRuntime, DockerCompose};
use crate::prepare::BuildLayout;

/// Arguments for the `teardown` command.
#[derive(Args, Debug)]
pub struct TeardownArgs {
    /// Stack directory.
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

/// Executes the `teardown` command.
///
/// # Errors
///
/// Returns an error if the stack was never deployed, the container runtime
/// fails, or the build directory cannot be removed.
pub fn execute(args: TeardownArgs) -> anyhow::Result<()> {
    DockerCompose::preflight()?;
    let layout = BuildLayout::new(&args.dir);
    if !layout.compose_path.is_file() {
        return Err(CoupeError::Validation {
            message: format!("no deployed stack found at {}", args.dir.display()),
        }
        .into());
    }

    DockerCompose.down(&layout.compose_path)?;
    std::fs::remove_dir_all(&layout.build_dir).map_err(|source| CoupeError::Io {
        path: layout.build_dir.clone(),
        source,
    })?;

    println!("Stack torn down");
    Ok(())
}
