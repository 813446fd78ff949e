//! `coupe scaffold` — Create the stack's source layout and runtime packages.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::Args;
use coupe_common::constants::package_templates_dir;
use coupe_common::error::{CoupeError, Result};

use crate::fsutil;

/// Arguments for the `scaffold` command.
#[derive(Args, Debug)]
pub struct ScaffoldArgs {
    /// Stack directory.
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

/// Executes the `scaffold` command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the layout cannot
/// be written.
pub fn execute(args: ScaffoldArgs) -> anyhow::Result<()> {
    let config = coupe_config::load_stack(&args.dir)?;
    fsutil::ensure_dir(&args.dir.join("functions"))?;
    fsutil::ensure_dir(&args.dir.join("packages"))?;

    let runtimes: BTreeSet<&str> = config.functions.iter().map(|f| f.runtime.as_str()).collect();
    for runtime in runtimes {
        scaffold_runtime_packages(&args.dir, &package_templates_dir(), runtime)?;
    }
    Ok(())
}

/// Copies the runtime's package templates into `packages/{runtime}`,
/// skipping packages the operator already has. Copied packages are added
/// to the runtime directory's `.gitignore` since they are generated.
pub fn scaffold_runtime_packages(
    source_dir: &Path,
    package_templates: &Path,
    runtime: &str,
) -> Result<()> {
    let runtime_templates = package_templates.join(runtime);
    if !runtime_templates.is_dir() {
        return Ok(());
    }

    let runtime_packages = source_dir.join("packages").join(runtime);
    for package in fsutil::subdirectories(&runtime_templates)? {
        let destination = runtime_packages.join(&package);
        if destination.exists() {
            continue;
        }
        ensure_gitignore_contains(&runtime_packages, &package)?;
        fsutil::copy_dir(&runtime_templates.join(&package), &destination)?;
    }
    Ok(())
}

fn ensure_gitignore_contains(dir: &Path, line: &str) -> Result<()> {
    fsutil::ensure_dir(dir)?;
    let path = dir.join(".gitignore");
    let existing = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(CoupeError::Io {
                path: path.clone(),
                source,
            });
        }
    };

    let mut lines: Vec<&str> = existing.lines().collect();
    if lines.contains(&line) {
        return Ok(());
    }
    lines.push(line);
    fsutil::write_file(&path, &(lines.join("\n") + "\n"))
}
