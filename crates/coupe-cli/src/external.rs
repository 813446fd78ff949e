//! External tool collaborators: the container runtime and the Caddyfile
//! formatter.
//!
//! Both are trait seams so `deploy`/`teardown` logic can be exercised
//! without Docker installed. The real implementations shell out to
//! `docker compose` and a throwaway `caddy fmt` container.

use std::path::Path;
use std::process::Command;

use coupe_common::constants::CADDY_IMAGE;
use coupe_common::error::{CoupeError, Result};

/// Drives the container runtime for a stack's compose file.
pub trait ContainerRuntime {
    /// Starts the always-on platform services.
    fn up_platform(&self, compose_path: &Path) -> Result<()>;

    /// Builds the images for every function service.
    fn build_functions(&self, compose_path: &Path) -> Result<()>;

    /// Starts every service carrying the given profile.
    fn start_profile(&self, compose_path: &Path, profile: &str) -> Result<()>;

    /// Stops and removes the stack's containers, volumes, and images.
    fn down(&self, compose_path: &Path) -> Result<()>;
}

/// Normalizes a generated Caddyfile in place.
pub trait ProxyFormatter {
    /// Rewrites `caddy_dir/Caddyfile` into canonical formatting.
    fn format(&self, caddy_dir: &Path) -> Result<()>;
}

/// `docker compose` backed runtime.
pub struct DockerCompose;

impl DockerCompose {
    /// Checks that the `docker` binary is on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`CoupeError::ExternalTool`] when it is not.
    pub fn preflight() -> Result<()> {
        let _ = which::which("docker").map_err(|source| CoupeError::ExternalTool {
            command: "docker".to_owned(),
            message: format!("docker binary not found on PATH: {source}"),
        })?;
        Ok(())
    }

    fn compose(compose_path: &Path) -> Command {
        let mut command = Command::new("docker");
        let _ = command.arg("compose").arg("-f").arg(compose_path);
        command
    }
}

impl ContainerRuntime for DockerCompose {
    fn up_platform(&self, compose_path: &Path) -> Result<()> {
        let mut command = Self::compose(compose_path);
        let _ = command.args(["--profile", "platform", "up", "-d"]);
        run(command)
    }

    fn build_functions(&self, compose_path: &Path) -> Result<()> {
        let mut command = Self::compose(compose_path);
        let _ = command.args(["--profile", "function", "build"]);
        run(command)
    }

    fn start_profile(&self, compose_path: &Path, profile: &str) -> Result<()> {
        let mut command = Self::compose(compose_path);
        let _ = command.args(["--profile", profile, "up", "-d"]);
        run(command)
    }

    fn down(&self, compose_path: &Path) -> Result<()> {
        let mut command = Self::compose(compose_path);
        let _ = command.args([
            "--profile",
            "platform",
            "--profile",
            "function",
            "down",
            "--volumes",
            "--remove-orphans",
            "--rmi",
            "local",
        ]);
        run(command)
    }
}

/// Formats the Caddyfile with a short-lived `caddy fmt` container, so no
/// host Caddy install is required.
pub struct DockerCaddyFmt;

impl ProxyFormatter for DockerCaddyFmt {
    fn format(&self, caddy_dir: &Path) -> Result<()> {
        let mut command = Command::new("docker");
        let _ = command
            .args(["run", "--rm", "-v"])
            .arg(format!("{}:/work", caddy_dir.display()))
            .args([CADDY_IMAGE, "caddy", "fmt", "--overwrite", "/work/Caddyfile"]);
        run(command)
    }
}

fn run(mut command: Command) -> Result<()> {
    let rendered = render(&command);
    tracing::debug!(command = rendered.as_str(), "running external command");
    let output = command.output().map_err(|source| CoupeError::ExternalTool {
        command: rendered.clone(),
        message: source.to_string(),
    })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(CoupeError::ExternalTool {
            command: rendered,
            message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}

fn render(command: &Command) -> String {
    let mut rendered = command.get_program().to_string_lossy().into_owned();
    for arg in command.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}
