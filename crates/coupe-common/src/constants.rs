//! Platform defaults, image references, and the `~/.coupe` directory layout.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Default host port the reverse proxy publishes.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default idle timeout before a function container is scaled to zero.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Default pull batch size for stream and queue consumers.
pub const DEFAULT_BATCH_SIZE: u64 = 1;

/// Fixed blocking-wait timeout the proxy holds a request while a cold
/// container starts. Independent of the per-function idle timeout.
pub const BLOCKING_TIMEOUT_SECS: u64 = 30;

/// File name of the declarative stack document.
pub const CONFIG_FILE_NAME: &str = "coupe.yaml";

/// Reverse proxy image with the sablier scale-to-zero plugin compiled in.
pub const CADDY_IMAGE: &str = "caddy:2.6.4-with-sablier";

/// Scale-to-zero activator image.
pub const SABLIER_IMAGE: &str = "coupe/sablier";

/// Platform supervisor image.
pub const SENTINEL_IMAGE: &str = "coupe/sentinel";

/// Consumer-function waker image.
pub const WAKER_IMAGE: &str = "coupe/waker";

/// Message broker image, started with JetStream enabled.
pub const NATS_IMAGE: &str = "nats:latest";

/// Broker URL as seen from inside the stack network.
pub const NATS_INTERNAL_URL: &str = "nats://nats:4222";

/// Broker client port inside the container.
pub const NATS_CLIENT_PORT: u16 = 4222;

/// Host port the broker is published on so the provisioner can reach it.
pub const NATS_HOST_PORT: u16 = 56222;

static COUPE_DIR: OnceLock<PathBuf> = OnceLock::new();

fn resolve_coupe_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        return PathBuf::from(home).join(".coupe");
    }
    PathBuf::from("/var/lib/coupe")
}

/// Returns the coupe home directory (`~/.coupe`) for this session.
pub fn coupe_dir() -> &'static PathBuf {
    COUPE_DIR.get_or_init(resolve_coupe_dir)
}

/// Returns the root directory of the installed templates.
pub fn templates_dir() -> PathBuf {
    coupe_dir().join("templates")
}

/// Returns the directory holding function trigger templates, keyed by
/// runtime and trigger kind.
pub fn function_templates_dir() -> PathBuf {
    templates_dir().join("functions")
}

/// Returns the directory holding runtime support package templates.
pub fn package_templates_dir() -> PathBuf {
    templates_dir().join("packages")
}
