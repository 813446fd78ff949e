//! `coupe deploy` — Compile the stack and bring it up.

use std::path::PathBuf;

use clap::Args;
use coupe_broker::JetStreamAdmin;
use coupe_common::constants::{NATS_HOST_PORT, function_templates_dir};
use coupe_config::TriggerKind;

use crate::external::{ContainerRuntime, DockerCaddyFmt, DockerCompose, ProxyFormatter};
use crate::fsutil;
use crate::prepare::{self, BuildLayout};

/// Arguments for the `deploy` command.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Stack directory.
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Broker management URL used for provisioning.
    #[arg(long, env = "COUPE_NATS_URL", default_value_t = default_nats_url())]
    pub nats_url: String,
}

fn default_nats_url() -> String {
    format!("nats://localhost:{NATS_HOST_PORT}")
}

/// Executes the `deploy` command.
///
/// # Errors
///
/// Returns an error if validation, build preparation, an external tool, or
/// broker provisioning fails. Re-running after a failure is safe: every
/// step either regenerates its artifacts or converges on the broker state
/// already provisioned.
pub async fn execute(args: DeployArgs) -> anyhow::Result<()> {
    DockerCompose::preflight()?;
    let config = coupe_config::load_stack(&args.dir)?;

    let env_files = prepare::prepare_build(&args.dir, &function_templates_dir(), &config)?;
    let topology = coupe_topology::compile(&config, &env_files);

    let layout = BuildLayout::new(&args.dir);
    fsutil::ensure_dir(&layout.caddy_dir)?;
    fsutil::write_file(&layout.compose_path, &topology.services.to_yaml()?)?;
    fsutil::write_file(
        &layout.caddyfile_path,
        &coupe_topology::render_caddyfile(&topology.routes),
    )?;
    DockerCaddyFmt.format(&layout.caddy_dir)?;

    let runtime = DockerCompose;
    runtime.up_platform(&layout.compose_path)?;

    let plan = coupe_broker::plan(&config);
    if !plan.is_empty() {
        let admin = JetStreamAdmin::connect(&args.nats_url).await?;
        let report = coupe_broker::provision(&plan, &admin).await?;
        tracing::info!(
            created = report.created.len(),
            reused = report.reused.len(),
            "broker resources provisioned"
        );
    }

    runtime.build_functions(&layout.compose_path)?;
    if config
        .functions
        .iter()
        .any(|f| f.trigger.kind() == TriggerKind::PubSub)
    {
        runtime.start_profile(&layout.compose_path, "pubsub")?;
    }

    println!("Deployment complete!");
    Ok(())
}
