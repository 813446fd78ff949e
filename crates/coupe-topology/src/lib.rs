//! # coupe-topology
//!
//! Pure topology compiler. Consumes a validated [`StackConfig`] and produces:
//! - **Compose**: the service graph the container runtime applies.
//! - **Routes**: the routing rules (rendered as a Caddyfile) the reverse
//!   proxy serves, with scale-to-zero groups bound per function.
//!
//! Compilation performs no I/O and is deterministic: the same configuration
//! always renders byte-identical artifacts.

pub mod compose;
pub mod routes;

use coupe_config::StackConfig;

pub use compose::{EnvFileSet, ServiceDefinition, ServiceGraph};
pub use routes::{RouteRule, render_caddyfile, route_rules};

/// Compiled deployment topology for one stack.
#[derive(Debug, Clone)]
pub struct Topology {
    /// Compose service graph.
    pub services: ServiceGraph,
    /// Reverse-proxy routing rules in function declaration order.
    pub routes: Vec<RouteRule>,
}

/// Compiles a validated configuration into its deployment topology.
///
/// Compiling an un-normalized document is impossible by construction: the
/// only way to obtain a [`StackConfig`] is through the validator.
#[must_use]
pub fn compile(config: &StackConfig, env_files: &EnvFileSet) -> Topology {
    tracing::info!(
        stack = config.name.as_str(),
        functions = config.functions.len(),
        "compiling topology"
    );
    Topology {
        services: compose::service_graph(config, env_files),
        routes: routes::route_rules(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coupe_config::document::{FunctionEntry, ResourceEntry, StackDocument, TriggerEntry};

    fn mixed_config() -> StackConfig {
        coupe_config::validate(StackDocument {
            name: "shop".into(),
            http_port: 8080,
            functions: vec![
                FunctionEntry {
                    name: "checkout".into(),
                    runtime: "rust".into(),
                    idle_timeout_secs: 120,
                    trigger: TriggerEntry::Http {
                        route: "/checkout".into(),
                    },
                },
                FunctionEntry {
                    name: "fulfiller".into(),
                    runtime: "rust".into(),
                    idle_timeout_secs: 300,
                    trigger: TriggerEntry::Queue {
                        name: "orders".into(),
                        batch_size: 10,
                    },
                },
            ],
            queues: vec![ResourceEntry {
                name: "orders".into(),
                subjects: vec!["shop.orders".into()],
                max_age_secs: Some(86_400),
                max_num_messages: None,
                duplicate_window_secs: None,
            }],
            streams: Vec::new(),
        })
        .expect("valid config")
    }

    #[test]
    fn compile_emits_services_and_routes() {
        let topology = compile(&mixed_config(), &EnvFileSet::new());
        // 5 platform + 2 functions
        assert_eq!(topology.services.services.len(), 7);
        assert_eq!(topology.routes.len(), 2);
    }

    #[test]
    fn compiled_artifacts_are_byte_identical_across_runs() {
        let config = mixed_config();
        let first = compile(&config, &EnvFileSet::new());
        let second = compile(&config, &EnvFileSet::new());
        assert_eq!(
            first.services.to_yaml().expect("yaml"),
            second.services.to_yaml().expect("yaml")
        );
        assert_eq!(
            render_caddyfile(&first.routes),
            render_caddyfile(&second.routes)
        );
    }
}
