//! Compose service graph: platform services plus one service per function.
//!
//! The graph is a plain value and its YAML rendering preserves insertion
//! order, so compiling the same configuration twice yields byte-identical
//! output and deployments can be diffed.

use std::collections::{BTreeMap, BTreeSet};

use coupe_common::constants::{
    CADDY_IMAGE, NATS_CLIENT_PORT, NATS_HOST_PORT, NATS_IMAGE, NATS_INTERNAL_URL, SABLIER_IMAGE,
    SENTINEL_IMAGE, WAKER_IMAGE,
};
use coupe_common::error::Result;
use coupe_common::names;
use coupe_config::{StackConfig, Trigger};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Containers for which the build-preparation step found a `.env` file.
///
/// Returned by build preparation and passed into the compiler as a value;
/// the compiler never learns where the files came from.
#[derive(Debug, Clone, Default)]
pub struct EnvFileSet(BTreeSet<String>);

impl EnvFileSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `container` has a `.env` file in its build directory.
    pub fn insert(&mut self, container: impl Into<String>) {
        let _ = self.0.insert(container.into());
    }

    /// Whether `container` has a `.env` file.
    #[must_use]
    pub fn contains(&self, container: &str) -> bool {
        self.0.contains(container)
    }
}

/// One compose service definition.
#[derive(Debug, Clone, Default)]
pub struct ServiceDefinition {
    /// Compose service key.
    pub name: String,
    /// Container name (derived by the naming scheme).
    pub container_name: String,
    /// Image reference, for platform services.
    pub image: Option<String>,
    /// Build context, for function services.
    pub build: Option<String>,
    /// Container command override.
    pub command: Vec<String>,
    /// Restart policy.
    pub restart: Option<String>,
    /// Published ports (`host:container`).
    pub ports: Vec<String>,
    /// Volume mounts.
    pub volumes: Vec<String>,
    /// Start-ordering dependencies.
    pub depends_on: Vec<String>,
    /// Profile tags used to bring up subsets of the topology.
    pub profiles: Vec<String>,
    /// Container labels.
    pub labels: Vec<String>,
    /// Environment mapping, in insertion order.
    pub environment: Vec<(String, String)>,
    /// Env files loaded into the container.
    pub env_file: Vec<String>,
}

/// The full service graph for one stack.
#[derive(Debug, Clone)]
pub struct ServiceGraph {
    /// Compose project name.
    pub project_name: String,
    /// Services in deterministic emission order.
    pub services: Vec<ServiceDefinition>,
    /// Named volumes.
    pub volumes: Vec<String>,
}

impl ServiceGraph {
    /// Renders the graph as docker-compose YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Looks up a service by its compose key.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name == name)
    }
}

impl Serialize for ServiceGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("name", &self.project_name)?;
        map.serialize_entry("services", &Services(&self.services))?;
        map.serialize_entry("volumes", &Volumes(&self.volumes))?;
        map.end()
    }
}

struct Services<'a>(&'a [ServiceDefinition]);

impl Serialize for Services<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for service in self.0 {
            map.serialize_entry(&service.name, &Body(service))?;
        }
        map.end()
    }
}

struct Volumes<'a>(&'a [String]);

impl Serialize for Volumes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for name in self.0 {
            map.serialize_entry(name, &())?;
        }
        map.end()
    }
}

struct Body<'a>(&'a ServiceDefinition);

impl Serialize for Body<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let s = self.0;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("container_name", &s.container_name)?;
        if let Some(image) = &s.image {
            map.serialize_entry("image", image)?;
        }
        if let Some(build) = &s.build {
            map.serialize_entry("build", build)?;
        }
        if !s.command.is_empty() {
            map.serialize_entry("command", &s.command)?;
        }
        if let Some(restart) = &s.restart {
            map.serialize_entry("restart", restart)?;
        }
        if !s.ports.is_empty() {
            map.serialize_entry("ports", &s.ports)?;
        }
        if !s.volumes.is_empty() {
            map.serialize_entry("volumes", &s.volumes)?;
        }
        if !s.depends_on.is_empty() {
            map.serialize_entry("depends_on", &s.depends_on)?;
        }
        if !s.profiles.is_empty() {
            map.serialize_entry("profiles", &s.profiles)?;
        }
        if !s.labels.is_empty() {
            map.serialize_entry("labels", &s.labels)?;
        }
        if !s.environment.is_empty() {
            map.serialize_entry("environment", &Environment(&s.environment))?;
        }
        if !s.env_file.is_empty() {
            map.serialize_entry("env_file", &s.env_file)?;
        }
        map.end()
    }
}

struct Environment<'a>(&'a [(String, String)]);

impl Serialize for Environment<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Builds the service graph: fixed platform services first, then one service
/// per function in declaration order.
#[must_use]
pub fn service_graph(config: &StackConfig, env_files: &EnvFileSet) -> ServiceGraph {
    let uses_broker = config.uses_broker();
    let has_consumers = config.has_consumer_functions();

    let mut services = Vec::new();
    services.push(sablier_service(config));
    services.push(sentinel_service(config, uses_broker));
    services.push(caddy_service(config));
    if uses_broker {
        services.push(nats_service(config));
    }
    if has_consumers {
        services.push(waker_service(config));
    }
    for function in &config.functions {
        services.push(function_service(function, uses_broker, env_files));
    }

    let mut volumes = vec!["caddy_data".to_owned(), "caddy_config".to_owned()];
    if uses_broker {
        volumes.push("nats_data".to_owned());
    }

    ServiceGraph {
        project_name: config.project_name.clone(),
        services,
        volumes,
    }
}

fn sablier_service(config: &StackConfig) -> ServiceDefinition {
    ServiceDefinition {
        name: "sablier".into(),
        container_name: names::platform_container(&config.name, "sablier"),
        image: Some(SABLIER_IMAGE.into()),
        command: vec!["start".into(), "--provider.name=docker".into()],
        volumes: vec!["/var/run/docker.sock:/var/run/docker.sock".into()],
        profiles: vec!["platform".into()],
        ..ServiceDefinition::default()
    }
}

fn sentinel_service(config: &StackConfig, uses_broker: bool) -> ServiceDefinition {
    let mut command = vec![
        "sentinel".into(),
        "--config".into(),
        "/coupe.yaml".into(),
    ];
    if uses_broker {
        command.push("--nats-url".into());
        command.push(NATS_INTERNAL_URL.into());
    }
    ServiceDefinition {
        name: "sentinel".into(),
        container_name: names::platform_container(&config.name, "sentinel"),
        image: Some(SENTINEL_IMAGE.into()),
        command,
        volumes: vec!["../coupe.yaml:/coupe.yaml".into()],
        profiles: vec!["platform".into()],
        ..ServiceDefinition::default()
    }
}

fn caddy_service(config: &StackConfig) -> ServiceDefinition {
    ServiceDefinition {
        name: "caddy".into(),
        container_name: names::platform_container(&config.name, "caddy"),
        image: Some(CADDY_IMAGE.into()),
        restart: Some("unless-stopped".into()),
        ports: vec![format!("{}:80", config.http_port)],
        volumes: vec![
            "./platform/caddy/Caddyfile:/etc/caddy/Caddyfile".into(),
            "caddy_data:/data".into(),
            "caddy_config:/config".into(),
        ],
        depends_on: vec!["sablier".into(), "sentinel".into()],
        profiles: vec!["platform".into()],
        ..ServiceDefinition::default()
    }
}

fn nats_service(config: &StackConfig) -> ServiceDefinition {
    ServiceDefinition {
        name: "nats".into(),
        container_name: names::platform_container(&config.name, "nats"),
        image: Some(NATS_IMAGE.into()),
        command: vec!["--js".into(), "--sd=/data".into()],
        restart: Some("unless-stopped".into()),
        ports: vec![format!("{NATS_HOST_PORT}:{NATS_CLIENT_PORT}")],
        volumes: vec!["nats_data:/data".into()],
        profiles: vec!["platform".into()],
        ..ServiceDefinition::default()
    }
}

fn waker_service(config: &StackConfig) -> ServiceDefinition {
    let subscriptions = subscription_config(config);
    // BTreeMap keys keep the JSON deterministic.
    let subscriptions_json =
        serde_json::to_string(&subscriptions).unwrap_or_else(|_| "{}".to_owned());
    ServiceDefinition {
        name: "waker".into(),
        container_name: names::platform_container(&config.name, "waker"),
        image: Some(WAKER_IMAGE.into()),
        depends_on: vec!["caddy".into(), "nats".into()],
        profiles: vec!["platform".into()],
        environment: vec![
            ("NATS_URL".into(), NATS_INTERNAL_URL.into()),
            ("SUBSCRIPTION_CONFIG".into(), subscriptions_json),
        ],
        ..ServiceDefinition::default()
    }
}

/// Maps each subject of a consumed queue/stream to the containers that must
/// be woken when a message arrives on it.
#[must_use]
pub fn subscription_config(config: &StackConfig) -> BTreeMap<String, Vec<String>> {
    let mut subscriptions: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for function in &config.functions {
        let resource = match &function.trigger {
            Trigger::Queue { name, .. } => config.queue(name),
            Trigger::Stream { name, .. } => config.stream(name),
            _ => None,
        };
        if let Some(resource) = resource {
            for subject in &resource.subjects {
                subscriptions
                    .entry(subject.clone())
                    .or_default()
                    .push(function.container_name.clone());
            }
        }
    }
    subscriptions
}

fn function_service(
    function: &coupe_config::Function,
    uses_broker: bool,
    env_files: &EnvFileSet,
) -> ServiceDefinition {
    let kind = function.trigger.kind();
    let sablier_enabled = !matches!(function.trigger, Trigger::PubSub { .. });

    let mut environment = vec![
        ("FUNCTION_NAME".into(), function.name.clone()),
        ("CONTAINER_NAME".into(), function.container_name.clone()),
        (
            "IDLE_TIMEOUT_SECS".into(),
            function.idle_timeout_secs.to_string(),
        ),
    ];
    if uses_broker {
        environment.push(("NATS_URL".into(), NATS_INTERNAL_URL.into()));
    }
    match &function.trigger {
        Trigger::Http { .. } => {}
        Trigger::PubSub { subjects } => {
            environment.push(("SUBJECTS".into(), subjects.join(",")));
        }
        Trigger::Stream {
            name,
            stream_name,
            batch_size,
        } => {
            environment.push(("STREAM_NAME".into(), name.clone()));
            environment.push(("NATS_STREAM_NAME".into(), stream_name.clone()));
            environment.push(("BATCH_SIZE".into(), batch_size.to_string()));
        }
        Trigger::Queue {
            name,
            stream_name,
            batch_size,
        } => {
            environment.push(("QUEUE_NAME".into(), name.clone()));
            environment.push(("NATS_STREAM_NAME".into(), stream_name.clone()));
            environment.push(("BATCH_SIZE".into(), batch_size.to_string()));
        }
    }

    let env_file = if env_files.contains(&function.container_name) {
        vec![".env".to_owned()]
    } else {
        Vec::new()
    };

    ServiceDefinition {
        name: function.container_name.clone(),
        container_name: function.container_name.clone(),
        build: Some(format!("./functions/{}", function.name)),
        labels: vec![
            format!("sablier.enable={sablier_enabled}"),
            format!("sablier.group={}", function.container_name),
        ],
        profiles: vec![
            "function".into(),
            kind.to_string(),
            if function.trigger.is_sync() { "sync" } else { "async" }.into(),
        ],
        environment,
        env_file,
        ..ServiceDefinition::default()
    }
}
