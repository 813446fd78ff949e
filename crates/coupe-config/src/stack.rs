//! Normalized, immutable stack configuration.
//!
//! Produced once by [`crate::validate::validate`] and consumed unchanged by
//! the topology compiler and the broker provisioner. All derived identifiers
//! (container names, broker stream names) are precomputed here so downstream
//! components never re-derive them.

use std::fmt;

use serde::Serialize;

/// Normalized stack configuration. The single source of truth for a
/// compilation run; constructed by the validator and immutable thereafter.
#[derive(Debug, Clone, Serialize)]
pub struct StackConfig {
    /// Stack name as declared.
    pub name: String,
    /// Compose project name (`coupe_stack_{name}`).
    pub project_name: String,
    /// Host port the reverse proxy publishes.
    pub http_port: u16,
    /// Functions in declaration order.
    pub functions: Vec<Function>,
    /// Declared work queues with precomputed broker stream names.
    pub queues: Vec<BrokerResourceConfig>,
    /// Declared durable streams with precomputed broker stream names.
    pub streams: Vec<BrokerResourceConfig>,
}

/// A validated function with its derived container name.
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    /// Function name, unique within the stack.
    pub name: String,
    /// Runtime identifier used to select a handler template.
    pub runtime: String,
    /// Seconds of inactivity before scale-to-zero.
    pub idle_timeout_secs: u64,
    /// Derived container name (`coupe_function_{stack}_{name}`).
    pub container_name: String,
    /// Resolved trigger.
    pub trigger: Trigger,
}

/// Resolved trigger. Stream and queue variants carry the broker stream name
/// the reference resolved to, so consumers never look it up again.
#[derive(Debug, Clone, Serialize)]
pub enum Trigger {
    /// HTTP request routed through the reverse proxy.
    Http {
        /// Route path served by the proxy.
        route: String,
    },
    /// Message on any of the subscribed subjects.
    PubSub {
        /// Broker subjects to subscribe.
        subjects: Vec<String>,
    },
    /// Batches pulled from a declared durable stream.
    Stream {
        /// Declared stream name as referenced in the document.
        name: String,
        /// Broker stream name the reference resolved to.
        stream_name: String,
        /// Messages pulled per batch.
        batch_size: u64,
    },
    /// Batches pulled from a declared work queue.
    Queue {
        /// Declared queue name as referenced in the document.
        name: String,
        /// Broker stream name the reference resolved to.
        stream_name: String,
        /// Messages pulled per batch.
        batch_size: u64,
    },
}

/// Trigger discriminator, used for compose profiles and template paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriggerKind {
    /// HTTP trigger.
    Http,
    /// Pub/sub trigger.
    PubSub,
    /// Durable stream trigger.
    Stream,
    /// Work queue trigger.
    Queue,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::PubSub => write!(f, "pubsub"),
            Self::Stream => write!(f, "stream"),
            Self::Queue => write!(f, "queue"),
        }
    }
}

impl Trigger {
    /// Returns the trigger discriminator.
    #[must_use]
    pub const fn kind(&self) -> TriggerKind {
        match self {
            Self::Http { .. } => TriggerKind::Http,
            Self::PubSub { .. } => TriggerKind::PubSub,
            Self::Stream { .. } => TriggerKind::Stream,
            Self::Queue { .. } => TriggerKind::Queue,
        }
    }

    /// Whether the function serves requests synchronously through the proxy.
    #[must_use]
    pub const fn is_sync(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Whether the trigger pulls from a durable broker stream.
    #[must_use]
    pub const fn is_consumer(&self) -> bool {
        matches!(self, Self::Stream { .. } | Self::Queue { .. })
    }

    /// Whether the trigger needs the broker at all.
    #[must_use]
    pub const fn uses_broker(&self) -> bool {
        !matches!(self, Self::Http { .. })
    }
}

/// A declared queue or stream with its derived broker stream name.
#[derive(Debug, Clone, Serialize)]
pub struct BrokerResourceConfig {
    /// Resource name as declared.
    pub name: String,
    /// Derived broker stream name (`{stack}_{kind}_{name}`).
    pub stream_name: String,
    /// Broker subjects captured by the resource.
    pub subjects: Vec<String>,
    /// Maximum message age in seconds before eviction.
    pub max_age_secs: Option<u64>,
    /// Maximum number of retained messages.
    pub max_num_messages: Option<u64>,
    /// Window in seconds for broker-side duplicate suppression.
    pub duplicate_window_secs: Option<u64>,
}

impl StackConfig {
    /// Whether any function in the stack needs the broker.
    #[must_use]
    pub fn uses_broker(&self) -> bool {
        self.functions.iter().any(|f| f.trigger.uses_broker())
    }

    /// Whether any function consumes from a durable stream or queue.
    #[must_use]
    pub fn has_consumer_functions(&self) -> bool {
        self.functions.iter().any(|f| f.trigger.is_consumer())
    }

    /// Looks up a declared queue by name.
    #[must_use]
    pub fn queue(&self, name: &str) -> Option<&BrokerResourceConfig> {
        self.queues.iter().find(|q| q.name == name)
    }

    /// Looks up a declared stream by name.
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&BrokerResourceConfig> {
        self.streams.iter().find(|s| s.name == name)
    }
}
