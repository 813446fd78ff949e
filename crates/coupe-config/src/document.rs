//! Raw serde model of the `coupe.yaml` stack document.
//!
//! This is the wire shape exactly as written by the operator, before any
//! validation or defaulting beyond what serde applies. The validator turns a
//! [`StackDocument`] into the normalized [`crate::stack::StackConfig`].

use coupe_common::constants::{DEFAULT_BATCH_SIZE, DEFAULT_HTTP_PORT, DEFAULT_IDLE_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};

/// Top-level stack document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackDocument {
    /// Stack name; namespaces every derived identifier.
    pub name: String,
    /// Host port the reverse proxy publishes.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Declared functions, in deployment order.
    #[serde(default)]
    pub functions: Vec<FunctionEntry>,
    /// Declared work queues.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queues: Vec<ResourceEntry>,
    /// Declared durable streams.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<ResourceEntry>,
}

impl StackDocument {
    /// An empty document for a freshly initialized stack.
    #[must_use]
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            http_port: DEFAULT_HTTP_PORT,
            functions: Vec::new(),
            queues: Vec::new(),
            streams: Vec::new(),
        }
    }
}

/// A single function declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionEntry {
    /// Function name, unique within the stack.
    pub name: String,
    /// Runtime identifier used to select a handler template.
    pub runtime: String,
    /// Seconds of inactivity before the container is scaled to zero.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Event source that invokes the function.
    pub trigger: TriggerEntry,
}

/// Tagged trigger union. An unknown `type:` discriminator fails
/// deserialization, which the loader reports as a validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TriggerEntry {
    /// Invoked by an HTTP request routed through the reverse proxy.
    #[serde(rename = "http")]
    Http {
        /// Route path served by the proxy.
        route: String,
    },
    /// Invoked for every message on any of the subscribed subjects.
    #[serde(rename = "pubsub")]
    PubSub {
        /// Broker subjects to subscribe.
        subjects: Vec<String>,
    },
    /// Invoked with batches pulled from a declared durable stream.
    #[serde(rename = "stream")]
    Stream {
        /// Name of a declared stream.
        name: String,
        /// Messages pulled per batch.
        #[serde(default = "default_batch_size")]
        batch_size: u64,
    },
    /// Invoked with batches pulled from a declared work queue.
    #[serde(rename = "queue")]
    Queue {
        /// Name of a declared queue.
        name: String,
        /// Messages pulled per batch.
        #[serde(default = "default_batch_size")]
        batch_size: u64,
    },
}

impl TriggerEntry {
    /// Returns the discriminator string as written in the document.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::PubSub { .. } => "pubsub",
            Self::Stream { .. } => "stream",
            Self::Queue { .. } => "queue",
        }
    }
}

/// A declared queue or stream resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Resource name, unique within its list.
    pub name: String,
    /// Broker subjects captured by the resource.
    pub subjects: Vec<String>,
    /// Maximum message age in seconds before eviction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_secs: Option<u64>,
    /// Maximum number of retained messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_num_messages: Option<u64>,
    /// Window in seconds for broker-side duplicate suppression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_window_secs: Option<u64>,
}

const fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

const fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}

const fn default_batch_size() -> u64 {
    DEFAULT_BATCH_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document_with_defaults() {
        let doc: StackDocument = serde_yaml::from_str(
            "\
name: blog
functions:
- name: api
  runtime: rust
  trigger:
    type: http
    route: /api
",
        )
        .expect("should parse");
        assert_eq!(doc.name, "blog");
        assert_eq!(doc.http_port, 8080);
        assert_eq!(doc.functions[0].idle_timeout_secs, 300);
        assert!(doc.queues.is_empty());
    }

    #[test]
    fn parses_queue_trigger_with_default_batch_size() {
        let doc: StackDocument = serde_yaml::from_str(
            "\
name: jobs
functions:
- name: sender
  runtime: rust
  trigger:
    type: queue
    name: emails
queues:
- name: emails
  subjects: [jobs.email]
",
        )
        .expect("should parse");
        match &doc.functions[0].trigger {
            TriggerEntry::Queue { name, batch_size } => {
                assert_eq!(name, "emails");
                assert_eq!(*batch_size, 1);
            }
            other => panic!("expected queue trigger, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_trigger_discriminator() {
        let result: Result<StackDocument, _> = serde_yaml::from_str(
            "\
name: blog
functions:
- name: api
  runtime: rust
  trigger:
    type: cron
    schedule: '* * * * *'
",
        );
        let err = result.expect_err("cron is not a trigger");
        assert!(err.to_string().contains("cron"), "got: {err}");
    }

    #[test]
    fn resource_limits_are_optional() {
        let doc: StackDocument = serde_yaml::from_str(
            "\
name: jobs
streams:
- name: events
  subjects: [jobs.events]
  max_age_secs: 3600
",
        )
        .expect("should parse");
        assert_eq!(doc.streams[0].max_age_secs, Some(3600));
        assert_eq!(doc.streams[0].max_num_messages, None);
    }
}
