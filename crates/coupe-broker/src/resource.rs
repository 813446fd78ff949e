//! Broker-facing resource descriptors.
//!
//! These are the shapes sent to (and read back from) the broker's management
//! API; they carry no coupe-level names beyond what the naming scheme already
//! derived.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Retention semantics of a provisioned broker stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Retention {
    /// Each message is delivered to exactly one consumer group and removed
    /// once acknowledged. Backs declared queues.
    WorkQueue,
    /// Messages are retained until age/count limits are hit, independent of
    /// consumption. Backs declared streams.
    Limits,
}

impl fmt::Display for Retention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkQueue => write!(f, "workqueue"),
            Self::Limits => write!(f, "limits"),
        }
    }
}

/// Descriptor of a broker stream to get-or-create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamSpec {
    /// Stream name, derived by the naming scheme.
    pub name: String,
    /// Subjects captured by the stream.
    pub subjects: Vec<String>,
    /// Retention semantics.
    pub retention: Retention,
    /// Maximum number of retained messages, if bounded.
    pub max_messages: Option<i64>,
    /// Maximum message age, if bounded.
    pub max_age: Option<Duration>,
    /// Duplicate-suppression window, if any.
    pub duplicate_window: Option<Duration>,
}

/// Descriptor of a durable pull consumer to get-or-create.
///
/// Consumers always use explicit acknowledgment and deliver-from-start, so
/// a freshly woken function can drain everything it missed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsumerSpec {
    /// Stream the consumer reads from.
    pub stream: String,
    /// Durable name; the consuming function's container name.
    pub durable_name: String,
    /// Maximum messages pulled per batch.
    pub max_batch: i64,
}
