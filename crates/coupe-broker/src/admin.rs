//! Management-API seam between the provisioner and a concrete broker.
//!
//! Lookups return `Ok(None)` when the resource does not exist; every other
//! failure is an error. This keeps the provisioner's "not found, so create"
//! branch separate from real failures by construction.

use async_trait::async_trait;
use coupe_common::error::Result;

use crate::resource::{ConsumerSpec, StreamSpec};

/// Broker management operations the provisioner needs.
///
/// Implemented by [`crate::nats::JetStreamAdmin`] against a real broker and
/// by [`crate::memory::MemoryBroker`] for tests.
#[async_trait]
pub trait BrokerAdmin: Send + Sync {
    /// Looks up a stream by name. `Ok(None)` means the stream does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than not-found.
    async fn get_stream(&self, name: &str) -> Result<Option<StreamSpec>>;

    /// Creates a stream, returning the broker's view of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker rejects the creation.
    async fn create_stream(&self, spec: &StreamSpec) -> Result<StreamSpec>;

    /// Looks up a durable consumer on a stream. `Ok(None)` means absent.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than not-found.
    async fn get_consumer(&self, stream: &str, durable: &str) -> Result<Option<ConsumerSpec>>;

    /// Creates a durable consumer, returning the broker's view of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the broker rejects the creation.
    async fn create_consumer(&self, spec: &ConsumerSpec) -> Result<ConsumerSpec>;
}
