//! In-memory broker backend.
//!
//! Stores streams and consumers in mutexed maps and counts every management
//! call, so tests can assert how many lookups and creates a provisioning
//! pass performed without a running broker.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use coupe_common::error::{CoupeError, Result};

use crate::admin::BrokerAdmin;
use crate::resource::{ConsumerSpec, StreamSpec};

/// Call counts recorded by a [`MemoryBroker`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Number of stream lookups.
    pub stream_lookups: usize,
    /// Number of stream creations.
    pub stream_creates: usize,
    /// Number of consumer lookups.
    pub consumer_lookups: usize,
    /// Number of consumer creations.
    pub consumer_creates: usize,
}

#[derive(Debug, Default)]
struct State {
    streams: BTreeMap<String, StreamSpec>,
    consumers: BTreeMap<(String, String), ConsumerSpec>,
    counts: CallCounts,
    fail_stream_creates: bool,
}

/// An in-memory [`BrokerAdmin`] used by tests.
#[derive(Debug, Default)]
pub struct MemoryBroker {
    state: Mutex<State>,
}

impl MemoryBroker {
    /// Creates an empty in-memory broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the call counts recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn counts(&self) -> CallCounts {
        self.state.lock().unwrap().counts
    }

    /// Resets the call counts, keeping provisioned resources.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn reset_counts(&self) {
        self.state.lock().unwrap().counts = CallCounts::default();
    }

    /// Makes every subsequent stream creation fail, to exercise the
    /// provisioner's fail-fast path.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_stream_creates(&self) {
        self.state.lock().unwrap().fail_stream_creates = true;
    }

    /// Returns the stored stream descriptor, if provisioned.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<StreamSpec> {
        self.state.lock().unwrap().streams.get(name).cloned()
    }

    /// Returns the stored consumer descriptor, if provisioned.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn consumer(&self, stream: &str, durable: &str) -> Option<ConsumerSpec> {
        self.state
            .lock()
            .unwrap()
            .consumers
            .get(&(stream.to_owned(), durable.to_owned()))
            .cloned()
    }
}

#[async_trait]
impl BrokerAdmin for MemoryBroker {
    async fn get_stream(&self, name: &str) -> Result<Option<StreamSpec>> {
        let mut state = self.state.lock().unwrap();
        state.counts.stream_lookups += 1;
        Ok(state.streams.get(name).cloned())
    }

    async fn create_stream(&self, spec: &StreamSpec) -> Result<StreamSpec> {
        let mut state = self.state.lock().unwrap();
        state.counts.stream_creates += 1;
        if state.fail_stream_creates {
            return Err(CoupeError::Provisioning {
                resource: format!("stream {}", spec.name),
                message: "injected failure".into(),
            });
        }
        let _ = state.streams.insert(spec.name.clone(), spec.clone());
        Ok(spec.clone())
    }

    async fn get_consumer(&self, stream: &str, durable: &str) -> Result<Option<ConsumerSpec>> {
        let mut state = self.state.lock().unwrap();
        state.counts.consumer_lookups += 1;
        Ok(state
            .consumers
            .get(&(stream.to_owned(), durable.to_owned()))
            .cloned())
    }

    async fn create_consumer(&self, spec: &ConsumerSpec) -> Result<ConsumerSpec> {
        let mut state = self.state.lock().unwrap();
        state.counts.consumer_creates += 1;
        if !state.streams.contains_key(&spec.stream) {
            return Err(CoupeError::Provisioning {
                resource: format!("consumer {}", spec.durable_name),
                message: format!("stream {} does not exist", spec.stream),
            });
        }
        let _ = state
            .consumers
            .insert((spec.stream.clone(), spec.durable_name.clone()), spec.clone());
        Ok(spec.clone())
    }
}
