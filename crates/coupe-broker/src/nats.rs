//! NATS JetStream management backend.
//!
//! Lookups go through raw management-API info requests so not-found can be
//! classified by the broker's own error code; creations use the typed
//! JetStream API. The connection lives for one provisioning pass and is
//! released when the admin is dropped.

use std::time::Duration;

use async_nats::jetstream::{self, consumer, response::Response, stream};
use async_trait::async_trait;
use coupe_common::error::{CoupeError, Result};
use serde::Deserialize;

use crate::admin::BrokerAdmin;
use crate::resource::{ConsumerSpec, Retention, StreamSpec};

/// [`BrokerAdmin`] backed by a NATS JetStream management connection.
pub struct JetStreamAdmin {
    context: jetstream::Context,
}

impl JetStreamAdmin {
    /// Connects to the broker at `url`.
    ///
    /// # Errors
    ///
    /// Returns a provisioning error if the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = async_nats::connect(url)
            .await
            .map_err(|err| CoupeError::Provisioning {
                resource: format!("broker at {url}"),
                message: err.to_string(),
            })?;
        Ok(Self {
            context: jetstream::new(client),
        })
    }

    /// Wraps an existing JetStream context.
    #[must_use]
    pub fn from_context(context: jetstream::Context) -> Self {
        Self { context }
    }
}

/// Subset of the management API's stream info payload coupe cares about.
#[derive(Debug, Deserialize)]
struct StreamInfoPayload {
    config: StreamConfigPayload,
}

#[derive(Debug, Deserialize)]
struct StreamConfigPayload {
    name: String,
    #[serde(default)]
    subjects: Vec<String>,
    #[serde(default)]
    retention: String,
    #[serde(default)]
    max_msgs: i64,
    /// Nanoseconds; zero means unbounded.
    #[serde(default)]
    max_age: u64,
    /// Nanoseconds; zero means disabled.
    #[serde(default)]
    duplicate_window: u64,
}

impl StreamConfigPayload {
    fn into_spec(self) -> StreamSpec {
        StreamSpec {
            name: self.name,
            subjects: self.subjects,
            retention: if self.retention == "workqueue" {
                Retention::WorkQueue
            } else {
                // coupe only ever creates workqueue and limits streams
                Retention::Limits
            },
            max_messages: (self.max_msgs >= 0).then_some(self.max_msgs),
            max_age: (self.max_age > 0).then(|| Duration::from_nanos(self.max_age)),
            duplicate_window: (self.duplicate_window > 0)
                .then(|| Duration::from_nanos(self.duplicate_window)),
        }
    }
}

/// Subset of the management API's consumer info payload coupe cares about.
#[derive(Debug, Deserialize)]
struct ConsumerInfoPayload {
    stream_name: String,
    name: String,
    config: ConsumerConfigPayload,
}

#[derive(Debug, Deserialize)]
struct ConsumerConfigPayload {
    #[serde(default)]
    max_batch: i64,
}

fn provisioning_error(resource: &str, message: impl ToString) -> CoupeError {
    CoupeError::Provisioning {
        resource: resource.to_owned(),
        message: message.to_string(),
    }
}

#[async_trait]
impl BrokerAdmin for JetStreamAdmin {
    async fn get_stream(&self, name: &str) -> Result<Option<StreamSpec>> {
        let response: Response<StreamInfoPayload> = self
            .context
            .request(format!("STREAM.INFO.{name}"), &())
            .await
            .map_err(|err| provisioning_error(&format!("stream {name}"), err))?;
        match response {
            Response::Ok(info) => Ok(Some(info.config.into_spec())),
            Response::Err { error }
                if error.error_code() == jetstream::ErrorCode::STREAM_NOT_FOUND =>
            {
                Ok(None)
            }
            Response::Err { error } => Err(provisioning_error(&format!("stream {name}"), error)),
        }
    }

    async fn create_stream(&self, spec: &StreamSpec) -> Result<StreamSpec> {
        let config = stream::Config {
            name: spec.name.clone(),
            subjects: spec.subjects.iter().cloned().map(Into::into).collect(),
            retention: match spec.retention {
                Retention::WorkQueue => stream::RetentionPolicy::WorkQueue,
                Retention::Limits => stream::RetentionPolicy::Limits,
            },
            max_messages: spec.max_messages.unwrap_or(-1),
            max_age: spec.max_age.unwrap_or(Duration::ZERO),
            duplicate_window: spec.duplicate_window.unwrap_or(Duration::ZERO),
            ..stream::Config::default()
        };
        let _ = self
            .context
            .create_stream(config)
            .await
            .map_err(|err| provisioning_error(&format!("stream {}", spec.name), err))?;
        Ok(spec.clone())
    }

    async fn get_consumer(&self, stream: &str, durable: &str) -> Result<Option<ConsumerSpec>> {
        let resource = format!("consumer {durable} on {stream}");
        let response: Response<ConsumerInfoPayload> = self
            .context
            .request(format!("CONSUMER.INFO.{stream}.{durable}"), &())
            .await
            .map_err(|err| provisioning_error(&resource, err))?;
        match response {
            Response::Ok(info) => Ok(Some(ConsumerSpec {
                stream: info.stream_name,
                durable_name: info.name,
                max_batch: info.config.max_batch,
            })),
            Response::Err { error }
                if error.error_code() == jetstream::ErrorCode::CONSUMER_NOT_FOUND =>
            {
                Ok(None)
            }
            Response::Err { error } => Err(provisioning_error(&resource, error)),
        }
    }

    async fn create_consumer(&self, spec: &ConsumerSpec) -> Result<ConsumerSpec> {
        let resource = format!("consumer {} on {}", spec.durable_name, spec.stream);
        let stream = self
            .context
            .get_stream(&spec.stream)
            .await
            .map_err(|err| provisioning_error(&resource, err))?;
        let _ = stream
            .create_consumer(consumer::pull::Config {
                durable_name: Some(spec.durable_name.clone()),
                ack_policy: consumer::AckPolicy::Explicit,
                deliver_policy: consumer::DeliverPolicy::All,
                max_batch: spec.max_batch,
                ..consumer::pull::Config::default()
            })
            .await
            .map_err(|err| provisioning_error(&resource, err))?;
        Ok(spec.clone())
    }
}
