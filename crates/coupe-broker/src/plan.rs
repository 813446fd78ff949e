//! Pure derivation of the provision plan from a validated configuration.
//!
//! Queues become work-queue streams, streams become limits-retention
//! streams, and every stream/queue-triggered function becomes a durable
//! consumer named after its container. Streams are ordered strictly before
//! consumers because a consumer's creation requires its stream to exist.

use std::time::Duration;

use coupe_config::{BrokerResourceConfig, StackConfig, Trigger};

use crate::resource::{ConsumerSpec, Retention, StreamSpec};

/// Ordered set of broker resources one provisioning pass applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    /// Streams to get-or-create, declaration order, queues first.
    pub streams: Vec<StreamSpec>,
    /// Durable consumers to get-or-create, function declaration order.
    pub consumers: Vec<ConsumerSpec>,
}

impl ProvisionPlan {
    /// Whether the plan contains any resource at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty() && self.consumers.is_empty()
    }
}

/// Derives the provision plan for a stack. Pure; performs no I/O.
#[must_use]
pub fn plan(config: &StackConfig) -> ProvisionPlan {
    let mut streams = Vec::new();
    for queue in &config.queues {
        streams.push(stream_spec(queue, Retention::WorkQueue));
    }
    for stream in &config.streams {
        streams.push(stream_spec(stream, Retention::Limits));
    }

    let mut consumers = Vec::new();
    for function in &config.functions {
        if let Trigger::Stream {
            stream_name,
            batch_size,
            ..
        }
        | Trigger::Queue {
            stream_name,
            batch_size,
            ..
        } = &function.trigger
        {
            consumers.push(ConsumerSpec {
                stream: stream_name.clone(),
                durable_name: function.container_name.clone(),
                #[allow(clippy::cast_possible_wrap)]
                max_batch: *batch_size as i64,
            });
        }
    }

    ProvisionPlan { streams, consumers }
}

fn stream_spec(resource: &BrokerResourceConfig, retention: Retention) -> StreamSpec {
    StreamSpec {
        name: resource.stream_name.clone(),
        subjects: resource.subjects.clone(),
        retention,
        #[allow(clippy::cast_possible_wrap)]
        max_messages: resource.max_num_messages.map(|m| m as i64),
        max_age: resource.max_age_secs.map(Duration::from_secs),
        duplicate_window: resource.duplicate_window_secs.map(Duration::from_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coupe_config::document::{FunctionEntry, ResourceEntry, StackDocument, TriggerEntry};

    fn jobs_config() -> StackConfig {
        coupe_config::validate(StackDocument {
            name: "jobs".into(),
            http_port: 8080,
            functions: vec![
                FunctionEntry {
                    name: "sender".into(),
                    runtime: "rust".into(),
                    idle_timeout_secs: 300,
                    trigger: TriggerEntry::Queue {
                        name: "emails".into(),
                        batch_size: 5,
                    },
                },
                FunctionEntry {
                    name: "auditor".into(),
                    runtime: "rust".into(),
                    idle_timeout_secs: 300,
                    trigger: TriggerEntry::Stream {
                        name: "events".into(),
                        batch_size: 1,
                    },
                },
            ],
            queues: vec![ResourceEntry {
                name: "emails".into(),
                subjects: vec!["jobs.email".into()],
                max_age_secs: Some(3600),
                max_num_messages: Some(10_000),
                duplicate_window_secs: None,
            }],
            streams: vec![ResourceEntry {
                name: "events".into(),
                subjects: vec!["jobs.events.>".into()],
                max_age_secs: None,
                max_num_messages: None,
                duplicate_window_secs: Some(120),
            }],
        })
        .expect("valid config")
    }

    #[test]
    fn queues_become_work_queue_streams() {
        let plan = plan(&jobs_config());
        let emails = &plan.streams[0];
        assert_eq!(emails.name, "jobs_queue_emails");
        assert_eq!(emails.retention, Retention::WorkQueue);
        assert_eq!(emails.subjects, vec!["jobs.email"]);
        assert_eq!(emails.max_messages, Some(10_000));
        assert_eq!(emails.max_age, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn streams_become_limits_streams() {
        let plan = plan(&jobs_config());
        let events = &plan.streams[1];
        assert_eq!(events.name, "jobs_stream_events");
        assert_eq!(events.retention, Retention::Limits);
        assert_eq!(events.duplicate_window, Some(Duration::from_secs(120)));
    }

    #[test]
    fn consumers_are_named_by_container_and_carry_batch_size() {
        let plan = plan(&jobs_config());
        assert_eq!(
            plan.consumers,
            vec![
                ConsumerSpec {
                    stream: "jobs_queue_emails".into(),
                    durable_name: "coupe_function_jobs_sender".into(),
                    max_batch: 5,
                },
                ConsumerSpec {
                    stream: "jobs_stream_events".into(),
                    durable_name: "coupe_function_jobs_auditor".into(),
                    max_batch: 1,
                },
            ]
        );
    }

    #[test]
    fn http_only_stack_plans_nothing() {
        let config = coupe_config::validate(StackDocument {
            name: "blog".into(),
            http_port: 8080,
            functions: vec![FunctionEntry {
                name: "api".into(),
                runtime: "rust".into(),
                idle_timeout_secs: 300,
                trigger: TriggerEntry::Http {
                    route: "/api".into(),
                },
            }],
            queues: Vec::new(),
            streams: Vec::new(),
        })
        .expect("valid config");

        assert!(plan(&config).is_empty());
    }

    #[test]
    fn plan_is_deterministic() {
        let config = jobs_config();
        assert_eq!(plan(&config), plan(&config));
    }
}
