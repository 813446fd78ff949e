//! Structural and cross-referential validation of the stack document.
//!
//! # Checks performed
//!
//! 1. Identifier pattern (`[a-z0-9_-]+`) on the stack, function, queue, and
//!    stream names.
//! 2. Function, queue, and stream names unique within their lists.
//! 3. HTTP routes non-empty and unique across the stack.
//! 4. Subject lists non-empty wherever subjects are declared.
//! 5. Every stream/queue trigger resolves to a declared resource of the
//!    matching kind.
//!
//! On success the document is normalized: defaults are already applied by the
//! serde layer and every derived name is computed exactly once here.

use std::collections::HashSet;

use coupe_common::error::{CoupeError, Result};
use coupe_common::names::{self, ResourceKind};

use crate::document::{FunctionEntry, ResourceEntry, StackDocument, TriggerEntry};
use crate::stack::{BrokerResourceConfig, Function, StackConfig, Trigger};

/// Validates a raw stack document and produces the normalized configuration.
///
/// # Errors
///
/// Returns [`CoupeError::Validation`] for structural failures and
/// [`CoupeError::UnresolvedReference`] when a trigger names an undeclared
/// stream or queue. No side effects occur in either case.
pub fn validate(doc: StackDocument) -> Result<StackConfig> {
    tracing::debug!(stack = doc.name.as_str(), "validating stack document");

    check_identifier("stack name", &doc.name)?;
    check_unique_names("function", doc.functions.iter().map(|f| f.name.as_str()))?;
    check_unique_names("queue", doc.queues.iter().map(|q| q.name.as_str()))?;
    check_unique_names("stream", doc.streams.iter().map(|s| s.name.as_str()))?;
    check_unique_routes(&doc.functions)?;

    for resource in doc.queues.iter().chain(doc.streams.iter()) {
        check_identifier("resource name", &resource.name)?;
        check_subjects(&resource.name, &resource.subjects)?;
    }

    let queues: Vec<BrokerResourceConfig> = doc
        .queues
        .iter()
        .map(|q| normalize_resource(&doc.name, ResourceKind::Queue, q))
        .collect();
    let streams: Vec<BrokerResourceConfig> = doc
        .streams
        .iter()
        .map(|s| normalize_resource(&doc.name, ResourceKind::Stream, s))
        .collect();

    let mut functions = Vec::with_capacity(doc.functions.len());
    for entry in &doc.functions {
        functions.push(normalize_function(&doc.name, entry, &queues, &streams)?);
    }

    Ok(StackConfig {
        project_name: names::stack_project(&doc.name),
        name: doc.name,
        http_port: doc.http_port,
        functions,
        queues,
        streams,
    })
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

fn check_identifier(what: &str, value: &str) -> Result<()> {
    if is_identifier(value) {
        return Ok(());
    }
    Err(CoupeError::Validation {
        message: format!("{what} \"{value}\" must match [a-z0-9_-]+"),
    })
}

fn check_unique_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CoupeError::Validation {
                message: format!("duplicate {kind} name: \"{name}\""),
            });
        }
    }
    Ok(())
}

fn check_unique_routes(functions: &[FunctionEntry]) -> Result<()> {
    let mut seen: std::collections::HashMap<&str, &str> = std::collections::HashMap::new();
    for function in functions {
        if let TriggerEntry::Http { route } = &function.trigger {
            if route.is_empty() {
                return Err(CoupeError::Validation {
                    message: format!("function \"{}\" has an empty HTTP route", function.name),
                });
            }
            if let Some(previous) = seen.insert(route.as_str(), function.name.as_str()) {
                return Err(CoupeError::Validation {
                    message: format!(
                        "route \"{route}\" is declared by both \"{previous}\" and \"{}\"",
                        function.name
                    ),
                });
            }
        }
    }
    Ok(())
}

fn check_subjects(owner: &str, subjects: &[String]) -> Result<()> {
    if subjects.is_empty() {
        return Err(CoupeError::Validation {
            message: format!("\"{owner}\" declares no subjects"),
        });
    }
    Ok(())
}

fn normalize_resource(
    stack: &str,
    kind: ResourceKind,
    entry: &ResourceEntry,
) -> BrokerResourceConfig {
    BrokerResourceConfig {
        name: entry.name.clone(),
        stream_name: names::broker_stream(stack, kind, &entry.name),
        subjects: entry.subjects.clone(),
        max_age_secs: entry.max_age_secs,
        max_num_messages: entry.max_num_messages,
        duplicate_window_secs: entry.duplicate_window_secs,
    }
}

fn normalize_function(
    stack: &str,
    entry: &FunctionEntry,
    queues: &[BrokerResourceConfig],
    streams: &[BrokerResourceConfig],
) -> Result<Function> {
    check_identifier("function name", &entry.name)?;

    let trigger = match &entry.trigger {
        TriggerEntry::Http { route } => Trigger::Http {
            route: route.clone(),
        },
        TriggerEntry::PubSub { subjects } => {
            check_subjects(&entry.name, subjects)?;
            Trigger::PubSub {
                subjects: subjects.clone(),
            }
        }
        TriggerEntry::Stream { name, batch_size } => {
            let resource = resolve_reference("stream", name, &entry.name, streams)?;
            Trigger::Stream {
                name: name.clone(),
                stream_name: resource.stream_name.clone(),
                batch_size: *batch_size,
            }
        }
        TriggerEntry::Queue { name, batch_size } => {
            let resource = resolve_reference("queue", name, &entry.name, queues)?;
            Trigger::Queue {
                name: name.clone(),
                stream_name: resource.stream_name.clone(),
                batch_size: *batch_size,
            }
        }
    };

    Ok(Function {
        name: entry.name.clone(),
        runtime: entry.runtime.clone(),
        idle_timeout_secs: entry.idle_timeout_secs,
        container_name: names::function_container(stack, &entry.name),
        trigger,
    })
}

fn resolve_reference<'a>(
    kind: &'static str,
    name: &str,
    function: &str,
    declared: &'a [BrokerResourceConfig],
) -> Result<&'a BrokerResourceConfig> {
    declared.iter().find(|r| r.name == name).ok_or_else(|| {
        CoupeError::UnresolvedReference {
            kind,
            name: name.to_owned(),
            function: function.to_owned(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FunctionEntry, ResourceEntry, StackDocument, TriggerEntry};

    fn http_function(name: &str, route: &str) -> FunctionEntry {
        FunctionEntry {
            name: name.into(),
            runtime: "rust".into(),
            idle_timeout_secs: 300,
            trigger: TriggerEntry::Http {
                route: route.into(),
            },
        }
    }

    fn queue_function(name: &str, queue: &str, batch_size: u64) -> FunctionEntry {
        FunctionEntry {
            name: name.into(),
            runtime: "rust".into(),
            idle_timeout_secs: 300,
            trigger: TriggerEntry::Queue {
                name: queue.into(),
                batch_size,
            },
        }
    }

    fn resource(name: &str, subjects: &[&str]) -> ResourceEntry {
        ResourceEntry {
            name: name.into(),
            subjects: subjects.iter().map(|s| (*s).into()).collect(),
            max_age_secs: None,
            max_num_messages: None,
            duplicate_window_secs: None,
        }
    }

    fn document(name: &str) -> StackDocument {
        StackDocument {
            name: name.into(),
            http_port: 8080,
            functions: Vec::new(),
            queues: Vec::new(),
            streams: Vec::new(),
        }
    }

    #[test]
    fn valid_http_stack_normalizes() {
        let mut doc = document("blog");
        doc.functions.push(http_function("api", "/api"));

        let config = validate(doc).expect("should validate");
        assert_eq!(config.project_name, "coupe_stack_blog");
        assert_eq!(config.functions[0].container_name, "coupe_function_blog_api");
        assert!(!config.uses_broker());
    }

    #[test]
    fn queue_reference_resolves_to_broker_stream_name() {
        let mut doc = document("jobs");
        doc.queues.push(resource("emails", &["jobs.email"]));
        doc.functions.push(queue_function("sender", "emails", 5));

        let config = validate(doc).expect("should validate");
        match &config.functions[0].trigger {
            Trigger::Queue {
                stream_name,
                batch_size,
                ..
            } => {
                assert_eq!(stream_name, "jobs_queue_emails");
                assert_eq!(*batch_size, 5);
            }
            other => panic!("expected queue trigger, got {other:?}"),
        }
        assert!(config.uses_broker());
        assert!(config.has_consumer_functions());
    }

    #[test]
    fn undeclared_stream_reference_fails() {
        let mut doc = document("jobs");
        doc.functions.push(FunctionEntry {
            name: "reader".into(),
            runtime: "rust".into(),
            idle_timeout_secs: 300,
            trigger: TriggerEntry::Stream {
                name: "nope".into(),
                batch_size: 1,
            },
        });

        let err = validate(doc).unwrap_err();
        match err {
            CoupeError::UnresolvedReference {
                kind,
                name,
                function,
            } => {
                assert_eq!(kind, "stream");
                assert_eq!(name, "nope");
                assert_eq!(function, "reader");
            }
            other => panic!("expected unresolved reference, got {other}"),
        }
    }

    #[test]
    fn queue_trigger_does_not_resolve_against_streams() {
        let mut doc = document("jobs");
        doc.streams.push(resource("events", &["jobs.events"]));
        doc.functions.push(queue_function("worker", "events", 1));

        let err = validate(doc).unwrap_err();
        assert!(matches!(err, CoupeError::UnresolvedReference { kind: "queue", .. }));
    }

    #[test]
    fn duplicate_function_names_fail() {
        let mut doc = document("blog");
        doc.functions.push(http_function("api", "/a"));
        doc.functions.push(http_function("api", "/b"));

        let err = validate(doc).unwrap_err();
        assert!(err.to_string().contains("duplicate function name"), "got: {err}");
    }

    #[test]
    fn duplicate_http_routes_fail() {
        let mut doc = document("blog");
        doc.functions.push(http_function("api", "/api"));
        doc.functions.push(http_function("admin", "/api"));

        let err = validate(doc).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"api\"") && msg.contains("\"admin\""), "got: {msg}");
    }

    #[test]
    fn empty_http_route_fails() {
        let mut doc = document("blog");
        doc.functions.push(http_function("api", ""));
        assert!(validate(doc).is_err());
    }

    #[test]
    fn uppercase_stack_name_fails() {
        let mut doc = document("Blog");
        doc.functions.push(http_function("api", "/api"));

        let err = validate(doc).unwrap_err();
        assert!(err.to_string().contains("[a-z0-9_-]+"), "got: {err}");
    }

    #[test]
    fn empty_pubsub_subjects_fail() {
        let mut doc = document("blog");
        doc.functions.push(FunctionEntry {
            name: "listener".into(),
            runtime: "rust".into(),
            idle_timeout_secs: 300,
            trigger: TriggerEntry::PubSub {
                subjects: Vec::new(),
            },
        });
        assert!(validate(doc).is_err());
    }

    #[test]
    fn empty_queue_subjects_fail() {
        let mut doc = document("jobs");
        doc.queues.push(resource("emails", &[]));
        assert!(validate(doc).is_err());
    }

    #[test]
    fn derived_names_are_stable_across_validations() {
        let mut doc = document("jobs");
        doc.queues.push(resource("emails", &["jobs.email"]));
        doc.functions.push(queue_function("sender", "emails", 5));

        let first = validate(doc.clone()).expect("should validate");
        let second = validate(doc).expect("should validate");
        assert_eq!(
            first.functions[0].container_name,
            second.functions[0].container_name
        );
        assert_eq!(first.queues[0].stream_name, second.queues[0].stream_name);
    }
}
