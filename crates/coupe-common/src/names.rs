//! Deterministic naming scheme for containers, broker resources, and routes.
//!
//! Every derived identifier in the system comes from these functions, so the
//! compose graph, the Caddyfile, and the broker always agree on names. All
//! functions are pure and injective over their inputs: re-deploying the same
//! stack can never mint a different name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a shared broker resource declared in the stack document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Work-queue semantics: each message consumed by exactly one group.
    Queue,
    /// Limits-retention semantics: messages kept until limits are hit.
    Stream,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queue => write!(f, "queue"),
            Self::Stream => write!(f, "stream"),
        }
    }
}

/// Returns the compose project name for a stack.
#[must_use]
pub fn stack_project(stack: &str) -> String {
    format!("coupe_stack_{stack}")
}

/// Returns the container name of a platform component (proxy, activator, ...).
#[must_use]
pub fn platform_container(stack: &str, component: &str) -> String {
    format!("coupe_stack_{stack}_{component}")
}

/// Returns the container name of a function.
///
/// Injective over `(stack, function)`: the stack prefix is separated from
/// the function name, so distinct pairs never collide.
#[must_use]
pub fn function_container(stack: &str, function: &str) -> String {
    format!("coupe_function_{stack}_{function}")
}

/// Returns the broker stream name backing a declared queue or stream.
#[must_use]
pub fn broker_stream(stack: &str, kind: ResourceKind, name: &str) -> String {
    format!("{stack}_{kind}_{name}")
}

/// Returns the synthetic proxy route used to cold-start a consumer function
/// without serving real traffic.
#[must_use]
pub fn wake_route(container: &str) -> String {
    format!("/__coupe/{container}/wake")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_container_matches_convention() {
        assert_eq!(
            function_container("blog", "api"),
            "coupe_function_blog_api"
        );
    }

    #[test]
    fn function_names_are_injective_within_a_stack() {
        let names: Vec<String> = ["api", "worker", "sender"]
            .iter()
            .map(|f| function_container("jobs", f))
            .collect();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(names.len(), deduped.len());
    }

    #[test]
    fn broker_stream_distinguishes_kinds() {
        assert_eq!(
            broker_stream("jobs", ResourceKind::Queue, "emails"),
            "jobs_queue_emails"
        );
        assert_ne!(
            broker_stream("jobs", ResourceKind::Queue, "emails"),
            broker_stream("jobs", ResourceKind::Stream, "emails")
        );
    }

    #[test]
    fn wake_route_embeds_container_name() {
        assert_eq!(
            wake_route("coupe_function_jobs_sender"),
            "/__coupe/coupe_function_jobs_sender/wake"
        );
    }

    #[test]
    fn naming_is_stable_across_calls() {
        assert_eq!(stack_project("blog"), stack_project("blog"));
        assert_eq!(
            platform_container("blog", "caddy"),
            platform_container("blog", "caddy")
        );
    }
}
