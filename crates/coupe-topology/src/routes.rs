//! Routing rules and Caddyfile rendering.
//!
//! HTTP triggers get a real route in front of their container; stream and
//! queue triggers get a synthetic wake route that cold-starts the container
//! and answers 200 without proxying. Pub/sub functions have no route at all:
//! the broker-side consumer activates them.

use std::fmt::Write as _;

use coupe_common::constants::BLOCKING_TIMEOUT_SECS;
use coupe_common::names;
use coupe_config::{StackConfig, Trigger};

/// One reverse-proxy route bound to a scale-to-zero group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    /// Route path (declared, or the synthetic wake path).
    pub path: String,
    /// Sablier group that holds traffic while the container starts.
    pub group: String,
    /// Session duration in seconds (the function's idle timeout).
    pub session_secs: u64,
    /// Blocking-wait timeout in seconds; a platform constant.
    pub blocking_secs: u64,
    /// Proxy upstream, or `None` for wake routes that answer 200 directly.
    pub upstream: Option<String>,
}

/// Derives the routing rules for a stack, one per proxy-exposed function,
/// preserving function declaration order.
#[must_use]
pub fn route_rules(config: &StackConfig) -> Vec<RouteRule> {
    let mut rules = Vec::new();
    for function in &config.functions {
        match &function.trigger {
            Trigger::Http { route } => rules.push(RouteRule {
                path: route.clone(),
                group: function.container_name.clone(),
                session_secs: function.idle_timeout_secs,
                blocking_secs: BLOCKING_TIMEOUT_SECS,
                upstream: Some(function.container_name.clone()),
            }),
            Trigger::Stream { .. } | Trigger::Queue { .. } => rules.push(RouteRule {
                path: names::wake_route(&function.container_name),
                group: function.container_name.clone(),
                session_secs: function.idle_timeout_secs,
                blocking_secs: BLOCKING_TIMEOUT_SECS,
                upstream: None,
            }),
            Trigger::PubSub { .. } => {}
        }
    }
    rules
}

/// Renders the rules as a Caddyfile. The output is deterministic; the proxy
/// formatter normalizes whitespace before deployment.
#[must_use]
pub fn render_caddyfile(rules: &[RouteRule]) -> String {
    let mut out = String::from("{\n\tdebug\n}\n\n:80 {\n");
    for rule in rules {
        render_route(&mut out, rule);
    }
    out.push_str("}\n");
    out
}

fn render_route(out: &mut String, rule: &RouteRule) {
    let _ = writeln!(out, "\troute {} {{", rule.path);
    out.push_str("\t\tsablier {\n");
    let _ = writeln!(out, "\t\t\tgroup {}", rule.group);
    let _ = writeln!(out, "\t\t\tsession_duration {}s", rule.session_secs);
    out.push_str("\t\t\tblocking {\n");
    let _ = writeln!(out, "\t\t\t\ttimeout {}s", rule.blocking_secs);
    out.push_str("\t\t\t}\n");
    out.push_str("\t\t}\n");
    match &rule.upstream {
        Some(upstream) => {
            let _ = writeln!(out, "\t\treverse_proxy {upstream}");
        }
        None => out.push_str("\t\trespond 200\n"),
    }
    out.push_str("\t}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use coupe_config::document::{FunctionEntry, ResourceEntry, StackDocument, TriggerEntry};

    fn function(name: &str, idle: u64, trigger: TriggerEntry) -> FunctionEntry {
        FunctionEntry {
            name: name.into(),
            runtime: "rust".into(),
            idle_timeout_secs: idle,
            trigger,
        }
    }

    fn blog_config() -> StackConfig {
        coupe_config::validate(StackDocument {
            name: "blog".into(),
            http_port: 8080,
            functions: vec![function(
                "api",
                120,
                TriggerEntry::Http {
                    route: "/api".into(),
                },
            )],
            queues: Vec::new(),
            streams: Vec::new(),
        })
        .expect("valid config")
    }

    #[test]
    fn http_route_binds_group_session_and_blocking_timeout() {
        let rules = route_rules(&blog_config());
        assert_eq!(
            rules,
            vec![RouteRule {
                path: "/api".into(),
                group: "coupe_function_blog_api".into(),
                session_secs: 120,
                blocking_secs: 30,
                upstream: Some("coupe_function_blog_api".into()),
            }]
        );
    }

    #[test]
    fn consumer_functions_get_wake_routes() {
        let config = coupe_config::validate(StackDocument {
            name: "jobs".into(),
            http_port: 8080,
            functions: vec![function(
                "sender",
                300,
                TriggerEntry::Queue {
                    name: "emails".into(),
                    batch_size: 1,
                },
            )],
            queues: vec![ResourceEntry {
                name: "emails".into(),
                subjects: vec!["jobs.email".into()],
                max_age_secs: None,
                max_num_messages: None,
                duplicate_window_secs: None,
            }],
            streams: Vec::new(),
        })
        .expect("valid config");

        let rules = route_rules(&config);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].path, "/__coupe/coupe_function_jobs_sender/wake");
        assert_eq!(rules[0].upstream, None);
    }

    #[test]
    fn pubsub_functions_have_no_route() {
        let config = coupe_config::validate(StackDocument {
            name: "events".into(),
            http_port: 8080,
            functions: vec![function(
                "listener",
                300,
                TriggerEntry::PubSub {
                    subjects: vec!["events.ping".into()],
                },
            )],
            queues: Vec::new(),
            streams: Vec::new(),
        })
        .expect("valid config");

        assert!(route_rules(&config).is_empty());
    }

    #[test]
    fn caddyfile_contains_sablier_block_and_upstream() {
        let caddyfile = render_caddyfile(&route_rules(&blog_config()));
        assert!(caddyfile.contains("route /api {"));
        assert!(caddyfile.contains("group coupe_function_blog_api"));
        assert!(caddyfile.contains("session_duration 120s"));
        assert!(caddyfile.contains("timeout 30s"));
        assert!(caddyfile.contains("reverse_proxy coupe_function_blog_api"));
    }

    #[test]
    fn wake_routes_respond_instead_of_proxying() {
        let rule = RouteRule {
            path: "/__coupe/c/wake".into(),
            group: "c".into(),
            session_secs: 300,
            blocking_secs: 30,
            upstream: None,
        };
        let caddyfile = render_caddyfile(&[rule]);
        assert!(caddyfile.contains("respond 200"));
        assert!(!caddyfile.contains("reverse_proxy"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let rules = route_rules(&blog_config());
        assert_eq!(render_caddyfile(&rules), render_caddyfile(&rules));
    }
}
