//! Sequential, idempotent application of a provision plan.
//!
//! Per resource: lookup by name, create only on not-found, reuse otherwise.
//! Calls are issued one at a time so a cold-starting broker is not flooded,
//! streams strictly before consumers. The pass fails fast: the first error
//! that is not "not found" aborts it naming the resource, and re-running
//! converges because every step is idempotent.

use coupe_common::error::Result;

use crate::admin::BrokerAdmin;
use crate::plan::ProvisionPlan;

/// Outcome of one resource in a provisioning pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The resource was absent and has been created.
    Created,
    /// The resource already existed and was reused untouched.
    Reused,
}

/// Report of a completed provisioning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Resource names that were created, in application order.
    pub created: Vec<String>,
    /// Resource names that already existed, in application order.
    pub reused: Vec<String>,
}

impl ProvisionReport {
    fn record(&mut self, name: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Created => self.created.push(name.to_owned()),
            Outcome::Reused => self.reused.push(name.to_owned()),
        }
    }
}

/// Applies a provision plan against a broker.
///
/// # Errors
///
/// Returns the first [`coupe_common::error::CoupeError::Provisioning`] error
/// encountered; resources applied before the failure stay in place.
pub async fn provision(plan: &ProvisionPlan, admin: &dyn BrokerAdmin) -> Result<ProvisionReport> {
    let mut report = ProvisionReport::default();

    for spec in &plan.streams {
        let outcome = if admin.get_stream(&spec.name).await?.is_some() {
            Outcome::Reused
        } else {
            let _ = admin.create_stream(spec).await?;
            Outcome::Created
        };
        tracing::info!(
            stream = spec.name.as_str(),
            outcome = ?outcome,
            "provisioned stream"
        );
        report.record(&spec.name, &outcome);
    }

    for spec in &plan.consumers {
        let outcome = if admin
            .get_consumer(&spec.stream, &spec.durable_name)
            .await?
            .is_some()
        {
            Outcome::Reused
        } else {
            let _ = admin.create_consumer(spec).await?;
            Outcome::Created
        };
        tracing::info!(
            stream = spec.stream.as_str(),
            durable = spec.durable_name.as_str(),
            outcome = ?outcome,
            "provisioned consumer"
        );
        report.record(&spec.durable_name, &outcome);
    }

    Ok(report)
}
