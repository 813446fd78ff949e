//! # coupe-broker
//!
//! Broker resource provisioning for coupe stacks:
//! - **Resource**: stream and durable-consumer descriptors.
//! - **Plan**: pure derivation of the ordered resource set from a validated
//!   configuration.
//! - **Admin**: the management-API seam ([`BrokerAdmin`]), with a JetStream
//!   backend and an in-memory backend for tests.
//! - **Provision**: the sequential, idempotent get-or-create pass.

pub mod admin;
pub mod memory;
pub mod nats;
pub mod plan;
pub mod provision;
pub mod resource;

pub use admin::BrokerAdmin;
pub use nats::JetStreamAdmin;
pub use plan::{ProvisionPlan, plan};
pub use provision::{ProvisionReport, provision};
pub use resource::{ConsumerSpec, Retention, StreamSpec};
