//! # coupe-common
//!
//! Shared foundation for the coupe workspace:
//! - **Error**: the unified [`error::CoupeError`] enum and `Result` alias.
//! - **Constants**: platform defaults, image references, and the `~/.coupe`
//!   directory layout.
//! - **Names**: the deterministic naming scheme every other crate derives
//!   container and broker resource names from.

pub mod constants;
pub mod error;
pub mod names;
