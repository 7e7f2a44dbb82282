//! params2env - AWS SSM Parameter Store CLI
//!
//! Reads parameters into shell `export` lines and creates, modifies or
//! deletes them, optionally replicating writes to a second region.
//! Settings come from `~/.params2env.yaml`, then `./.params2env.yaml`,
//! then command-line flags.

pub mod commands;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;
pub mod output;
pub mod store;

pub use config::{Config, ConfigError, ConfigResolver, ParamConfig};
pub use coordinator::{ParameterOperationCoordinator, ReplicaOutcome, WriteOutcome};
pub use error::{Error, Result};
pub use store::{ClientFactory, ParameterStore, StoreError};
