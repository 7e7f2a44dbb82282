//! Parameter store clients
//!
//! The coordinator talks to the store only through these traits:
//!
//! - [`ClientFactory`]: builds a client for a region, optionally assuming a role
//! - [`ParameterStore`]: `get` / `put` / `delete` against one region
//!
//! [`aws::AwsClientFactory`] is the production implementation;
//! [`memory::MemoryFactory`] is an in-process store with failure injection.

pub mod aws;
pub mod memory;

pub use aws::AwsClientFactory;
pub use memory::{MemoryFactory, StoreOp};

pub use params2env_validation::{PARAMETER_TYPE_SECURE_STRING, PARAMETER_TYPE_STRING};

/// How a `put` treats an existing parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutMode {
    /// New parameter; fails with `AlreadyExists` unless `overwrite` is set
    Create { overwrite: bool },
    /// Replace the value of an existing parameter
    Update,
}

/// Payload for a `put`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRequest {
    pub path: String,
    pub value: String,
    /// `String` or `SecureString`; `None` keeps the stored type
    pub param_type: Option<String>,
    pub description: Option<String>,
    pub kms_key: Option<String>,
    pub mode: PutMode,
}

/// Failures reported by a store client
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("parameter {0} not found")]
    NotFound(String),

    #[error("parameter {0} already exists")]
    AlreadyExists(String),

    #[error("insufficient permissions for parameter {0}")]
    AccessDenied(String),

    /// Could not build a client or assume the role
    #[error("{0}")]
    Client(String),

    /// Any other API failure
    #[error("{0}")]
    Api(String),
}

/// One region's view of the parameter store.
pub trait ParameterStore {
    /// Fetch a decrypted value.
    fn get(&self, path: &str) -> Result<String, StoreError>;

    fn put(&self, request: &PutRequest) -> Result<(), StoreError>;

    fn delete(&self, path: &str) -> Result<(), StoreError>;
}

/// Builds store clients; injected into the coordinator.
pub trait ClientFactory {
    fn new_client(
        &self,
        region: &str,
        role: Option<&str>,
    ) -> Result<Box<dyn ParameterStore>, StoreError>;
}
