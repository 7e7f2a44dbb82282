//! Crate-wide error type

use params2env_validation::ValidationError;

use crate::config::ConfigError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("AWS region must be specified via --region, config file, or AWS_REGION environment variable")]
    MissingRegion,

    #[error("failed to create AWS client for region '{region}': {source}")]
    Client {
        region: String,
        #[source]
        source: StoreError,
    },

    #[error("parameter '{path}' not found in region '{region}'")]
    NotFound { path: String, region: String },

    #[error("parameter '{path}' already exists in region '{region}' (use --overwrite to replace it)")]
    AlreadyExists { path: String, region: String },

    #[error("failed to {action} parameter '{path}' in region '{region}': {source}")]
    Store {
        action: &'static str,
        path: String,
        region: String,
        #[source]
        source: StoreError,
    },

    #[error("invalid KMS key ARN '{arn}': {reason}")]
    InvalidKmsArn { arn: String, reason: String },

    /// A replica step failed after the primary write was applied.
    #[error("replica region '{region}' failed, primary write in '{primary}' was kept: {source}")]
    Replica {
        region: String,
        primary: String,
        #[source]
        source: Box<Error>,
    },

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("output mode 'file' requires a file path (--file or 'file' in config)")]
    MissingOutputFile,

    #[error("failed to write output to {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    pub(crate) fn stdout(source: std::io::Error) -> Self {
        Error::Output {
            path: "stdout".to_string(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
