//! AWS SSM Parameter Store client
//!
//! Wraps `aws-sdk-ssm` behind the synchronous [`ParameterStore`] trait.
//! Each call is driven to completion on a current-thread tokio runtime
//! owned by the factory.

use std::sync::Arc;

use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ssm::types::ParameterType;
use tokio::runtime::Runtime;
use tracing::debug;

use super::{ClientFactory, ParameterStore, PutMode, PutRequest, StoreError};

/// Session name used when assuming a role
const SESSION_NAME: &str = "params2env";

/// Builds SSM clients from the default AWS credential chain.
pub struct AwsClientFactory {
    runtime: Arc<Runtime>,
}

impl AwsClientFactory {
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            runtime: Arc::new(runtime),
        })
    }
}

impl ClientFactory for AwsClientFactory {
    fn new_client(
        &self,
        region: &str,
        role: Option<&str>,
    ) -> Result<Box<dyn ParameterStore>, StoreError> {
        if region.is_empty() {
            return Err(StoreError::Client("region is required".to_string()));
        }
        let region = Region::new(region.to_string());

        let client = self.runtime.block_on(async {
            let base = aws_config::defaults(BehaviorVersion::latest())
                .region(region.clone())
                .load()
                .await;

            match role {
                Some(role_arn) => {
                    debug!(role = %role_arn, "Assuming role");
                    let provider = AssumeRoleProvider::builder(role_arn)
                        .session_name(SESSION_NAME)
                        .region(region.clone())
                        .configure(&base)
                        .build()
                        .await;
                    let conf = aws_sdk_ssm::config::Builder::from(&base)
                        .credentials_provider(provider)
                        .build();
                    aws_sdk_ssm::Client::from_conf(conf)
                }
                None => aws_sdk_ssm::Client::new(&base),
            }
        });

        Ok(Box::new(AwsParameterStore {
            client,
            runtime: Arc::clone(&self.runtime),
        }))
    }
}

/// SSM client bound to one region
struct AwsParameterStore {
    client: aws_sdk_ssm::Client,
    runtime: Arc<Runtime>,
}

/// Map an SDK failure onto the store taxonomy by its error code.
fn classify<E>(err: E, path: &str) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    match err.code() {
        Some("ParameterNotFound") => StoreError::NotFound(path.to_string()),
        Some("ParameterAlreadyExists") => StoreError::AlreadyExists(path.to_string()),
        Some("AccessDeniedException") => StoreError::AccessDenied(path.to_string()),
        _ => StoreError::Api(format!("{}", DisplayErrorContext(err))),
    }
}

impl ParameterStore for AwsParameterStore {
    fn get(&self, path: &str) -> Result<String, StoreError> {
        let output = self
            .runtime
            .block_on(
                self.client
                    .get_parameter()
                    .name(path)
                    .with_decryption(true)
                    .send(),
            )
            .map_err(|e| classify(e, path))?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| StoreError::Api(format!("parameter {} has no value", path)))
    }

    fn put(&self, request: &PutRequest) -> Result<(), StoreError> {
        let overwrite = match request.mode {
            PutMode::Create { overwrite } => overwrite,
            PutMode::Update => true,
        };

        let builder = self
            .client
            .put_parameter()
            .name(&request.path)
            .value(&request.value)
            .overwrite(overwrite)
            .set_type(request.param_type.as_deref().map(ParameterType::from))
            .set_description(request.description.clone())
            .set_key_id(request.kms_key.clone());

        self.runtime
            .block_on(builder.send())
            .map_err(|e| classify(e, &request.path))?;
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.runtime
            .block_on(self.client.delete_parameter().name(path).send())
            .map_err(|e| classify(e, path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_ssm::error::ErrorMetadata;
    use aws_sdk_ssm::operation::delete_parameter::DeleteParameterError;
    use aws_sdk_ssm::operation::get_parameter::GetParameterError;
    use aws_sdk_ssm::operation::put_parameter::PutParameterError;

    use super::*;

    fn metadata(code: &str) -> ErrorMetadata {
        ErrorMetadata::builder()
            .code(code)
            .message("service error")
            .build()
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err = DeleteParameterError::generic(metadata("ParameterNotFound"));
        assert_eq!(classify(err, "/a"), StoreError::NotFound("/a".to_string()));

        let err = GetParameterError::generic(metadata("ParameterNotFound"));
        assert_eq!(classify(err, "/a"), StoreError::NotFound("/a".to_string()));
    }

    #[test]
    fn test_already_exists_maps_to_already_exists() {
        let err = PutParameterError::generic(metadata("ParameterAlreadyExists"));
        assert_eq!(
            classify(err, "/a"),
            StoreError::AlreadyExists("/a".to_string())
        );
    }

    #[test]
    fn test_access_denied_maps_to_access_denied() {
        let err = PutParameterError::generic(metadata("AccessDeniedException"));
        assert_eq!(
            classify(err, "/a"),
            StoreError::AccessDenied("/a".to_string())
        );
    }

    #[test]
    fn test_unknown_code_maps_to_api() {
        let err = DeleteParameterError::generic(metadata("ThrottlingException"));
        assert!(matches!(classify(err, "/a"), StoreError::Api(_)));
    }
}
