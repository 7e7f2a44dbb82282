use std::io::Write;

use clap::Args;
use params2env_validation::PARAMETER_TYPE_STRING;

use super::TargetArgs;
use crate::coordinator::{CreateRequest, ParameterOperationCoordinator};
use crate::error::Result;
use crate::store::ClientFactory;

/// Flags for `create`
#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    /// Parameter path
    #[arg(long)]
    pub path: String,

    /// Parameter value
    #[arg(long)]
    pub value: String,

    /// Parameter type (String or SecureString)
    #[arg(long = "type", default_value = PARAMETER_TYPE_STRING)]
    pub param_type: String,

    /// Parameter description
    #[arg(long)]
    pub description: Option<String>,

    /// KMS key ID, alias or ARN for SecureString parameters
    #[arg(long)]
    pub kms: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Overwrite an existing parameter
    #[arg(
        long,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub overwrite: bool,
}

impl CreateArgs {
    pub fn to_request(&self) -> CreateRequest {
        CreateRequest {
            path: self.path.clone(),
            value: self.value.clone(),
            param_type: self.param_type.clone(),
            description: self.description.clone(),
            kms: self.kms.clone(),
            overwrite: self.overwrite,
            flags: self.target.to_flags(),
        }
    }
}

pub fn run_create<F: ClientFactory>(
    args: &CreateArgs,
    coordinator: &ParameterOperationCoordinator<F>,
    out: &mut dyn Write,
) -> Result<()> {
    coordinator.create(&args.to_request(), out)?;
    Ok(())
}
