use std::io::Write;

use clap::Args;

use super::TargetArgs;
use crate::coordinator::{ModifyRequest, ParameterOperationCoordinator};
use crate::error::Result;
use crate::store::ClientFactory;

/// Flags for `modify`
#[derive(Debug, Clone, Args)]
pub struct ModifyArgs {
    /// Parameter path
    #[arg(long)]
    pub path: String,

    /// New parameter value
    #[arg(long)]
    pub value: String,

    /// New parameter description
    #[arg(long)]
    pub description: Option<String>,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl ModifyArgs {
    pub fn to_request(&self) -> ModifyRequest {
        ModifyRequest {
            path: self.path.clone(),
            value: self.value.clone(),
            description: self.description.clone(),
            flags: self.target.to_flags(),
        }
    }
}

pub fn run_modify<F: ClientFactory>(
    args: &ModifyArgs,
    coordinator: &ParameterOperationCoordinator<F>,
    out: &mut dyn Write,
) -> Result<()> {
    coordinator.modify(&args.to_request(), out)?;
    Ok(())
}
