use std::io::Write;

use clap::Args;

use super::TargetArgs;
use crate::coordinator::{DeleteRequest, ParameterOperationCoordinator};
use crate::error::Result;
use crate::store::ClientFactory;

/// Flags for `delete`
#[derive(Debug, Clone, Args)]
pub struct DeleteArgs {
    /// Parameter path
    #[arg(long)]
    pub path: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

impl DeleteArgs {
    pub fn to_request(&self) -> DeleteRequest {
        DeleteRequest {
            path: self.path.clone(),
            flags: self.target.to_flags(),
        }
    }
}

pub fn run_delete<F: ClientFactory>(
    args: &DeleteArgs,
    coordinator: &ParameterOperationCoordinator<F>,
    out: &mut dyn Write,
) -> Result<()> {
    coordinator.delete(&args.to_request(), out)?;
    Ok(())
}
