//! Subcommand handlers
//!
//! Each `*Args` struct is the immutable parsed form of one subcommand's
//! flags. Handlers turn it into a coordinator request and print results.

mod create;
mod delete;
mod modify;
mod read;

pub use create::{run_create, CreateArgs};
pub use delete::{run_delete, DeleteArgs};
pub use modify::{run_modify, ModifyArgs};
pub use read::{run_read, ReadArgs};

use clap::Args;

use crate::coordinator::RegionFlags;

/// Region, replica and role flags shared by the write commands
#[derive(Debug, Clone, Default, Args)]
pub struct TargetArgs {
    /// AWS region (default: from config or AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// AWS role ARN to assume
    #[arg(long)]
    pub role: Option<String>,

    /// Region to replicate the operation to
    #[arg(long)]
    pub replica: Option<String>,
}

impl TargetArgs {
    pub fn to_flags(&self) -> RegionFlags {
        RegionFlags {
            region: self.region.clone(),
            replica: self.replica.clone(),
            role: self.role.clone(),
        }
    }
}
