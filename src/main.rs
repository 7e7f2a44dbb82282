//! params2env CLI
//!
//! Entry point for the `params2env` command-line tool.

use std::io::Write;
use std::process;

use clap::{CommandFactory, Parser, Subcommand};
use params2env::commands::{
    run_create, run_delete, run_modify, run_read, CreateArgs, DeleteArgs, ModifyArgs, ReadArgs,
};
use params2env::logging::{self, LogLevel};
use params2env::store::AwsClientFactory;
use params2env::{ConfigResolver, Error, ParameterOperationCoordinator, Result};
use tracing::error;

#[derive(Parser)]
#[command(name = "params2env")]
#[command(about = "Read and manage AWS SSM Parameter Store parameters")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Log level (debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    loglevel: String,

    /// Print version information
    #[arg(long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read parameters and print them as shell exports
    Read(ReadArgs),

    /// Create a parameter
    Create(CreateArgs),

    /// Modify an existing parameter
    Modify(ModifyArgs),

    /// Delete a parameter
    Delete(DeleteArgs),
}

fn main() {
    let cli = Cli::parse();

    if cli.version {
        println!("params2env version {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return;
    };

    logging::init(LogLevel::parse(&cli.loglevel));

    if let Err(e) = run(command) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    let config = ConfigResolver::from_env().resolve()?;
    let factory = AwsClientFactory::new().map_err(Error::Runtime)?;
    let coordinator = ParameterOperationCoordinator::new(factory, config).with_process_env();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &command {
        Commands::Read(args) => run_read(args, &coordinator, &mut out)?,
        Commands::Create(args) => run_create(args, &coordinator, &mut out)?,
        Commands::Modify(args) => run_modify(args, &coordinator, &mut out)?,
        Commands::Delete(args) => run_delete(args, &coordinator, &mut out)?,
    }

    out.flush().map_err(|e| Error::Output {
        path: "stdout".to_string(),
        source: e,
    })
}
