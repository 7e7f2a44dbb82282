use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::config::{Config, OutputMode};
use crate::coordinator::{ParameterOperationCoordinator, ReadRequest, RegionFlags};
use crate::error::{Error, Result};
use crate::output::{env_name, export_line, write_private_file, NameStyle};
use crate::store::ClientFactory;

/// Flags for `read`
#[derive(Debug, Clone, Default, Args)]
pub struct ReadArgs {
    /// Parameter path (required if no parameters are defined in config)
    #[arg(long)]
    pub path: Option<String>,

    /// AWS region (default: from config or AWS_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// AWS role ARN to assume
    #[arg(long)]
    pub role: Option<String>,

    /// Write output to this file instead of stdout
    #[arg(long)]
    pub file: Option<String>,

    /// Convert env var names to uppercase (default: true)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub upper: Option<bool>,

    /// Prefix for env var names
    #[arg(long = "env-prefix")]
    pub env_prefix: Option<String>,

    /// Env var name for a single --path
    #[arg(long)]
    pub env: Option<String>,
}

/// Where one `export` line goes
#[derive(Debug, Clone, PartialEq, Eq)]
enum Destination {
    Stdout,
    File(PathBuf),
}

/// Output routing for one `read` run, decided before any fetch.
#[derive(Debug)]
struct OutputPlan {
    file: Option<PathBuf>,
    default: Destination,
    forced: bool,
}

impl OutputPlan {
    fn new(args: &ReadArgs, config: &Config) -> Result<Self> {
        if let Some(file) = args.file.as_deref().filter(|f| !f.is_empty()) {
            let file = PathBuf::from(file);
            return Ok(Self {
                default: Destination::File(file.clone()),
                file: Some(file),
                forced: true,
            });
        }

        let file = config.file().map(PathBuf::from);
        let default = match (config.output_mode(), &file) {
            (Some(OutputMode::Env), _) => Destination::Stdout,
            (Some(OutputMode::File), Some(file)) | (None, Some(file)) => {
                Destination::File(file.clone())
            }
            (Some(OutputMode::File), None) => return Err(Error::MissingOutputFile),
            (None, None) => Destination::Stdout,
        };
        Ok(Self {
            file,
            default,
            forced: false,
        })
    }

    /// A per-parameter `output` wins unless `--file` was given.
    fn route(&self, mode: Option<OutputMode>) -> Result<Destination> {
        if self.forced {
            return Ok(self.default.clone());
        }
        match mode {
            None => Ok(self.default.clone()),
            Some(OutputMode::Env) => Ok(Destination::Stdout),
            Some(OutputMode::File) => self
                .file
                .clone()
                .map(Destination::File)
                .ok_or(Error::MissingOutputFile),
        }
    }
}

pub fn run_read<F: ClientFactory>(
    args: &ReadArgs,
    coordinator: &ParameterOperationCoordinator<F>,
    out: &mut dyn Write,
) -> Result<()> {
    let config = coordinator.config();
    let single = args.path.as_deref().is_some_and(|p| !p.is_empty());

    let plan = OutputPlan::new(args, config)?;
    if !single {
        // Routing errors must surface before any network call
        for param in &config.params {
            plan.route(param.output_mode())?;
        }
    }

    let upper = args.upper.or(config.upper).unwrap_or(true);
    let prefix = args
        .env_prefix
        .as_deref()
        .filter(|p| !p.is_empty())
        .or(config.env_prefix());
    let style = NameStyle { prefix, upper };

    let request = ReadRequest {
        path: args.path.clone(),
        flags: RegionFlags {
            region: args.region.clone(),
            replica: None,
            role: args.role.clone(),
        },
    };
    let fetched = coordinator.read(&request)?;

    let mut stdout_buf = String::new();
    let mut file_buf = String::new();
    let mut file_target: Option<PathBuf> = None;

    for item in &fetched {
        let explicit = if single {
            args.env.as_deref()
        } else {
            item.param.env()
        };
        let line = export_line(&env_name(&item.param.name, explicit, style), &item.value);

        let mode = if single { None } else { item.param.output_mode() };
        match plan.route(mode)? {
            Destination::Stdout => stdout_buf.push_str(&line),
            Destination::File(path) => {
                writeln!(
                    out,
                    "Reading parameter '{}' from region '{}'",
                    item.param.name, item.region
                )
                .map_err(Error::stdout)?;
                file_buf.push_str(&line);
                file_target = Some(path);
            }
        }
    }

    if let Some(path) = file_target {
        write_private_file(&path, file_buf.as_bytes())?;
        writeln!(out, "Parameter value written to {}", path.display()).map_err(Error::stdout)?;
    }
    out.write_all(stdout_buf.as_bytes()).map_err(Error::stdout)?;
    Ok(())
}
