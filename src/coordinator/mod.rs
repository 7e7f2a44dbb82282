//! Parameter operation coordinator
//!
//! Merges CLI values over the resolved config, validates everything before
//! the first network call, resolves regions, and runs writes against the
//! primary region and then the optional replica.
//!
//! Replica policy:
//! - Primary failure aborts; no replica attempt is made
//! - Replica failure after a successful primary is an error; the primary
//!   write is NOT rolled back
//! - Exception: `delete` on a replica where the parameter is already absent
//!   succeeds with a warning

mod kms;

pub use kms::rewrite_kms_region;

use std::collections::HashMap;
use std::io::Write;

use params2env_validation::{
    validate_kms_key, validate_parameter_path, validate_parameter_type, validate_region,
    validate_regions, validate_replica_region, validate_role_arn, ValidationError,
    PARAMETER_TYPE_SECURE_STRING,
};
use tracing::{debug, info, warn};

use crate::config::{Config, ParamConfig};
use crate::error::{Error, Result};
use crate::logging::sanitize_for_log;
use crate::store::{ClientFactory, ParameterStore, PutMode, PutRequest, StoreError};

/// Environment variable used as the last region fallback
pub const REGION_ENV_VAR: &str = "AWS_REGION";

/// Region and identity flags given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionFlags {
    pub region: Option<String>,
    pub replica: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub path: String,
    pub value: String,
    pub param_type: String,
    pub description: Option<String>,
    pub kms: Option<String>,
    pub overwrite: bool,
    pub flags: RegionFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyRequest {
    pub path: String,
    pub value: String,
    pub description: Option<String>,
    pub flags: RegionFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub path: String,
    pub flags: RegionFlags,
}

/// `read` input; without `path` the config `params` are read in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadRequest {
    pub path: Option<String>,
    pub flags: RegionFlags,
}

/// A value fetched by `read`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedParameter {
    pub param: ParamConfig,
    pub region: String,
    pub value: String,
}

/// What happened in the replica region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicaOutcome {
    Applied { region: String },
    /// Delete found nothing to remove
    AlreadyAbsent { region: String },
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub primary: String,
    pub replica: Option<ReplicaOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Create,
    Modify,
    Delete,
}

impl Verb {
    fn action(&self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Modify => "modify",
            Verb::Delete => "delete",
        }
    }

    fn past(&self) -> &'static str {
        match self {
            Verb::Create => "created",
            Verb::Modify => "modified",
            Verb::Delete => "deleted",
        }
    }
}

/// Regions and role for one write, after merge and validation
#[derive(Debug)]
struct WritePlan {
    primary: String,
    replica: Option<String>,
    role: Option<String>,
}

/// First non-empty value in precedence order.
fn first_set<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates.iter().flatten().copied().find(|v| !v.is_empty())
}

/// Choose a region: flag, then config, then environment.
pub fn resolve_region(
    flag: Option<&str>,
    config: Option<&str>,
    env: Option<&str>,
) -> Result<String> {
    first_set(&[flag, config, env])
        .map(str::to_string)
        .ok_or(Error::MissingRegion)
}

fn store_error(verb: Verb, path: &str, region: &str, err: StoreError) -> Error {
    match err {
        StoreError::NotFound(_) => Error::NotFound {
            path: path.to_string(),
            region: region.to_string(),
        },
        StoreError::AlreadyExists(_) => Error::AlreadyExists {
            path: path.to_string(),
            region: region.to_string(),
        },
        source => Error::Store {
            action: verb.action(),
            path: path.to_string(),
            region: region.to_string(),
            source,
        },
    }
}

/// Runs store operations for the CLI verbs.
pub struct ParameterOperationCoordinator<F> {
    factory: F,
    config: Config,
    env_region: Option<String>,
}

impl<F: ClientFactory> ParameterOperationCoordinator<F> {
    /// Coordinator with no environment region fallback.
    pub fn new(factory: F, config: Config) -> Self {
        Self {
            factory,
            config,
            env_region: None,
        }
    }

    /// Set the region used when neither flag nor config provides one.
    pub fn with_env_region(mut self, region: Option<String>) -> Self {
        self.env_region = region.filter(|r| !r.is_empty());
        self
    }

    /// Take the fallback region from `AWS_REGION`.
    pub fn with_process_env(self) -> Self {
        let region = std::env::var(REGION_ENV_VAR).ok();
        self.with_env_region(region)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn connect(&self, region: &str, role: Option<&str>) -> Result<Box<dyn ParameterStore>> {
        debug!(region = %region, assume_role = role.is_some(), "Building store client");
        self.factory
            .new_client(region, role)
            .map_err(|source| Error::Client {
                region: region.to_string(),
                source,
            })
    }

    /// Merge flags over config, validate, and resolve the write regions.
    fn plan(&self, path: &str, flags: &RegionFlags) -> Result<WritePlan> {
        validate_parameter_path(path)?;

        let replica = first_set(&[flags.replica.as_deref(), self.config.replica()]);
        let role = first_set(&[flags.role.as_deref(), self.config.role()]);

        if let Some(replica) = replica {
            validate_replica_region(replica)?;
        }
        if let Some(role) = role {
            validate_role_arn(role)?;
        }

        let primary = resolve_region(
            flags.region.as_deref(),
            self.config.region(),
            self.env_region.as_deref(),
        )?;
        validate_region(&primary)?;
        validate_regions(&primary, replica.unwrap_or_default())?;

        debug!(primary = %primary, replica = ?replica, "Resolved regions");
        Ok(WritePlan {
            primary,
            replica: replica.map(str::to_string),
            role: role.map(str::to_string),
        })
    }

    /// Primary call, then the replica call if one is planned.
    fn sequence<P, R>(
        &self,
        verb: Verb,
        path: &str,
        plan: &WritePlan,
        out: &mut dyn Write,
        primary_op: P,
        replica_op: R,
    ) -> Result<WriteOutcome>
    where
        P: FnOnce(&dyn ParameterStore) -> std::result::Result<(), StoreError>,
        R: FnOnce(&dyn ParameterStore) -> std::result::Result<(), StoreError>,
    {
        let role = plan.role.as_deref();
        let log_path = sanitize_for_log(path);

        let client = self.connect(&plan.primary, role)?;
        info!(action = verb.action(), path = %log_path, region = %plan.primary, "Primary write");
        primary_op(client.as_ref()).map_err(|e| store_error(verb, path, &plan.primary, e))?;
        writeln!(
            out,
            "Successfully {} parameter '{}' in region '{}'",
            verb.past(),
            path,
            plan.primary
        )
        .map_err(Error::stdout)?;

        let Some(replica) = plan.replica.as_deref() else {
            return Ok(WriteOutcome {
                primary: plan.primary.clone(),
                replica: None,
            });
        };

        info!(action = verb.action(), path = %log_path, region = %replica, "Replica write");
        let result = self.connect(replica, role).and_then(|client| {
            replica_op(client.as_ref()).map_err(|e| store_error(verb, path, replica, e))
        });

        let outcome = match result {
            Ok(()) => {
                writeln!(
                    out,
                    "Successfully {} parameter '{}' in replica region '{}'",
                    verb.past(),
                    path,
                    replica
                )
                .map_err(Error::stdout)?;
                ReplicaOutcome::Applied {
                    region: replica.to_string(),
                }
            }
            Err(err) if verb == Verb::Delete && err.is_not_found() => {
                warn!(
                    path = %log_path,
                    region = %replica,
                    "Parameter not found in replica region (already deleted or never existed)"
                );
                ReplicaOutcome::AlreadyAbsent {
                    region: replica.to_string(),
                }
            }
            Err(err) => {
                return Err(Error::Replica {
                    region: replica.to_string(),
                    primary: plan.primary.clone(),
                    source: Box::new(err),
                });
            }
        };

        Ok(WriteOutcome {
            primary: plan.primary.clone(),
            replica: Some(outcome),
        })
    }

    /// Create a parameter, then replicate it.
    pub fn create(&self, request: &CreateRequest, out: &mut dyn Write) -> Result<WriteOutcome> {
        if request.value.is_empty() {
            return Err(ValidationError::MissingValue("value").into());
        }
        let param_type = validate_parameter_type(&request.param_type)?.to_string();
        let plan = self.plan(&request.path, &request.flags)?;

        let kms = first_set(&[request.kms.as_deref(), self.config.kms()]);
        if let Some(kms) = kms {
            validate_kms_key(kms)?;
        }
        let kms = match kms {
            Some(_) if param_type != PARAMETER_TYPE_SECURE_STRING => {
                debug!("Ignoring KMS key for non-SecureString parameter");
                None
            }
            other => other,
        };

        // Computed up front so a bad ARN fails before any write
        let replica_kms = match (kms, plan.replica.as_deref()) {
            (Some(key), Some(replica)) => Some(rewrite_kms_region(key, replica)?),
            _ => None,
        };

        let base = PutRequest {
            path: request.path.clone(),
            value: request.value.clone(),
            param_type: Some(param_type),
            description: request.description.clone().filter(|d| !d.is_empty()),
            kms_key: kms.map(str::to_string),
            mode: PutMode::Create {
                overwrite: request.overwrite,
            },
        };
        let replica_request = PutRequest {
            kms_key: replica_kms,
            ..base.clone()
        };

        self.sequence(
            Verb::Create,
            &request.path,
            &plan,
            out,
            |client| client.put(&base),
            |client| client.put(&replica_request),
        )
    }

    /// Update an existing parameter, then the replica.
    pub fn modify(&self, request: &ModifyRequest, out: &mut dyn Write) -> Result<WriteOutcome> {
        if request.value.is_empty() {
            return Err(ValidationError::MissingValue("value").into());
        }
        let plan = self.plan(&request.path, &request.flags)?;

        let put = PutRequest {
            path: request.path.clone(),
            value: request.value.clone(),
            param_type: None,
            description: request.description.clone().filter(|d| !d.is_empty()),
            kms_key: None,
            mode: PutMode::Update,
        };

        self.sequence(
            Verb::Modify,
            &request.path,
            &plan,
            out,
            |client| client.put(&put),
            |client| client.put(&put),
        )
    }

    /// Delete a parameter, then the replica.
    pub fn delete(&self, request: &DeleteRequest, out: &mut dyn Write) -> Result<WriteOutcome> {
        let plan = self.plan(&request.path, &request.flags)?;
        let path = request.path.as_str();

        self.sequence(
            Verb::Delete,
            path,
            &plan,
            out,
            |client| client.delete(path),
            |client| client.delete(path),
        )
    }

    /// Fetch one parameter, or every configured parameter in order.
    ///
    /// All paths and regions are validated before the first call.
    pub fn read(&self, request: &ReadRequest) -> Result<Vec<FetchedParameter>> {
        let params: Vec<ParamConfig> = match request.path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => vec![ParamConfig::named(path)],
            None if !self.config.params.is_empty() => self.config.params.clone(),
            None => return Err(ValidationError::MissingValue("path").into()),
        };

        let region_flag = request.flags.region.as_deref();
        if let Some(region) = region_flag {
            validate_region(region)?;
        }
        let role = first_set(&[request.flags.role.as_deref(), self.config.role()]);
        if let Some(role) = role {
            validate_role_arn(role)?;
        }

        let mut planned = Vec::with_capacity(params.len());
        for param in params {
            validate_parameter_path(&param.name)?;
            let region = resolve_region(
                first_set(&[param.region(), region_flag]),
                self.config.region(),
                self.env_region.as_deref(),
            )?;
            validate_region(&region)?;
            planned.push((param, region));
        }

        let mut clients: HashMap<String, Box<dyn ParameterStore>> = HashMap::new();
        let mut fetched = Vec::with_capacity(planned.len());
        for (param, region) in planned {
            if !clients.contains_key(&region) {
                let client = self.connect(&region, role)?;
                clients.insert(region.clone(), client);
            }
            let client = &clients[&region];

            info!(path = %sanitize_for_log(&param.name), region = %region, "Reading parameter");
            let value = client
                .get(&param.name)
                .map_err(|e| match e {
                    StoreError::NotFound(_) => Error::NotFound {
                        path: param.name.clone(),
                        region: region.clone(),
                    },
                    source => Error::Store {
                        action: "get",
                        path: param.name.clone(),
                        region: region.clone(),
                        source,
                    },
                })?;

            fetched.push(FetchedParameter {
                param,
                region,
                value,
            });
        }

        Ok(fetched)
    }
}
