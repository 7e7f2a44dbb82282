//! Configuration document model
//!
//! Parses and validates a single `.params2env.yaml` document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Fixed file name used in both the home and the working directory.
pub const CONFIG_FILE_NAME: &str = ".params2env.yaml";

/// Output destination for `read`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Print `export` lines to stdout
    Env,
    /// Write `export` lines to the configured file
    File,
}

impl OutputMode {
    /// Parse the literal config value (`env` or `file`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "env" => Some(OutputMode::Env),
            "file" => Some(OutputMode::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Env => "env",
            OutputMode::File => "file",
        }
    }
}

/// Effective settings shared by all subcommands.
///
/// String fields treat `None` and `Some("")` alike: both mean "not
/// specified". Use the accessors to read them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default AWS region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Region that writes are replicated to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replica: Option<String>,

    /// Reserved path-scoping hint, currently unused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Default output mode (`env` or `file`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Output file for `read`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Upper-case generated variable names (unset inherits)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<bool>,

    /// Prefix for generated variable names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_prefix: Option<String>,

    /// IAM role ARN to assume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Default KMS key for SecureString parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms: Option<String>,

    /// Parameters read when `read` runs without `--path`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamConfig>,
}

/// Per-parameter settings for `read`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamConfig {
    /// Full parameter path (required, checked by validation)
    #[serde(default)]
    pub name: String,

    /// Variable name override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,

    /// Region override for this parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Output mode override for this parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Configuration errors. Each names the offending file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}", path = .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}", path = .path.display())]
    Unparseable {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config file {path}: {reason}", path = .path.display())]
    Invalid { path: PathBuf, reason: String },
}

impl ConfigError {
    /// File the error refers to
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Unreadable { path, .. }
            | ConfigError::Unparseable { path, .. }
            | ConfigError::Invalid { path, .. } => path,
        }
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl Config {
    /// Load, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse and validate a YAML document. `origin` is only used in errors.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        // A comment-only document deserializes as null
        let config: Option<Config> =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Unparseable {
                path: origin.to_path_buf(),
                source,
            })?;
        let config = config.unwrap_or_default();

        config.validate().map_err(|reason| ConfigError::Invalid {
            path: origin.to_path_buf(),
            reason,
        })?;
        Ok(config)
    }

    /// Semantic checks applied to every loaded document.
    pub fn validate(&self) -> Result<(), String> {
        for (index, param) in self.params.iter().enumerate() {
            if param.name.is_empty() {
                return Err(format!("parameter at index {} missing name", index));
            }
            if let Some(output) = non_empty(&param.output) {
                if OutputMode::parse(output).is_none() {
                    return Err(format!(
                        "parameter '{}': invalid output format {:?} (must be 'env' or 'file')",
                        param.name, output
                    ));
                }
            }
        }

        if let Some(output) = non_empty(&self.output) {
            if OutputMode::parse(output).is_none() {
                return Err(format!(
                    "invalid output format {:?} (must be 'env' or 'file')",
                    output
                ));
            }
        }

        Ok(())
    }

    pub fn region(&self) -> Option<&str> {
        non_empty(&self.region)
    }

    pub fn replica(&self) -> Option<&str> {
        non_empty(&self.replica)
    }

    pub fn file(&self) -> Option<&str> {
        non_empty(&self.file)
    }

    pub fn env_prefix(&self) -> Option<&str> {
        non_empty(&self.env_prefix)
    }

    pub fn role(&self) -> Option<&str> {
        non_empty(&self.role)
    }

    pub fn kms(&self) -> Option<&str> {
        non_empty(&self.kms)
    }

    /// Validated output mode; `validate` guarantees the literal is known.
    pub fn output_mode(&self) -> Option<OutputMode> {
        non_empty(&self.output).and_then(OutputMode::parse)
    }
}

impl ParamConfig {
    /// Convenience constructor used for single-path reads.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn env(&self) -> Option<&str> {
        non_empty(&self.env)
    }

    pub fn region(&self) -> Option<&str> {
        non_empty(&self.region)
    }

    pub fn output_mode(&self) -> Option<OutputMode> {
        non_empty(&self.output).and_then(OutputMode::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> PathBuf {
        PathBuf::from("test.yaml")
    }

    #[test]
    fn test_parse_full_document() {
        let content = r#"
region: eu-central-1
replica: eu-west-1
prefix: /myapp
output: file
file: /tmp/app.env
upper: false
env_prefix: APP
role: arn:aws:iam::123456789012:role/reader
kms: alias/app
params:
  - name: /myapp/db/url
    env: DATABASE_URL
  - name: /myapp/api/key
    region: us-east-1
    output: env
"#;

        let config = Config::parse(content, &origin()).unwrap();
        assert_eq!(config.region(), Some("eu-central-1"));
        assert_eq!(config.replica(), Some("eu-west-1"));
        assert_eq!(config.prefix.as_deref(), Some("/myapp"));
        assert_eq!(config.output_mode(), Some(OutputMode::File));
        assert_eq!(config.file(), Some("/tmp/app.env"));
        assert_eq!(config.upper, Some(false));
        assert_eq!(config.env_prefix(), Some("APP"));
        assert_eq!(config.kms(), Some("alias/app"));
        assert_eq!(config.params.len(), 2);
        assert_eq!(config.params[0].env(), Some("DATABASE_URL"));
        assert_eq!(config.params[1].region(), Some("us-east-1"));
        assert_eq!(config.params[1].output_mode(), Some(OutputMode::Env));
    }

    #[test]
    fn test_empty_document_is_empty_config() {
        assert_eq!(Config::parse("", &origin()).unwrap(), Config::default());
        assert_eq!(
            Config::parse("# nothing here\n", &origin()).unwrap(),
            Config::default()
        );
    }

    #[test]
    fn test_upper_is_tri_state() {
        let unset = Config::parse("region: us-east-1", &origin()).unwrap();
        assert_eq!(unset.upper, None);

        let explicit_false = Config::parse("upper: false", &origin()).unwrap();
        assert_eq!(explicit_false.upper, Some(false));
    }

    #[test]
    fn test_empty_string_reads_as_unset() {
        let config = Config::parse("region: \"\"", &origin()).unwrap();
        assert_eq!(config.region(), None);
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let result = Config::parse("region: [unclosed", &origin());
        assert!(matches!(result, Err(ConfigError::Unparseable { .. })));
    }

    #[test]
    fn test_missing_param_name_rejected() {
        let content = "params:\n  - env: FOO\n";
        let err = Config::parse(content, &origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("index 0 missing name"));
        assert!(err.to_string().contains("test.yaml"));
    }

    #[test]
    fn test_empty_param_name_rejected() {
        let content = "params:\n  - name: /ok\n  - name: \"\"\n";
        let err = Config::parse(content, &origin()).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_invalid_output_rejected() {
        let err = Config::parse("output: json", &origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("json"));
    }

    #[test]
    fn test_invalid_param_output_rejected() {
        let content = "params:\n  - name: /a/b\n    output: stdout\n";
        let err = Config::parse(content, &origin()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("/a/b"));
        assert!(err.to_string().contains("stdout"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = Config::parse("region: us-east-1\nunknown: 1\n", &origin()).unwrap();
        assert_eq!(config.region(), Some("us-east-1"));
    }

    #[test]
    fn test_load_missing_file_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
        assert_eq!(err.path(), path.as_path());
    }
}
