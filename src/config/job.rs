use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::sink::{CsvSink, SheetSink, XlsxSink};
use crate::core::slack::ChannelFilters;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    self, validate_non_empty_string, validate_path, validate_positive_number, validate_url,
};

/// A job file: one Slack credential, one output target, and a list of
/// exports to run against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub slack: SlackConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub exports: Vec<ExportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    pub token: String,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Directory for `csv`, file path for `xlsx`. A `{timestamp}`
    /// placeholder is expanded at run time.
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Xlsx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub kind: ExportKind,
    pub sheet: String,
    pub fields: Option<Vec<String>>,
    pub exclude_archived: Option<bool>,
    pub types: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Channels,
    Users,
}

impl ExportConfig {
    /// Filter flags for a channel export; unset fields keep the Slack
    /// defaults.
    pub fn channel_filters(&self) -> ChannelFilters {
        let mut filters = ChannelFilters::default();
        if let Some(exclude_archived) = self.exclude_archived {
            filters.exclude_archived = exclude_archived;
        }
        if let Some(types) = &self.types {
            filters.types = types.clone();
        }
        if let Some(limit) = self.limit {
            filters.limit = limit;
        }
        filters
    }
}

impl JobConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| SyncError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }
}

impl OutputConfig {
    /// Expands the `{timestamp}` placeholder in the configured path.
    pub fn resolved_path(&self) -> PathBuf {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();
        PathBuf::from(self.path.replace("{timestamp}", &timestamp))
    }

    pub fn build_sink(&self) -> (PathBuf, Box<dyn SheetSink>) {
        let path = self.resolved_path();
        let sink: Box<dyn SheetSink> = match self.format {
            OutputFormat::Csv => Box::new(CsvSink::new(&path)),
            OutputFormat::Xlsx => Box::new(XlsxSink::new(&path)),
        };
        (path, sink)
    }
}

/// Replaces `${VAR}` references with the environment variable's value;
/// unknown variables are left as-is so validation can report them.
fn substitute_env_vars(content: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .to_string()
}

impl validation::Validate for JobConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("slack.token", &self.slack.token)?;
        if self.slack.token.starts_with("${") {
            return Err(SyncError::InvalidConfigValueError {
                field: "slack.token".to_string(),
                value: self.slack.token.clone(),
                reason: "environment variable is not set".to_string(),
            });
        }
        if let Some(api_base) = &self.slack.api_base {
            validate_url("slack.api_base", api_base)?;
        }

        validate_path("output.path", &self.output.path)?;

        if self.exports.is_empty() {
            return Err(SyncError::MissingConfigError {
                field: "exports".to_string(),
            });
        }

        for (index, export) in self.exports.iter().enumerate() {
            validate_non_empty_string(&format!("exports[{}].sheet", index), &export.sheet)?;
            if let Some(limit) = export.limit {
                validate_positive_number(&format!("exports[{}].limit", index), limit as usize, 1)?;
            }
            if let Some(fields) = &export.fields {
                if fields.is_empty() {
                    return Err(SyncError::InvalidConfigValueError {
                        field: format!("exports[{}].fields", index),
                        value: "[]".to_string(),
                        reason: "field list cannot be empty".to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
