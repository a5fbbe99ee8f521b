use std::path::PathBuf;

use thiserror::Error;

use crate::command::DEFAULT_BCFTOOLS_PROGRAM;
use crate::storage_keys::object_file_name;

pub const GENOME_REF_BUCKET_VAR: &str = "GENOME_REF_BUCKET";
pub const GENOME_REF_KEY_VAR: &str = "GENOME_REF_KEY";
pub const OUTPUT_PREFIX_VAR: &str = "OUTPUT_PREFIX";
pub const WORK_DIR_VAR: &str = "WORK_DIR";
pub const BCFTOOLS_PATH_VAR: &str = "BCFTOOLS_PATH";

pub const DEFAULT_OUTPUT_PREFIX: &str = "output/";
pub const DEFAULT_WORK_DIR: &str = "/tmp/vcf_norm";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
    #[error("GENOME_REF_KEY `{0}` does not name a file")]
    GenomeKeyWithoutFileName(String),
}

/// Process-wide settings, read once at start-up and shared immutably by every
/// invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormaliseConfig {
    pub genome_bucket: String,
    pub genome_key: String,
    pub output_prefix: String,
    pub work_dir: PathBuf,
    pub bcftools_program: String,
}

impl NormaliseConfig {
    /// Builds the config from any name lookup; the Lambda binary passes the
    /// process environment. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let genome_key =
            value(GENOME_REF_KEY_VAR).ok_or(ConfigError::Missing(GENOME_REF_KEY_VAR))?;
        if object_file_name(&genome_key).is_none() {
            return Err(ConfigError::GenomeKeyWithoutFileName(genome_key));
        }

        Ok(Self {
            genome_bucket: value(GENOME_REF_BUCKET_VAR)
                .ok_or(ConfigError::Missing(GENOME_REF_BUCKET_VAR))?,
            genome_key,
            output_prefix: value(OUTPUT_PREFIX_VAR)
                .unwrap_or_else(|| DEFAULT_OUTPUT_PREFIX.to_string()),
            work_dir: value(WORK_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR)),
            bcftools_program: value(BCFTOOLS_PATH_VAR)
                .unwrap_or_else(|| DEFAULT_BCFTOOLS_PROGRAM.to_string()),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}
