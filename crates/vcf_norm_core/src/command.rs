use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::storage_keys::normalised_file_name;

pub const DEFAULT_BCFTOOLS_PROGRAM: &str = "bcftools";
pub const NORM_SUBCOMMAND: &str = "norm";
pub const REFERENCE_FLAG: &str = "-f";
pub const KEEP_SUM_FLAG: &str = "--keep-sum";
/// `--keep-sum` takes the tags to sum when multiallelic sites are joined.
pub const KEEP_SUM_TAGS: &str = "AD";
pub const COMPRESSED_VCF_OUTPUT_FLAG: &str = "-Oz";
pub const OUTPUT_FLAG: &str = "-o";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("input path `{}` has no file name", .0.display())]
pub struct MissingFileName(pub PathBuf);

/// One `bcftools norm` invocation, kept as discrete argv tokens so paths are
/// never re-parsed by a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormCommand {
    pub program: String,
    pub genome_path: PathBuf,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl NormCommand {
    pub fn new(
        program: impl Into<String>,
        workspace_dir: &Path,
        input_path: &Path,
        genome_path: &Path,
    ) -> Result<Self, MissingFileName> {
        Ok(Self {
            program: program.into(),
            genome_path: genome_path.to_path_buf(),
            input_path: input_path.to_path_buf(),
            output_path: normalised_output_path(workspace_dir, input_path)?,
        })
    }

    pub fn args(&self) -> Vec<OsString> {
        vec![
            NORM_SUBCOMMAND.into(),
            REFERENCE_FLAG.into(),
            self.genome_path.clone().into_os_string(),
            KEEP_SUM_FLAG.into(),
            KEEP_SUM_TAGS.into(),
            COMPRESSED_VCF_OUTPUT_FLAG.into(),
            OUTPUT_FLAG.into(),
            self.output_path.clone().into_os_string(),
            self.input_path.clone().into_os_string(),
        ]
    }

    /// Human-readable rendering for logs. Not suitable for a shell.
    pub fn display(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in self.args() {
            rendered.push(' ');
            rendered.push_str(&arg.to_string_lossy());
        }
        rendered
    }
}

pub fn normalised_output_path(
    workspace_dir: &Path,
    input_path: &Path,
) -> Result<PathBuf, MissingFileName> {
    let file_name = input_path
        .file_name()
        .ok_or_else(|| MissingFileName(input_path.to_path_buf()))?;
    Ok(workspace_dir.join(normalised_file_name(&file_name.to_string_lossy())))
}

/// Parses the `Lines   total/split/joined/realigned/skipped:\t1/2/3/4/5`
/// summary bcftools norm prints on stderr. Label sets differ between bcftools
/// releases, so labels are taken from the line itself.
pub fn parse_norm_summary(stderr: &str) -> Option<BTreeMap<String, u64>> {
    let line = stderr
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("Lines"))?;
    let (labels, values) = line.trim_start_matches("Lines").split_once(':')?;

    let labels: Vec<&str> = labels.trim().split('/').collect();
    let values = values
        .trim()
        .split('/')
        .map(|value| value.trim().parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;
    if labels.len() != values.len() || labels.iter().any(|label| label.is_empty()) {
        return None;
    }

    Some(
        labels
            .into_iter()
            .map(str::to_string)
            .zip(values)
            .collect(),
    )
}
