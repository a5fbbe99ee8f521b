use std::path::{Path, PathBuf};

use vcf_norm_core::config::NormaliseConfig;
use vcf_norm_core::storage_keys::{object_file_name, output_object_key};

use crate::adapters::object_store::ObjectStore;
use crate::error::{HandlerError, TransferDirection};

/// Moves the input, reference genome, and normalised output between the
/// object store and the workspace directory.
pub struct ObjectTransfer<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    config: &'a NormaliseConfig,
    workspace_dir: &'a Path,
}

impl<'a, S: ObjectStore + ?Sized> ObjectTransfer<'a, S> {
    pub fn new(store: &'a S, config: &'a NormaliseConfig, workspace_dir: &'a Path) -> Self {
        Self {
            store,
            config,
            workspace_dir,
        }
    }

    pub fn download_input(&self, bucket: &str, key: &str) -> Result<PathBuf, HandlerError> {
        self.download(bucket, key)
    }

    pub fn download_genome(&self) -> Result<PathBuf, HandlerError> {
        self.download(&self.config.genome_bucket, &self.config.genome_key)
    }

    /// Uploads `local_path` next to the input under the configured output
    /// prefix and returns the key it was written to.
    pub fn upload_output(
        &self,
        bucket: &str,
        original_key: &str,
        local_path: &Path,
    ) -> Result<String, HandlerError> {
        let output_key = output_object_key(&self.config.output_prefix, original_key)
            .ok_or_else(|| HandlerError::KeyWithoutFileName(original_key.to_string()))?;

        self.store
            .upload_from(bucket, &output_key, local_path)
            .map_err(|message| HandlerError::Transfer {
                direction: TransferDirection::Upload,
                bucket: bucket.to_string(),
                key: output_key.clone(),
                message,
            })?;

        Ok(output_key)
    }

    fn download(&self, bucket: &str, key: &str) -> Result<PathBuf, HandlerError> {
        let file_name = object_file_name(key)
            .ok_or_else(|| HandlerError::KeyWithoutFileName(key.to_string()))?;
        let destination = self.workspace_dir.join(file_name);

        self.store
            .download_to(bucket, key, &destination)
            .map_err(|message| HandlerError::Transfer {
                direction: TransferDirection::Download,
                bucket: bucket.to_string(),
                key: key.to_string(),
                message,
            })?;

        Ok(destination)
    }
}
