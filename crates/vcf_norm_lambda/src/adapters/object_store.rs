use std::path::Path;

/// Blocking access to the object store. Implementations report failures as
/// messages; handlers attach bucket and key context.
pub trait ObjectStore {
    fn download_to(&self, bucket: &str, key: &str, destination: &Path) -> Result<(), String>;

    fn upload_from(&self, bucket: &str, key: &str, source: &Path) -> Result<(), String>;
}
