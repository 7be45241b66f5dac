use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pazaryeri_core::{decode_envelope, CatalogError, CatalogProvider, CatalogSnapshot};

/// Reads a saved provider envelope from disk. The file is re-read on every fetch.
#[derive(Clone, Debug)]
pub struct SnapshotFileProvider {
    path: PathBuf,
}

impl SnapshotFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogProvider for SnapshotFileProvider {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    async fn fetch(&self) -> Result<CatalogSnapshot, CatalogError> {
        let body = tokio::fs::read(&self.path).await.map_err(|error| {
            CatalogError::unavailable(format!(
                "could not read catalog snapshot `{}`: {error}",
                self.path.display()
            ))
        })?;
        decode_envelope(&body)
    }
}
