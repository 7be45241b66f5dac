//! Concrete catalog providers and the factory choosing one from configuration.

pub mod http;
pub mod snapshot;

use pazaryeri_core::config::ProviderConfig;
use pazaryeri_core::{CatalogError, CatalogProvider};
use tracing::debug;

pub use http::HttpCatalogProvider;
pub use snapshot::SnapshotFileProvider;

/// A configured snapshot file takes precedence over the HTTP API.
pub fn build_provider(config: &ProviderConfig) -> Result<Box<dyn CatalogProvider>, CatalogError> {
    match &config.snapshot_path {
        Some(path) => {
            debug!(path = %path.display(), "using snapshot file catalog provider");
            Ok(Box::new(SnapshotFileProvider::new(path.clone())))
        }
        None => {
            debug!(url = %config.products_url(), "using http catalog provider");
            Ok(Box::new(HttpCatalogProvider::new(config)?))
        }
    }
}
