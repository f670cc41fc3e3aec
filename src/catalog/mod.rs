//! Static SP-API catalog built from bundled Swagger/OpenAPI model documents.

pub mod mapper;
pub mod model;
pub mod resolver;
pub mod swagger;

pub use model::{
    ApiCatalog, ApiCategory, ApiEndpoint, ApiParameter, ApiResponse, IntentMapping,
    ParameterLocation, RelatedEndpoint,
};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Load, resolve and map every model document under `dir`.
pub fn load_catalog(dir: &Path) -> Result<ApiCatalog> {
    let documents = swagger::load_documents(dir)
        .with_context(|| format!("Failed to load catalog from {}", dir.display()))?;

    let processed: Vec<swagger::SwaggerDocument> = documents
        .into_iter()
        .map(|doc| swagger::SwaggerDocument {
            document: swagger::process_document(&doc.document),
            source: doc.source,
        })
        .collect();

    Ok(mapper::map_documents(&processed))
}

/// Loads the catalog on first use and hands out shared references after that.
pub struct CatalogLoader {
    path: PathBuf,
    catalog: Option<Arc<ApiCatalog>>,
}

impl CatalogLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            catalog: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) -> Result<Arc<ApiCatalog>> {
        if let Some(catalog) = &self.catalog {
            return Ok(Arc::clone(catalog));
        }
        self.refresh()
    }

    /// Discard the cached catalog and rebuild it from disk.
    pub fn refresh(&mut self) -> Result<Arc<ApiCatalog>> {
        let catalog = Arc::new(load_catalog(&self.path)?);
        info!(
            path = %self.path.display(),
            categories = catalog.categories.len(),
            endpoints = catalog.total_endpoints(),
            "Catalog loaded"
        );
        self.catalog = Some(Arc::clone(&catalog));
        Ok(catalog)
    }
}
