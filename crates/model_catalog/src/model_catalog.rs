//! model_catalog: The catalog of models and quantization variants that
//! recommendations are drawn from.
//!
//! A catalog is a JSON document with a top-level `models` array. Loading is
//! all-or-nothing: callers get a complete [`ModelCatalog`] or a
//! [`CatalogError`], never a partially parsed catalog. Unknown fields are
//! ignored, and missing or `null` fields default to zero or empty.

mod error;
mod model;

pub use error::CatalogError;
pub use model::{Benchmarks, Model, Variant};

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

const BUILTIN_CATALOG: &str = include_str!("../data/builtin_catalog.json");

/// The full, ordered set of known models.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelCatalog {
    #[serde(deserialize_with = "model::null_as_default")]
    pub models: Vec<Model>,
}

impl ModelCatalog {
    /// The catalog bundled with this crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_CATALOG.as_bytes(), "built-in catalog")
    }

    /// Load a catalog document from disk.
    pub fn load_from(path: &Path) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&bytes, &path.display().to_string())?;
        log::info!(
            "Model catalog loaded from {} ({} models, {} variants)",
            path.display(),
            catalog.models.len(),
            catalog.variant_count()
        );
        Ok(catalog)
    }

    /// Parse a catalog from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::parse(json.as_bytes(), "inline document")
    }

    fn parse(bytes: &[u8], origin: &str) -> Result<Self, CatalogError> {
        let catalog: Self =
            serde_json::from_slice(bytes).map_err(|source| CatalogError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        catalog.log_suspicious_entries(origin);
        Ok(catalog)
    }

    /// Entries that parse but look wrong are kept and only reported.
    fn log_suspicious_entries(&self, origin: &str) {
        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model.id.as_str()) {
                log::warn!("Duplicate model id {:?} in {origin}", model.id);
            }
            for variant in &model.variants {
                if variant.size_gb <= 0.0 {
                    log::warn!(
                        "Variant {} of {:?} in {origin} has non-positive size {}",
                        variant.quant,
                        model.id,
                        variant.size_gb
                    );
                }
            }
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, CatalogError> {
        serde_json::to_string_pretty(self).map_err(CatalogError::Serialize)
    }

    /// Write the catalog as pretty-printed JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), CatalogError> {
        let contents = self.to_json_pretty()?;
        let write_error = |source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_error)?;
            }
        }
        std::fs::write(path, contents).map_err(write_error)?;

        log::info!("Model catalog written to {}", path.display());
        Ok(())
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn find(&self, id: &str) -> Option<&Model> {
        self.models.iter().find(|model| model.id == id)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Every (model, variant) pair, in catalog order.
    pub fn variants(&self) -> impl Iterator<Item = (&Model, &Variant)> {
        self.models
            .iter()
            .flat_map(|model| model.variants.iter().map(move |variant| (model, variant)))
    }

    pub fn variant_count(&self) -> usize {
        self.models.iter().map(|model| model.variants.len()).sum()
    }
}
