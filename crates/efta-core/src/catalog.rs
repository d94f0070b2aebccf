use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One product as declared in the seed catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub category: Option<String>,
    /// Older catalog exports stored the category here instead of `category`.
    #[serde(default)]
    pub legacy_category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// `None` leaves the product visible; only `Some(false)` hides it.
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub featured: bool,
}

impl CatalogEntry {
    /// Generate a URL-safe slug from the product name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Tags trimmed, with empties and duplicates removed. First occurrence wins.
    #[must_use]
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.to_string()))
            .map(ToOwned::to_owned)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<CatalogEntry>,
}

/// Load and validate the product catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

/// Parse and validate catalog YAML already in memory.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_catalog(content: &str) -> Result<CatalogFile, ConfigError> {
    let catalog: CatalogFile = serde_yaml::from_str(content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for entry in &catalog.products {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product name must be non-empty".to_string(),
            ));
        }

        if entry.price.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has negative price {}",
                entry.name, entry.price
            )));
        }

        if entry.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "product '{}' has an empty tag",
                entry.name
            )));
        }

        let slug = entry.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "product '{}' does not produce a usable slug",
                entry.name
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product slug: '{}' (from product '{}')",
                slug, entry.name
            )));
        }
    }

    Ok(())
}
