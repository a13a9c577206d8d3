//! Markup configuration that callers can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupConfig {
    /// Id of the first handle an arena mints. Later handles count up from here.
    pub cache_origin: u32,

    /// Optional YAML/JSON catalog replacing the built-in operator table.
    pub catalog_path: Option<String>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            cache_origin: 1,
            catalog_path: None,
        }
    }
}

impl MarkupConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `RADON_CACHE_ORIGIN`: first arena handle id
    /// - `RADON_CATALOG`: path to a catalog file
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("RADON_CACHE_ORIGIN") {
            if let Ok(v) = s.parse::<u32>() {
                cfg.cache_origin = v;
            }
        }

        if let Ok(s) = std::env::var("RADON_CATALOG") {
            if !s.trim().is_empty() {
                cfg.catalog_path = Some(s);
            }
        }

        cfg
    }

    /// Load the configured catalog, or hand back the built-in one.
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            None => Ok(Catalog::standard().clone()),
            Some(path) => {
                let src = std::fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("cannot read catalog {path}: {e}")))?;
                let catalog: Catalog = serde_yaml::from_str(&src)?;
                Ok(catalog)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_origin_is_one() {
        let cfg = MarkupConfig::default();
        assert_eq!(cfg.cache_origin, 1);
        assert!(cfg.catalog_path.is_none());
    }

    #[test]
    fn missing_catalog_file_is_a_config_error() {
        let cfg = MarkupConfig {
            catalog_path: Some("/nonexistent/radon-catalog.yaml".into()),
            ..Default::default()
        };
        assert!(matches!(cfg.load_catalog(), Err(Error::Config(_))));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: MarkupConfig = serde_yaml::from_str("catalog_path: ops.yaml").unwrap();
        assert_eq!(cfg.cache_origin, 1);
        assert_eq!(cfg.catalog_path.as_deref(), Some("ops.yaml"));
    }
}
