//! Chart-of-accounts templates loaded from disk at start-up.

use std::collections::BTreeMap;
use std::path::Path;

use bursar_core::accounts::{AccountError, ChartTemplate};
use tracing::{info, warn};

/// Error loading chart templates.
#[derive(Debug, thiserror::Error)]
pub enum ChartLoadError {
    /// The directory or a file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A file is not a valid template.
    #[error("Invalid chart template {path}: {source}")]
    Invalid {
        /// Offending path.
        path: String,
        /// Parse error.
        source: AccountError,
    },
}

/// Templates keyed by file stem (`charts/school_standard.json` -> `school_standard`).
#[derive(Debug, Clone, Default)]
pub struct ChartLibrary {
    templates: BTreeMap<String, ChartTemplate>,
}

impl ChartLibrary {
    /// Builds a library from already parsed templates.
    #[must_use]
    pub fn from_templates(templates: impl IntoIterator<Item = (String, ChartTemplate)>) -> Self {
        Self {
            templates: templates.into_iter().collect(),
        }
    }

    /// Loads every `*.json` file in `dir`.
    ///
    /// A missing directory yields an empty library.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed.
    pub fn load_dir(dir: &Path) -> Result<Self, ChartLoadError> {
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "Chart directory not found, no templates loaded");
            return Ok(Self::default());
        }

        let io_err = |path: &Path, source| ChartLoadError::Io {
            path: path.display().to_string(),
            source,
        };

        let mut templates = BTreeMap::new();
        for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
            let path = entry.map_err(|e| io_err(dir, e))?.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let json = std::fs::read_to_string(&path).map_err(|e| io_err(path.as_path(), e))?;
            let template =
                ChartTemplate::from_json(&json).map_err(|source| ChartLoadError::Invalid {
                    path: path.display().to_string(),
                    source,
                })?;
            templates.insert(stem.to_string(), template);
        }

        info!(dir = %dir.display(), count = templates.len(), "Chart templates loaded");
        Ok(Self { templates })
    }

    /// Looks up a template.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::UnknownChart`] if no template has that key.
    pub fn get(&self, key: &str) -> Result<&ChartTemplate, AccountError> {
        self.templates
            .get(key)
            .ok_or_else(|| AccountError::UnknownChart(key.to_string()))
    }

    /// Template keys with their display names, sorted by key.
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates
            .iter()
            .map(|(key, template)| (key.as_str(), template.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"{"name": "Minimal", "tree": {"Assets": {"root_type": "Asset"}}}"#;

    #[test]
    fn test_missing_directory_is_empty() {
        let library = ChartLibrary::load_dir(Path::new("/nonexistent/bursar/charts")).unwrap();
        assert_eq!(library.list().count(), 0);
    }

    #[test]
    fn test_lookup() {
        let library = ChartLibrary::from_templates([(
            "minimal".to_string(),
            ChartTemplate::from_json(CHART).unwrap(),
        )]);

        assert_eq!(library.get("minimal").unwrap().name, "Minimal");
        assert!(matches!(
            library.get("other"),
            Err(AccountError::UnknownChart(key)) if key == "other"
        ));
        assert_eq!(library.list().collect::<Vec<_>>(), vec![("minimal", "Minimal")]);
    }

    #[test]
    fn test_bundled_charts_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../charts");
        let library = ChartLibrary::load_dir(&dir).unwrap();
        assert!(library.get("school_standard").is_ok());
    }
}
