use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    policy::ConflictPolicy,
};

pub const DEFAULT_CATALOG_NAME: &str = "repo.db";
pub const DEFAULT_ARCHIVE_EXTENSIONS: [&str; 4] = [".tgz", ".tbz", ".txz", ".tar"];

/// Catalog builder configuration.
///
/// Every field is optional; [`Config::resolve`] fills in the defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// File name of the catalog written at the repository root.
    /// Default: repo.db
    pub catalog_name: Option<String>,

    /// File name suffixes that mark package archives. Matching is exact and case-sensitive.
    /// Default: [".tgz", ".tbz", ".txz", ".tar"]
    pub archive_extensions: Option<Vec<String>>,

    /// What to do when two archives share an origin, or a package lists the same
    /// dependency origin or file path twice: "skip", "abort" or "replace".
    /// Default: skip
    pub conflict_policy: Option<ConflictPolicy>,
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            catalog_name: Some(DEFAULT_CATALOG_NAME.to_string()),
            archive_extensions: Some(
                DEFAULT_ARCHIVE_EXTENSIONS
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
            ),
            conflict_policy: Some(ConflictPolicy::default()),
        }
    }

    /// Loads the configuration from a TOML file and resolves it.
    ///
    /// With no path, or a path that does not exist, the default configuration is used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                match fs::read_to_string(path) {
                    Ok(content) => {
                        debug!(path = %path.display(), "loading configuration");
                        toml::from_str(&content)?
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                        debug!(path = %path.display(), "config file not found, using defaults");
                        Self::default_config()
                    }
                    Err(err) => return Err(ConfigError::IoError(err)),
                }
            }
            None => Self::default_config(),
        };

        config.resolve()?;
        Ok(config)
    }

    /// Fills unset fields with their defaults and validates the result.
    pub fn resolve(&mut self) -> Result<()> {
        let catalog_name = self
            .catalog_name
            .get_or_insert_with(|| DEFAULT_CATALOG_NAME.to_string());
        if catalog_name.is_empty()
            || catalog_name == "."
            || catalog_name == ".."
            || catalog_name.contains(['/', '\\'])
        {
            return Err(ConfigError::InvalidCatalogName(catalog_name.clone()));
        }

        let extensions = self.archive_extensions.get_or_insert_with(|| {
            DEFAULT_ARCHIVE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect()
        });

        let mut seen = HashSet::new();
        extensions.retain(|ext| seen.insert(ext.clone()));
        for ext in extensions.iter() {
            if ext.len() < 2 || !ext.starts_with('.') || ext.contains(['/', '\\']) {
                return Err(ConfigError::InvalidExtension(ext.clone()));
            }
        }

        if extensions.iter().any(|ext| catalog_name.ends_with(ext.as_str())) {
            return Err(ConfigError::CatalogNameIsArchive(catalog_name.clone()));
        }

        self.conflict_policy.get_or_insert_with(ConflictPolicy::default);

        Ok(())
    }

    pub fn catalog_name(&self) -> &str {
        self.catalog_name.as_deref().unwrap_or(DEFAULT_CATALOG_NAME)
    }

    pub fn archive_extensions(&self) -> Vec<String> {
        self.archive_extensions.clone().unwrap_or_else(|| {
            DEFAULT_ARCHIVE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect()
        })
    }

    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy.unwrap_or_default()
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Writes the default configuration to `path`, refusing to overwrite an existing file.
pub fn generate_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(path.to_path_buf()));
    }

    let content = format!(
        "# pkgrepo configuration\n\
         #\n\
         # catalog_name: file written at the repository root\n\
         # archive_extensions: exact, case-sensitive suffixes of package archives\n\
         # conflict_policy: \"skip\", \"abort\" or \"replace\"\n\n{}",
        Config::default_config().to_toml()?
    );

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    info!("Default configuration file generated at: {}", path.display());
    Ok(())
}
