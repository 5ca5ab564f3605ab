//! Site configuration: `config.toml` merged with an optional `local.toml`.

use std::path::Path;

use serde::Serialize;

use crate::error::SiteError;

/// Base configuration file, required.
pub const BASE_CONFIG_FILE: &str = "config.toml";

/// Local override file, optional.
pub const LOCAL_CONFIG_FILE: &str = "local.toml";

/// Merged site configuration.
///
/// Top-level keys from the local file replace those of the base file
/// wholesale; nested tables are not merged.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SiteConfig {
    values: toml::Table,
}

impl SiteConfig {
    /// Load and merge the config files in `config_dir`.
    ///
    /// # Errors
    ///
    /// Returns `SiteError::NotFound` if `config.toml` is missing and
    /// `SiteError::Config` if either file is not valid TOML.
    pub fn load(config_dir: &Path) -> Result<Self, SiteError> {
        let base_path = config_dir.join(BASE_CONFIG_FILE);
        if !base_path.is_file() {
            return Err(SiteError::NotFound(base_path));
        }
        let base = read_table(&base_path)?;

        let local_path = config_dir.join(LOCAL_CONFIG_FILE);
        let local = if local_path.is_file() {
            tracing::debug!(path = %local_path.display(), "Applying local site config");
            read_table(&local_path)?
        } else {
            toml::Table::new()
        };

        Ok(Self::merge(base, local))
    }

    /// Shallow-merge `local` over `base`.
    #[must_use]
    pub fn merge(base: toml::Table, local: toml::Table) -> Self {
        let mut values = base;
        values.extend(local);
        Self { values }
    }

    /// Value of a top-level key.
    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.values.get(key)
    }

    /// String value of a top-level key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(toml::Value::as_str)
    }

    /// All merged values.
    pub fn values(&self) -> &toml::Table {
        &self.values
    }
}

fn read_table(path: &Path) -> Result<toml::Table, SiteError> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|source| SiteError::Config {
        path: path.to_path_buf(),
        source,
    })
}
