use std::collections::HashMap;

use serde::Deserialize;

use crate::error::MigrateError;
use crate::model::BookStatus;

pub const DEFAULT_BATCH_SIZE: usize = 500;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MigrateConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub sources: SourcesConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub aliases: AliasConfig,
    /// Extra legacy role label → role code entries.
    #[serde(default)]
    pub roles: HashMap<String, String>,
    /// Extra legacy status label → status entries.
    #[serde(default)]
    pub statuses: HashMap<String, BookStatus>,
}

fn default_name() -> String {
    "legacy catalog import".into()
}

// ---------------------------------------------------------------------------
// Sources + Store
// ---------------------------------------------------------------------------

/// Paths of the three legacy exports, relative to the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    pub books: String,
    pub contributors: String,
    pub book_contributors: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: String,
    /// User id to attribute rows to. Defaults to the first user in the store.
    #[serde(default)]
    pub owner: Option<String>,
}

// ---------------------------------------------------------------------------
// Import tuning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Unit assumed when a book's size-measurement cell is blank.
    #[serde(default = "default_size_unit")]
    pub default_size_unit: String,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_size_unit() -> String {
    "cm".into()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            default_size_unit: default_size_unit(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

/// label → canonical reference name. An empty target leaves the label
/// deliberately unmapped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AliasConfig {
    #[serde(default)]
    pub language: HashMap<String, String>,
    #[serde(default)]
    pub condition: HashMap<String, String>,
    #[serde(default)]
    pub binding: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MigrateConfig {
    pub fn from_toml(input: &str) -> Result<Self, MigrateError> {
        let config: MigrateConfig =
            toml::from_str(input).map_err(|e| MigrateError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MigrateError> {
        if self.import.batch_size == 0 {
            return Err(MigrateError::ConfigValidation(
                "import.batch_size must be at least 1".into(),
            ));
        }

        let sources = [
            ("books", &self.sources.books),
            ("contributors", &self.sources.contributors),
            ("book_contributors", &self.sources.book_contributors),
        ];
        for (name, path) in sources {
            if path.trim().is_empty() {
                return Err(MigrateError::ConfigValidation(format!(
                    "sources.{name} must not be empty"
                )));
            }
        }

        if self.store.path.trim().is_empty() {
            return Err(MigrateError::ConfigValidation("store.path must not be empty".into()));
        }

        for (label, code) in &self.roles {
            if code.trim().is_empty() {
                return Err(MigrateError::ConfigValidation(format!(
                    "roles: label '{label}' maps to an empty role code"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
