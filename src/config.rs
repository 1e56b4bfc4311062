//! Settings file
//!
//! Parses `~/.config/webres/config.toml`:
//!
//! ```toml
//! catalog_root = "/srv/webres/catalog"
//! src_prefix = "/res"
//! xml = false
//! ```
//!
//! Command-line flags override file values via [`Settings::apply_overrides`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Settings used by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Root of the JSON record catalog
    #[serde(default = "default_catalog_root")]
    pub catalog_root: PathBuf,

    /// Path prefix for locally served resources
    #[serde(default)]
    pub src_prefix: Option<String>,

    /// Render XML style markup
    #[serde(default)]
    pub xml: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_catalog_root() -> PathBuf {
    PathBuf::from("catalog")
}

/// Values from the command line that win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub catalog_root: Option<PathBuf>,
    pub src_prefix: Option<String>,
    pub xml: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Settings file not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported schema_version {0}")]
    UnsupportedSchema(u32),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            catalog_root: default_catalog_root(),
            src_prefix: None,
            xml: false,
        }
    }
}

impl Settings {
    /// Default settings path (~/.config/webres/config.toml)
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let home = std::env::var("HOME").map_err(|_| {
            SettingsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "HOME environment variable not set",
            ))
        })?;
        Ok(PathBuf::from(home).join(".config/webres/config.toml"))
    }

    /// Load settings from a specific path
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load from `path` if given, else the default path when it exists,
    /// else built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Ok(default) if default.exists() => Self::load(&default),
            _ => Ok(Self::default()),
        }
    }

    /// Parse settings from TOML
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.schema_version != 1 {
            return Err(SettingsError::UnsupportedSchema(self.schema_version));
        }
        if self.catalog_root.as_os_str().is_empty() {
            return Err(SettingsError::InvalidValue {
                field: "catalog_root".to_string(),
                reason: "catalog_root cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Apply command-line overrides (last wins).
    pub fn apply_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(root) = overrides.catalog_root {
            self.catalog_root = root;
        }
        if let Some(prefix) = overrides.src_prefix {
            self.src_prefix = Some(prefix);
        }
        if let Some(xml) = overrides.xml {
            self.xml = xml;
        }
        self
    }
}
