//! Resource catalog
//!
//! Resolves a (vendor, product, name, version, variant) request to a
//! [`ResourceDescriptor`]. [`FsCatalog`] reads one JSON record per resource
//! from a directory tree.

mod fs;
mod record;

pub use fs::{AuditEntry, FsCatalog};
pub use record::{RecordError, ResourceRecord};

use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::resource::ResourceDescriptor;

/// Which kind of asset a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    JavaScript,
    Css,
}

impl AssetType {
    /// Catalog subdirectory for this asset type.
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetType::JavaScript => "js",
            AssetType::Css => "css",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "js" => Some(AssetType::JavaScript),
            "css" => Some(AssetType::Css),
            _ => None,
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetType::JavaScript => write!(f, "javascript"),
            AssetType::Css => write!(f, "css"),
        }
    }
}

/// A logical request for a front-end asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub asset: AssetType,
    pub vendor: String,
    pub product: String,
    pub name: String,
    pub version: String,
    pub variant: Option<String>,
}

impl ResourceRequest {
    pub fn new(
        asset: AssetType,
        vendor: impl Into<String>,
        product: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            asset,
            vendor: vendor.into(),
            product: product.into(),
            name: name.into(),
            version: version.into(),
            variant: None,
        }
    }

    pub fn javascript(
        vendor: impl Into<String>,
        product: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(AssetType::JavaScript, vendor, product, name, version)
    }

    pub fn css(
        vendor: impl Into<String>,
        product: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::new(AssetType::Css, vendor, product, name, version)
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Check every component is a safe lowercase path segment.
    pub fn validate(&self) -> Result<(), ResolveError> {
        let fields = [
            ("vendor", Some(&self.vendor)),
            ("product", Some(&self.product)),
            ("name", Some(&self.name)),
            ("version", Some(&self.version)),
            ("variant", self.variant.as_ref()),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                if !component_pattern().is_match(value) || value.contains("..") {
                    return Err(ResolveError::InvalidComponent {
                        field,
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Record file name, `<name>-<version>[-<variant>].json`.
    pub fn record_file_name(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{}-{}-{}.json", self.name, self.version, variant),
            None => format!("{}-{}.json", self.name, self.version),
        }
    }
}

impl fmt::Display for ResourceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}/{}@{}",
            self.asset, self.vendor, self.product, self.name, self.version
        )?;
        if let Some(variant) = &self.variant {
            write!(f, " ({})", variant)?;
        }
        Ok(())
    }
}

fn component_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("component pattern is valid")
    })
}

/// Errors from resolving a request.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid {field} '{value}': use lowercase letters, digits, '.', '_' or '-'")]
    InvalidComponent { field: &'static str, value: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid record {path}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: RecordError,
    },

    #[error("catalog walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Turns a request into a descriptor.
pub trait Resolver {
    /// `Ok(None)` when the catalog has no such resource.
    fn resolve(
        &self,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceDescriptor>, ResolveError>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(
        &self,
        request: &ResourceRequest,
    ) -> Result<Option<ResourceDescriptor>, ResolveError> {
        (**self).resolve(request)
    }
}
