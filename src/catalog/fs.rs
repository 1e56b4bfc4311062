//! Directory-backed catalog.
//!
//! Layout: `<root>/<vendor>/<product>/<js|css>/<name>-<version>[-<variant>].json`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{AssetType, ResolveError, Resolver, ResourceRecord, ResourceRequest};
use crate::resource::ResourceDescriptor;
use crate::verify::{self, Verification};

/// Catalog rooted at a directory of JSON records.
#[derive(Debug, Clone)]
pub struct FsCatalog {
    root: PathBuf,
}

/// Result of auditing one record.
#[derive(Debug)]
pub struct AuditEntry {
    /// Record file
    pub record: PathBuf,
    pub asset: AssetType,
    /// Verification outcome, or why the record could not be loaded
    pub outcome: Result<Verification, ResolveError>,
}

impl AuditEntry {
    /// Whether the record loaded and its file verified.
    pub fn is_trusted(&self) -> bool {
        matches!(&self.outcome, Ok(v) if v.is_trusted())
    }
}

impl FsCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the record a request maps to.
    pub fn record_path(&self, request: &ResourceRequest) -> PathBuf {
        self.root
            .join(&request.vendor)
            .join(&request.product)
            .join(request.asset.dir_name())
            .join(request.record_file_name())
    }

    /// Load a record file and build its descriptor.
    pub fn load_record(path: &Path, asset: AssetType) -> Result<ResourceDescriptor, ResolveError> {
        let content = fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let record = ResourceRecord::from_json(&content).map_err(|source| ResolveError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        record
            .into_descriptor(asset, base_dir)
            .map_err(|source| ResolveError::Record {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Verify every record in the catalog, sorted by record path.
    ///
    /// Files outside a `js` or `css` directory and non-JSON files are
    /// skipped.
    pub fn audit(&self) -> Result<Vec<AuditEntry>, ResolveError> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let asset = match path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .and_then(AssetType::from_dir_name)
            {
                Some(asset) => asset,
                None => continue,
            };

            let outcome = Self::load_record(path, asset).map(|d| verify::verify(&d));
            match &outcome {
                Ok(v) if v.is_trusted() => {
                    tracing::debug!(record = %path.display(), "verified");
                }
                Ok(v) => {
                    tracing::warn!(record = %path.display(), outcome = %v, "record failed verification");
                }
                Err(e) => {
                    tracing::warn!(record = %path.display(), error = %e, "record could not be loaded");
                }
            }
            entries.push(AuditEntry {
                record: path.to_path_buf(),
                asset,
                outcome,
            });
        }

        Ok(entries)
    }
}

impl Resolver for FsCatalog {
    fn resolve(&self, request: &ResourceRequest) -> Result<Option<ResourceDescriptor>, ResolveError> {
        request.validate()?;
        let path = self.record_path(request);
        match Self::load_record(&path, request.asset) {
            Ok(descriptor) => Ok(Some(descriptor)),
            Err(ResolveError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
