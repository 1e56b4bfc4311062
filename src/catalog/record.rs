//! JSON resource records
//!
//! One record describes one resource:
//!
//! ```json
//! {
//!   "filepath": "jquery-3.3.1.min.js",
//!   "checksum": "sha256:160a426ff2894252cd7cebbdd6d6b7da8fcd319c65b70468f10b6690c45d02ef",
//!   "lastmod": "2018-01-20T17:24:00-0800",
//!   "url": "https://code.jquery.com/jquery-3.3.1.min.js",
//!   "crossorigin": "anonymous",
//!   "async": true
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use super::AssetType;
use crate::resource::{
    ResourceDescriptor, ResourceKind, ScriptAttributes, ScriptType, StyleAttributes, UrlParts,
};

/// Record file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,

    /// `algorithm:digest`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Local file, relative paths resolve against the record's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,

    /// ISO 8601 modification time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,

    /// Full remote URL; split into the url* parts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urlscheme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urlhost: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urlpath: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urlquery: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crossorigin: Option<String>,

    /// Script type: `application/javascript` or `module`
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub script_type: Option<String>,

    #[serde(default, rename = "async")]
    pub is_async: bool,

    #[serde(default)]
    pub defer: bool,

    #[serde(default)]
    pub nomodule: bool,

    /// Stylesheet media query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

/// A record that parses as JSON but cannot become a descriptor.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("url '{0}' has a port, userinfo or fragment")]
    UnsupportedUrl(String),

    #[error("{0}")]
    InvalidScriptType(String),
}

impl ResourceRecord {
    /// Parse a record from JSON text.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Build the descriptor for this record.
    ///
    /// `base_dir` is the directory holding the record file.
    pub fn into_descriptor(
        self,
        asset: AssetType,
        base_dir: &Path,
    ) -> Result<ResourceDescriptor, RecordError> {
        let kind = match asset {
            AssetType::JavaScript => {
                let script_type = match self.script_type.as_deref() {
                    Some(t) => t.parse::<ScriptType>().map_err(RecordError::InvalidScriptType)?,
                    None => ScriptType::default(),
                };
                ResourceKind::Script(ScriptAttributes {
                    script_type,
                    is_async: self.is_async,
                    is_deferred: self.defer,
                    is_no_module: self.nomodule,
                })
            }
            AssetType::Css => ResourceKind::Stylesheet(StyleAttributes { media: self.media }),
        };

        let mut parts = match self.url.as_deref() {
            Some(raw) => {
                let url = Url::parse(raw).map_err(|e| RecordError::InvalidUrl {
                    url: raw.to_string(),
                    reason: e.to_string(),
                })?;
                UrlParts::from_url(&url).ok_or_else(|| RecordError::UnsupportedUrl(raw.to_string()))?
            }
            None => UrlParts::default(),
        };
        if self.urlscheme.is_some() {
            parts.scheme = self.urlscheme;
        }
        if self.urlhost.is_some() {
            parts.host = self.urlhost;
        }
        if self.urlpath.is_some() {
            parts.path = self.urlpath;
        }
        if self.urlquery.is_some() {
            parts.query = self.urlquery;
        }

        let mut descriptor = ResourceDescriptor::new(kind).with_url(parts);
        if let Some(mime) = self.mime {
            descriptor = descriptor.with_mime(mime);
        }
        if let Some(checksum) = self.checksum {
            descriptor = descriptor.with_checksum(checksum);
        }
        if let Some(filepath) = self.filepath {
            descriptor = descriptor.with_filepath(base_dir.join(filepath));
        }
        if let Some(lastmod) = self.lastmod {
            descriptor = descriptor.with_last_modified(lastmod);
        }
        if let Some(crossorigin) = self.crossorigin {
            descriptor = descriptor.with_cross_origin(crossorigin);
        }
        Ok(descriptor)
    }
}
