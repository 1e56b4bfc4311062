//! The resolved resource descriptor.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use url::Url;
use webres_checksum::{Checksum, ChecksumError};

use super::{ResourceKind, ScriptAttributes, StyleAttributes};

/// `Y-m-d\TH:i:sO` timestamps, e.g. `2018-03-01T12:00:00-0800`.
const LASTMOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// The subset of a URL a descriptor models: no port, userinfo or fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub path: Option<String>,
    pub query: Option<String>,
}

impl UrlParts {
    /// Split a parsed URL into parts.
    ///
    /// Returns `None` when the URL carries a component the model cannot
    /// express (port, userinfo, fragment).
    pub fn from_url(url: &Url) -> Option<Self> {
        if url.port().is_some()
            || !url.username().is_empty()
            || url.password().is_some()
            || url.fragment().is_some()
        {
            return None;
        }
        Some(Self {
            scheme: Some(url.scheme().to_string()),
            host: url.host_str().map(str::to_string),
            path: Some(url.path().to_string()).filter(|p| !p.is_empty()),
            query: url.query().map(str::to_string),
        })
    }

    /// `(scheme, host)` when both are set.
    pub fn authority(&self) -> Option<(&str, &str)> {
        Some((self.scheme.as_deref()?, self.host.as_deref()?))
    }
}

/// One concrete asset, local and/or remote.
///
/// Built once by a resolver with the `with_*` methods, then only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceDescriptor {
    kind: ResourceKind,
    mime: Option<String>,
    checksum: Option<String>,
    filepath: Option<PathBuf>,
    last_modified: Option<String>,
    url: UrlParts,
    cross_origin: Option<String>,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn script(attributes: ScriptAttributes) -> Self {
        Self::new(ResourceKind::Script(attributes))
    }

    pub fn stylesheet(attributes: StyleAttributes) -> Self {
        Self::new(ResourceKind::Stylesheet(attributes))
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Set the `algorithm:digest` checksum string.
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn with_filepath(mut self, path: impl Into<PathBuf>) -> Self {
        self.filepath = Some(path.into());
        self
    }

    /// Set the ISO-8601 modification time.
    pub fn with_last_modified(mut self, lastmod: impl Into<String>) -> Self {
        self.last_modified = Some(lastmod.into());
        self
    }

    pub fn with_url(mut self, url: UrlParts) -> Self {
        self.url = url;
        self
    }

    pub fn with_url_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.url.scheme = Some(scheme.into());
        self
    }

    pub fn with_url_host(mut self, host: impl Into<String>) -> Self {
        self.url.host = Some(host.into());
        self
    }

    pub fn with_url_path(mut self, path: impl Into<String>) -> Self {
        self.url.path = Some(path.into());
        self
    }

    pub fn with_url_query(mut self, query: impl Into<String>) -> Self {
        self.url.query = Some(query.into());
        self
    }

    pub fn with_cross_origin(mut self, value: impl Into<String>) -> Self {
        self.cross_origin = Some(value.into());
        self
    }

    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// Script attributes, when this is a script.
    pub fn script_attributes(&self) -> Option<&ScriptAttributes> {
        match &self.kind {
            ResourceKind::Script(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Stylesheet attributes, when this is a stylesheet.
    pub fn style_attributes(&self) -> Option<&StyleAttributes> {
        match &self.kind {
            ResourceKind::Stylesheet(attrs) => Some(attrs),
            _ => None,
        }
    }

    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// Declared media type, falling back to the kind's default.
    pub fn effective_mime(&self) -> &str {
        self.mime().unwrap_or_else(|| self.kind.default_mime())
    }

    /// Raw checksum string as configured.
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    /// Parsed checksum, or `None` when no checksum is configured.
    pub fn parsed_checksum(&self) -> Option<Result<Checksum, ChecksumError>> {
        self.checksum().map(Checksum::parse)
    }

    pub fn filepath(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    /// Raw modification time string as configured.
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// Parsed modification time. Unparsable values yield `None`.
    pub fn last_modified_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.last_modified()?.trim();
        DateTime::parse_from_str(raw, LASTMOD_FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(raw))
            .ok()
    }

    /// Modification time as Unix epoch seconds.
    pub fn timestamp(&self) -> Option<i64> {
        self.last_modified_at().map(|dt| dt.timestamp())
    }

    pub fn url(&self) -> &UrlParts {
        &self.url
    }

    /// Value for a `crossorigin` attribute.
    pub fn cross_origin(&self) -> Option<&str> {
        self.cross_origin.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ScriptType;

    #[test]
    fn test_builder_and_accessors() {
        let d = ResourceDescriptor::script(ScriptAttributes {
            script_type: ScriptType::Module,
            is_async: true,
            ..Default::default()
        })
        .with_checksum("sha256:00")
        .with_filepath("/srv/js/app.js")
        .with_url_scheme("https")
        .with_url_host("cdn.example.com")
        .with_cross_origin("anonymous");

        assert_eq!(d.checksum(), Some("sha256:00"));
        assert_eq!(d.filepath(), Some(Path::new("/srv/js/app.js")));
        assert_eq!(d.url().authority(), Some(("https", "cdn.example.com")));
        let host_only = ResourceDescriptor::default().with_url_host("cdn.example.com");
        assert_eq!(host_only.url().authority(), None);
        assert_eq!(d.cross_origin(), Some("anonymous"));
        assert_eq!(d.script_attributes().unwrap().script_type, ScriptType::Module);
        assert!(d.style_attributes().is_none());
        assert_eq!(d.effective_mime(), "application/javascript");
    }

    #[test]
    fn test_declared_mime_wins() {
        let d = ResourceDescriptor::script(ScriptAttributes::default()).with_mime("text/javascript");
        assert_eq!(d.effective_mime(), "text/javascript");
    }

    #[test]
    fn test_timestamp_iso8601_offset() {
        let d = ResourceDescriptor::default().with_last_modified("2018-03-01T12:00:00-0800");
        assert_eq!(d.timestamp(), Some(1_519_934_400));
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let d = ResourceDescriptor::default().with_last_modified("2018-03-01T20:00:00+00:00");
        assert_eq!(d.timestamp(), Some(1_519_934_400));
    }

    #[test]
    fn test_timestamp_absent_or_garbage() {
        assert_eq!(ResourceDescriptor::default().timestamp(), None);
        let d = ResourceDescriptor::default().with_last_modified("last tuesday");
        assert_eq!(d.timestamp(), None);
    }

    #[test]
    fn test_parsed_checksum() {
        assert!(ResourceDescriptor::default().parsed_checksum().is_none());
        let d = ResourceDescriptor::default().with_checksum("nope:00");
        assert!(d.parsed_checksum().unwrap().is_err());
    }

    #[test]
    fn test_url_parts_from_url() {
        let url = Url::parse("https://cdn.example.com/lib/jquery.min.js?v=3").unwrap();
        let parts = UrlParts::from_url(&url).unwrap();
        assert_eq!(parts.scheme.as_deref(), Some("https"));
        assert_eq!(parts.host.as_deref(), Some("cdn.example.com"));
        assert_eq!(parts.path.as_deref(), Some("/lib/jquery.min.js"));
        assert_eq!(parts.query.as_deref(), Some("v=3"));
    }

    #[test]
    fn test_url_parts_rejects_port_and_fragment() {
        for s in [
            "https://cdn.example.com:8443/a.js",
            "https://user@cdn.example.com/a.js",
            "https://cdn.example.com/a.js#frag",
        ] {
            assert!(UrlParts::from_url(&Url::parse(s).unwrap()).is_none(), "{}", s);
        }
    }

    #[test]
    fn test_descriptor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResourceDescriptor>();
    }
}
