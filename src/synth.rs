//! `src` / `integrity` / `crossorigin` synthesis
//!
//! Derives the attribute values a markup layer embeds for a descriptor and
//! applies the remote delivery policy:
//! - only `http` and `https` may address a network resource
//! - plain `http` is allowed only when the content can be pinned with an
//!   `integrity` attribute, and even then it is reported as a [`Notice`]
//!
//! Refusals are values. A caller that gets [`SrcRefusal`] must not emit the
//! resource.

use std::fmt;

use webres_checksum::Checksum;

use crate::resource::ResourceDescriptor;

/// Schemes allowed for a network-addressable `src`.
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Why no `src` could be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SrcRefusal {
    /// Neither an authority nor a path is configured.
    #[error("descriptor has no URL authority or path")]
    Empty,

    /// The URL scheme is not `http` or `https`.
    #[error("scheme '{0}' is not allowed for src")]
    DisallowedScheme(String),

    /// Plain `http` without a browser-recognized integrity checksum.
    #[error("http delivery from {host} requires a sha256/sha384/sha512 checksum")]
    PlaintextWithoutIntegrity { host: String },
}

/// Something the caller's logging layer should surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A resource is delivered over unencrypted http, pinned only by its
    /// integrity attribute. Deprecated; move the host to https.
    PlaintextDelivery { host: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PlaintextDelivery { host } => write!(
                f,
                "resource from {} is delivered over plain http; serve it over https",
                host
            ),
        }
    }
}

/// A synthesized `src` plus any notices raised while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Src {
    pub uri: String,
    pub notices: Vec<Notice>,
}

/// Everything the markup layer needs for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSet {
    pub src: String,
    pub integrity: Option<String>,
    pub crossorigin: Option<String>,
    pub notices: Vec<Notice>,
}

/// Build the `src` URI for a descriptor.
pub fn build_src(descriptor: &ResourceDescriptor) -> Result<Src, SrcRefusal> {
    build_src_with_prefix(descriptor, None)
}

/// Build the `src` URI, placing `prefix` before the path of local srcs.
///
/// The prefix only applies when the src has no `scheme://host` authority,
/// e.g. when local files are delivered through a serving endpoint.
pub fn build_src_with_prefix(
    descriptor: &ResourceDescriptor,
    prefix: Option<&str>,
) -> Result<Src, SrcRefusal> {
    let url = descriptor.url();
    let mut uri = String::new();
    let mut notices = Vec::new();

    if let Some((scheme, host)) = url.authority() {
        if !ALLOWED_SCHEMES.contains(&scheme) {
            return Err(SrcRefusal::DisallowedScheme(scheme.to_string()));
        }
        if scheme == "http" {
            if build_integrity(descriptor).is_none() {
                return Err(SrcRefusal::PlaintextWithoutIntegrity {
                    host: host.to_string(),
                });
            }
            notices.push(Notice::PlaintextDelivery {
                host: host.to_string(),
            });
        }
        uri.push_str(scheme);
        uri.push_str("://");
        uri.push_str(host);
    }

    if let Some(path) = url.path.as_deref() {
        if let Some(prefix) = prefix.filter(|_| uri.is_empty()) {
            let prefix = if path.starts_with('/') {
                prefix.trim_end_matches('/')
            } else {
                prefix
            };
            uri.push_str(prefix);
        }
        uri.push_str(path);
    }

    if let Some(query) = url.query.as_deref() {
        uri.push('?');
        uri.push_str(query);
    }

    if uri.is_empty() {
        return Err(SrcRefusal::Empty);
    }
    Ok(Src { uri, notices })
}

/// Build the `integrity` attribute value (`algorithm-base64digest`).
///
/// `None` when there is no checksum, it does not parse, or its algorithm is
/// not one browsers accept.
pub fn build_integrity(descriptor: &ResourceDescriptor) -> Option<String> {
    let checksum = Checksum::parse(descriptor.checksum()?).ok()?;
    checksum.to_sri()
}

/// The `crossorigin` attribute value, passed through from the descriptor.
pub fn build_crossorigin(descriptor: &ResourceDescriptor) -> Option<&str> {
    descriptor.cross_origin()
}

/// Build all embeddable attributes at once.
pub fn synthesize(
    descriptor: &ResourceDescriptor,
    prefix: Option<&str>,
) -> Result<AttributeSet, SrcRefusal> {
    let Src { uri, notices } = build_src_with_prefix(descriptor, prefix)?;
    Ok(AttributeSet {
        src: uri,
        integrity: build_integrity(descriptor),
        crossorigin: build_crossorigin(descriptor).map(str::to_string),
        notices,
    })
}
