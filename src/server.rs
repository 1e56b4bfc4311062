//! Serving verified resources
//!
//! Resolves a request, reads the local file once, verifies exactly those
//! bytes and writes them to the caller's sink. Anything short of a positive
//! verification is refused. There is no HTTP listener here; the returned
//! [`ResponseHead`] is for whatever HTTP layer embeds this.

use std::fs;
use std::io::{self, Write};

use chrono::Utc;

use crate::catalog::{ResolveError, Resolver, ResourceRequest};
use crate::resource::ResourceDescriptor;
use crate::verify::{self, IndeterminateReason, Verification};

/// Headers for a served resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub content_type: String,
    pub content_length: u64,
    /// RFC 7231 HTTP-date
    pub last_modified: Option<String>,
}

#[derive(Debug)]
pub enum ServeOutcome {
    /// Bytes were written.
    Served(ResponseHead),
    /// The catalog has no such resource.
    NotFound,
    /// The resource has no local file to serve.
    NotLocal,
    /// The local file did not verify.
    Refused(Verification),
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("write failed: {0}")]
    Write(#[from] io::Error),
}

/// Serves catalog resources after verification.
pub struct ResourceServer<R> {
    resolver: R,
}

impl<R: Resolver> ResourceServer<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Resolve `request` and write its verified bytes to `out`.
    pub fn serve<W: Write>(
        &self,
        request: &ResourceRequest,
        out: &mut W,
    ) -> Result<ServeOutcome, ServeError> {
        let Some(descriptor) = self.resolver.resolve(request)? else {
            tracing::info!(%request, "resource not found");
            return Ok(ServeOutcome::NotFound);
        };
        let outcome = serve_descriptor(&descriptor, out)?;
        match &outcome {
            ServeOutcome::Served(head) => {
                tracing::info!(%request, bytes = head.content_length, "served");
            }
            ServeOutcome::Refused(v) => {
                tracing::warn!(%request, outcome = %v, "refusing to serve unverified resource");
            }
            ServeOutcome::NotLocal => {
                tracing::info!(%request, "resource has no local file");
            }
            ServeOutcome::NotFound => {}
        }
        Ok(outcome)
    }
}

/// Verify and write one descriptor's file.
pub fn serve_descriptor<W: Write>(
    descriptor: &ResourceDescriptor,
    out: &mut W,
) -> Result<ServeOutcome, ServeError> {
    let Some(path) = descriptor.filepath() else {
        return Ok(ServeOutcome::NotLocal);
    };
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok(ServeOutcome::Refused(Verification::Indeterminate(
                IndeterminateReason::FileMissing(path.to_path_buf()),
            )));
        }
        Err(source) => {
            return Ok(ServeOutcome::Refused(Verification::Indeterminate(
                IndeterminateReason::Unreadable {
                    path: path.to_path_buf(),
                    source,
                },
            )));
        }
    };

    let verification = verify::verify_contents(descriptor, &contents);
    if !verification.is_trusted() {
        return Ok(ServeOutcome::Refused(verification));
    }

    out.write_all(&contents)?;
    out.flush()?;

    Ok(ServeOutcome::Served(ResponseHead {
        content_type: descriptor.effective_mime().to_string(),
        content_length: contents.len() as u64,
        last_modified: descriptor.last_modified_at().map(|dt| {
            dt.with_timezone(&Utc)
                .format("%a, %d %b %Y %H:%M:%S GMT")
                .to_string()
        }),
    }))
}
