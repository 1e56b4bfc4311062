//! webres - checksum-verified JavaScript/CSS resources
//!
//! Resolves a vendor/product/name/version request to a resource descriptor,
//! verifies the local file against its configured checksum, and derives the
//! `src`/`integrity`/`crossorigin` values to embed, refusing remote delivery
//! that cannot be pinned with Subresource Integrity.

pub mod catalog;
pub mod config;
pub mod logging;
pub mod markup;
pub mod resource;
pub mod server;
pub mod synth;
pub mod verify;

pub use catalog::{AssetType, FsCatalog, ResolveError, Resolver, ResourceRequest};
pub use config::{Settings, SettingsError};
pub use markup::{render, RenderError, RenderOptions, Rendered};
pub use resource::{ResourceDescriptor, ResourceKind, ScriptAttributes, ScriptType, StyleAttributes};
pub use server::{ResourceServer, ServeOutcome};
pub use synth::{build_integrity, build_src, AttributeSet, Notice, SrcRefusal};
pub use verify::{verify, IndeterminateReason, Verification};

pub use webres_checksum::{Algorithm, Checksum, ChecksumError, DigestEncoding};
