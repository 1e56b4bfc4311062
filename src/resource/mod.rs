//! Resource descriptor model
//!
//! A descriptor holds everything known about one resolved asset: where the
//! local copy lives, where a remote copy can be fetched, its checksum, media
//! type and modification time. Script and stylesheet specifics hang off
//! [`ResourceKind`].

mod descriptor;
mod kind;

pub use descriptor::{ResourceDescriptor, UrlParts};
pub use kind::{ResourceKind, ScriptAttributes, ScriptType, StyleAttributes};
