//! dirattr core — POSIX extended attributes emulated on a plain object store.
//!
//! The backing store has no native attribute concept; it only offers ordinary
//! directories, files, and lookup/create/read/write/remove/enumerate
//! primitives. Every object that owns extended attributes gets a hidden,
//! lazily created attribute directory, and each attribute becomes a regular
//! small file inside it, named after the attribute key.
//!
//! The outward surface is the POSIX xattr call shape: `get`, `set`, `remove`,
//! `list`, including the size-probing protocol callers use to discover
//! required buffer sizes before allocating. Attribute names dispatch to
//! namespace handlers (`user.`, `security.`, ACL names, optionally
//! `trusted.`) that decide visibility and mutability per prefix.

pub mod config;
pub mod error;
pub mod ns;
pub mod store;
pub mod types;

mod accessor;
mod attrdir;
mod engine;
mod list;

// Re-export key types for convenience
pub use config::{AttrLimits, FsConfig};
pub use engine::XattrEngine;
pub use error::{FsError, FsResult};
pub use list::split_names;
pub use ns::{Namespace, NamespaceRegistry};
pub use store::{EnumerateFn, InMemoryStore, LookupFlags, ObjectStore};
pub use types::*;
