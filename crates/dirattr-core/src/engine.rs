//! Outward-facing xattr operations over an object store.
//!
//! [`XattrEngine`] exposes the four POSIX-shaped calls — get, set, remove,
//! list — and owns the namespace registry and the backing store handle.
//! Operations are synchronous and block for the duration of each underlying
//! store call; there is no internal background work and no retry.

use std::sync::Arc;

use tracing::debug;

use crate::accessor;
use crate::attrdir;
use crate::config::FsConfig;
use crate::error::{FsError, FsResult};
use crate::list;
use crate::ns::{Namespace, NamespaceRegistry};
use crate::store::ObjectStore;
use crate::types::{Credentials, ObjectId, ValueBuf};

/// The xattr emulation engine
pub struct XattrEngine {
    config: FsConfig,
    store: Arc<dyn ObjectStore>,
    registry: NamespaceRegistry,
}

impl XattrEngine {
    pub fn new(store: Arc<dyn ObjectStore>, config: FsConfig) -> Self {
        let registry = NamespaceRegistry::from_config(&config);
        Self {
            config,
            store,
            registry,
        }
    }

    /// The backing store handle, for hosts that also manage the objects.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// Read one attribute of `object`.
    ///
    /// `ValueBuf::Probe` returns the stored length; `ValueBuf::Fill` returns
    /// the bytes transferred, silently truncated to the buffer. A missing
    /// attribute — whether or not the object has any attributes at all — is
    /// `NoData`.
    pub fn get(
        &self,
        object: ObjectId,
        name: &str,
        out: ValueBuf<'_>,
        creds: &Credentials,
    ) -> FsResult<usize> {
        let ns = self.checked_namespace(name)?;
        ns.check_read(creds)?;
        let dir = attrdir::resolve(self.store.as_ref(), object, &self.config.attr_dir_name, creds)?;
        accessor::get(self.store.as_ref(), dir, name, out, creds)
    }

    /// Write one attribute of `object`. A `None` value is the remove alias.
    pub fn set(
        &self,
        object: ObjectId,
        name: &str,
        value: Option<&[u8]>,
        creds: &Credentials,
    ) -> FsResult<()> {
        let Some(value) = value else {
            return self.remove(object, name, creds);
        };
        let ns = self.checked_namespace(name)?;
        ns.check_write(creds)?;
        if value.len() > self.config.limits.max_value_len {
            return Err(FsError::NoSpace);
        }
        debug!(object = object.raw(), name, len = value.len(), "setxattr");
        accessor::set(
            self.store.as_ref(),
            object,
            &self.config.attr_dir_name,
            name,
            value,
            creds,
        )
    }

    /// Remove one attribute of `object`.
    ///
    /// Dispatches by namespace; an unregistered prefix is `NotSupported`,
    /// never a store-level not-found. The delete itself is the handler's
    /// replace-style mutation (a set with no value), so namespaces that
    /// forbid unconditional deletion can refuse it.
    pub fn remove(&self, object: ObjectId, name: &str, creds: &Credentials) -> FsResult<()> {
        let ns = self.checked_namespace(name)?;
        ns.check_write(creds)?;
        debug!(object = object.raw(), name, "removexattr");
        // Resolve first so a missing object stays NotFound.
        let dir = attrdir::resolve(self.store.as_ref(), object, &self.config.attr_dir_name, creds)?;
        match accessor::remove(self.store.as_ref(), dir, name, creds) {
            // A missing backing file means the attribute was never set.
            Err(FsError::NotFound) => Err(FsError::NoData),
            other => other,
        }
    }

    /// List all attribute names of `object` across registered namespaces.
    ///
    /// Returns the bytes written as `name\0` records, or in probe mode the
    /// total size the caller must allocate. An object with no attribute
    /// directory lists as zero attributes.
    pub fn list(
        &self,
        object: ObjectId,
        out: ValueBuf<'_>,
        creds: &Credentials,
    ) -> FsResult<usize> {
        let dir = attrdir::resolve(self.store.as_ref(), object, &self.config.attr_dir_name, creds)?;
        list::list(self.store.as_ref(), dir, &self.registry, out, creds)
    }

    /// Resolve `name` to its namespace and validate its shape.
    fn checked_namespace(&self, name: &str) -> FsResult<Namespace> {
        if name.is_empty() || name.len() > self.config.limits.max_name_len {
            return Err(FsError::InvalidName);
        }
        let ns = self.registry.find(name).ok_or(FsError::NotSupported)?;
        if ns.requires_suffix() && name.len() == ns.prefix().len() {
            return Err(FsError::InvalidName);
        }
        Ok(ns)
    }
}
