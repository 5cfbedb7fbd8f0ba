//! Namespace dispatch for attribute names.
//!
//! Every attribute name belongs to a namespace identified by a literal
//! prefix. The registry resolves a name to its namespace by testing
//! registered prefixes in fixed order and stopping at the first match; each
//! namespace variant carries its own listing and mutation policy.

use crate::config::FsConfig;
use crate::error::{FsError, FsResult};
use crate::types::Credentials;

pub const XATTR_USER_PREFIX: &str = "user.";
pub const XATTR_TRUSTED_PREFIX: &str = "trusted.";
pub const XATTR_SECURITY_PREFIX: &str = "security.";
pub const POSIX_ACL_ACCESS: &str = "system.posix_acl_access";
pub const POSIX_ACL_DEFAULT: &str = "system.posix_acl_default";

/// Attribute namespaces.
///
/// The set is a closed enum rather than an open handler table, so overlapping
/// prefixes are a checkable property instead of a hidden ordering hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Namespace {
    /// User-defined attributes, `user.*`
    User,
    /// Privileged attributes, `trusted.*`; invisible and untouchable for
    /// unprivileged callers
    Trusted,
    /// Security labels, `security.*`
    Security,
    /// The POSIX access ACL blob
    AclAccess,
    /// The POSIX default ACL blob
    AclDefault,
}

impl Namespace {
    /// Literal prefix owned by this namespace. For the ACL variants the
    /// prefix is the full attribute name.
    pub const fn prefix(self) -> &'static str {
        match self {
            Namespace::User => XATTR_USER_PREFIX,
            Namespace::Trusted => XATTR_TRUSTED_PREFIX,
            Namespace::Security => XATTR_SECURITY_PREFIX,
            Namespace::AclAccess => POSIX_ACL_ACCESS,
            Namespace::AclDefault => POSIX_ACL_DEFAULT,
        }
    }

    /// Whether names in this namespace need a non-empty suffix after the
    /// prefix. The ACL names are complete as-is.
    pub(crate) const fn requires_suffix(self) -> bool {
        match self {
            Namespace::User | Namespace::Trusted | Namespace::Security => true,
            Namespace::AclAccess | Namespace::AclDefault => false,
        }
    }

    /// Whether `creds` may read attributes in this namespace.
    pub(crate) fn check_read(self, creds: &Credentials) -> FsResult<()> {
        match self {
            Namespace::Trusted if !creds.is_privileged() => Err(FsError::AccessDenied),
            _ => Ok(()),
        }
    }

    /// Whether `creds` may write or remove attributes in this namespace.
    ///
    /// The ACL blobs are mutated through dedicated ACL plumbing, never raw
    /// attribute writes, so mutation here is unsupported for them.
    pub(crate) fn check_write(self, creds: &Credentials) -> FsResult<()> {
        match self {
            Namespace::User | Namespace::Security => Ok(()),
            Namespace::Trusted if creds.is_privileged() => Ok(()),
            Namespace::Trusted => Err(FsError::AccessDenied),
            Namespace::AclAccess | Namespace::AclDefault => Err(FsError::NotSupported),
        }
    }

    /// Render `name` as a listing record for `creds`, or suppress it.
    pub(crate) fn render<'a>(self, creds: &Credentials, name: &'a str) -> Option<&'a str> {
        match self {
            Namespace::Trusted if !creds.is_privileged() => None,
            _ => Some(name),
        }
    }
}

/// Ordered first-match dispatch table over the registered namespaces
#[derive(Clone, Debug)]
pub struct NamespaceRegistry {
    entries: Vec<Namespace>,
}

impl NamespaceRegistry {
    /// Build a registry with a custom registration order.
    ///
    /// Rejects duplicates and orders in which a later namespace is shadowed
    /// by an earlier one whose prefix is a proper prefix of its own.
    pub fn new(entries: Vec<Namespace>) -> FsResult<Self> {
        for (i, later) in entries.iter().enumerate() {
            for earlier in &entries[..i] {
                if earlier == later || later.prefix().starts_with(earlier.prefix()) {
                    return Err(FsError::InvalidArgument);
                }
            }
        }
        Ok(Self { entries })
    }

    /// The registry for `config`, in the fixed registration order: user,
    /// trusted (if enabled), ACL access + default (if enabled), security.
    pub fn from_config(config: &FsConfig) -> Self {
        let mut entries = vec![Namespace::User];
        if config.enable_trusted {
            entries.push(Namespace::Trusted);
        }
        if config.enable_acls {
            entries.push(Namespace::AclAccess);
            entries.push(Namespace::AclDefault);
        }
        entries.push(Namespace::Security);
        // The fixed order has no duplicate or shadowing prefixes.
        Self { entries }
    }

    /// First registered namespace whose prefix is a literal byte prefix of
    /// `name`, or `None` if the name belongs to no registered namespace.
    pub fn find(&self, name: &str) -> Option<Namespace> {
        self.entries
            .iter()
            .copied()
            .find(|ns| name.starts_with(ns.prefix()))
    }
}
