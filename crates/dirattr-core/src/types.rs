//! Core type definitions for dirattr

use serde::{Deserialize, Serialize};

/// Opaque object identifier assigned by the backing store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Calling identity, captured at the call boundary.
///
/// Credentials are an explicit parameter on every operation rather than
/// ambient state; attribute files are stamped with the identity of whoever
/// wrote them, not with the owning object's identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub uid: u32,
    pub gid: u32,
}

impl Credentials {
    pub const ROOT: Credentials = Credentials { uid: 0, gid: 0 };

    pub const fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }

    /// Whether this identity may touch privileged namespaces
    pub const fn is_privileged(&self) -> bool {
        self.uid == 0
    }
}

/// Object kinds the store can hold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Regular,
    Directory,
}

/// Attributes stamped onto a newly created object
#[derive(Clone, Debug)]
pub struct CreateAttrs {
    pub kind: ObjectKind,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

impl CreateAttrs {
    /// A regular file backing one attribute, owned by the calling identity
    pub fn attribute_file(creds: &Credentials) -> Self {
        Self {
            kind: ObjectKind::Regular,
            mode: 0o644,
            uid: creds.uid,
            gid: creds.gid,
        }
    }

    /// The hidden per-object attribute directory
    pub fn attribute_directory(creds: &Credentials) -> Self {
        Self {
            kind: ObjectKind::Directory,
            mode: 0o700,
            uid: creds.uid,
            gid: creds.gid,
        }
    }
}

/// Metadata reported by the store for one object
#[derive(Clone, Copy, Debug)]
pub struct ObjectMeta {
    pub kind: ObjectKind,
    pub len: u64,
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
}

/// Directory entry yielded by enumeration
#[derive(Clone, Debug)]
pub struct DirEntry {
    pub name: String,
    pub kind: ObjectKind,
}

/// Output request for `get` and `list`.
///
/// The POSIX zero-size call shape maps onto an explicit two-phase protocol:
/// a `Probe` returns only the size the caller must allocate, `Fill` transfers
/// bytes into the caller's buffer.
#[derive(Debug)]
pub enum ValueBuf<'a> {
    /// Report the required size without transferring any bytes
    Probe,
    /// Copy the result into the given buffer
    Fill(&'a mut [u8]),
}
