//! Single-attribute access as file operations inside the attribute directory.
//!
//! Each attribute is an ordinary small file named after its key. `get` is a
//! lookup-and-read, `set` is a create-or-reuse-and-write, `remove` is an
//! entry delete. Concurrent writers to the same key are not serialized here;
//! last writer wins, and a reader racing a writer may observe a partial or
//! stale value.

use std::io;

use tracing::debug;

use crate::attrdir::{self, AttrDir};
use crate::error::{FsError, FsResult};
use crate::store::{LookupFlags, ObjectStore};
use crate::types::{CreateAttrs, Credentials, ObjectId, ValueBuf};

/// Read one attribute.
///
/// An absent directory or missing backing file is `NoData`. A probe returns
/// the stored length without transferring bytes. A fill reads from offset 0
/// and silently truncates to the buffer; probing first is the caller's tool
/// against truncation.
pub(crate) fn get(
    store: &dyn ObjectStore,
    dir: AttrDir,
    key: &str,
    out: ValueBuf<'_>,
    creds: &Credentials,
) -> FsResult<usize> {
    let dir = match dir {
        AttrDir::Present(dir) => dir,
        AttrDir::Absent => return Err(FsError::NoData),
    };
    let file = match store.lookup(dir, key, LookupFlags::default(), creds) {
        Ok(file) => file,
        Err(FsError::NotFound) => return Err(FsError::NoData),
        Err(err) => return Err(err),
    };
    match out {
        ValueBuf::Probe => Ok(store.metadata(file)?.len as usize),
        ValueBuf::Fill(buf) => store.read(file, 0, buf, creds),
    }
}

/// Write one attribute, creating its backing file on demand.
///
/// The file is created mode 0644 and owned by the calling identity, not by
/// the owning object. Replacing an existing value writes from offset 0 and
/// truncates to the new length. A write that fails after creation leaves a
/// zero- or partial-length file behind; there is no rollback of the create.
pub(crate) fn set(
    store: &dyn ObjectStore,
    object: ObjectId,
    attr_dir_name: &str,
    key: &str,
    value: &[u8],
    creds: &Credentials,
) -> FsResult<()> {
    let dir = attrdir::resolve_or_create(store, object, attr_dir_name, creds)?;
    let file = match store.create(dir, key, &CreateAttrs::attribute_file(creds), creds) {
        Ok(file) => file,
        Err(FsError::AlreadyExists) => store.lookup(dir, key, LookupFlags::default(), creds)?,
        Err(err) => return Err(err),
    };

    let written = store.write(file, 0, value, creds)?;
    if written != value.len() {
        debug!(key, written, expected = value.len(), "short attribute write");
        return Err(FsError::Io(io::ErrorKind::WriteZero.into()));
    }
    // Shrink-on-replace: drop any trailing bytes of an older, longer value.
    store.truncate(file, value.len() as u64, creds)?;
    Ok(())
}

/// Delete one attribute's backing file.
///
/// An absent directory is `NoData`; store errors, including `NotFound` for a
/// key that was never set, propagate unchanged. Callers decide how to map
/// them.
pub(crate) fn remove(
    store: &dyn ObjectStore,
    dir: AttrDir,
    key: &str,
    creds: &Credentials,
) -> FsResult<()> {
    let dir = match dir {
        AttrDir::Present(dir) => dir,
        AttrDir::Absent => return Err(FsError::NoData),
    };
    store.remove(dir, key, creds)
}
