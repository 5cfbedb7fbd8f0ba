//! Listing engine: render all visible attribute names into a caller buffer.
//!
//! Records are `name\0`, accumulated in store-native enumeration order.
//! Entries with no registered namespace are silently skipped; an output
//! buffer too small for the full listing fails the whole call with `Range`
//! rather than producing a truncated-but-valid-looking result.

use crate::attrdir::AttrDir;
use crate::error::{FsError, FsResult};
use crate::ns::NamespaceRegistry;
use crate::store::ObjectStore;
use crate::types::{Credentials, ValueBuf};

/// Per-call output cursor. Destroyed at call completion; nothing persists
/// across calls.
struct ListingCursor<'a> {
    buf: Option<&'a mut [u8]>,
    pos: usize,
}

impl ListingCursor<'_> {
    fn push_record(&mut self, name: &str) -> FsResult<()> {
        let record_len = name.len() + 1;
        if let Some(buf) = self.buf.as_deref_mut() {
            if self.pos + record_len > buf.len() {
                return Err(FsError::Range);
            }
            buf[self.pos..self.pos + name.len()].copy_from_slice(name.as_bytes());
            buf[self.pos + name.len()] = 0;
        }
        self.pos += record_len;
        Ok(())
    }
}

/// Enumerate the attribute directory and render every visible name.
///
/// Returns the bytes written, or in probe mode the bytes that would be
/// written. Probe mode runs the same enumeration with no buffer, so the
/// reported size is always a fresh sum rather than an advertised one. An
/// absent directory lists as zero attributes in both modes.
pub(crate) fn list(
    store: &dyn ObjectStore,
    dir: AttrDir,
    registry: &NamespaceRegistry,
    out: ValueBuf<'_>,
    creds: &Credentials,
) -> FsResult<usize> {
    let dir = match dir {
        AttrDir::Present(dir) => dir,
        AttrDir::Absent => return Ok(0),
    };

    let mut cursor = ListingCursor {
        buf: match out {
            ValueBuf::Probe => None,
            ValueBuf::Fill(buf) => Some(buf),
        },
        pos: 0,
    };

    store.enumerate(dir, &mut |entry| {
        if entry.name == "." || entry.name == ".." {
            return Ok(());
        }
        // No handler means the entry is not an exposed attribute.
        let Some(ns) = registry.find(&entry.name) else {
            return Ok(());
        };
        match ns.render(creds, &entry.name) {
            Some(rendered) => cursor.push_record(rendered),
            None => Ok(()),
        }
    })?;

    Ok(cursor.pos)
}

/// Split a flat `name\0` listing buffer back into attribute names.
pub fn split_names(buf: &[u8]) -> Vec<String> {
    buf.split(|&b| b == 0)
        .filter(|name| !name.is_empty())
        .map(|name| String::from_utf8_lossy(name).into_owned())
        .collect()
}
