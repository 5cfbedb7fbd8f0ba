//! Attribute directory resolution.
//!
//! Every object that owns extended attributes gets a hidden, lazily created
//! attribute directory. Absence of that directory is a legal state equal to
//! "zero attributes", never a store error.

use crate::error::{FsError, FsResult};
use crate::store::{LookupFlags, ObjectStore};
use crate::types::{Credentials, ObjectId};

/// Outcome of resolving an object's hidden attribute directory
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AttrDir {
    Present(ObjectId),
    Absent,
}

/// Find the attribute directory of `object` without creating it.
///
/// A missing directory resolves to `Absent`; a missing `object` stays a
/// `NotFound` error so callers can tell the two apart.
pub(crate) fn resolve(
    store: &dyn ObjectStore,
    object: ObjectId,
    attr_dir_name: &str,
    creds: &Credentials,
) -> FsResult<AttrDir> {
    match store.lookup(object, attr_dir_name, LookupFlags::ATTR_DIR, creds) {
        Ok(dir) => Ok(AttrDir::Present(dir)),
        Err(FsError::NotFound) => {
            // Distinguish a missing attribute directory from a missing object.
            store.metadata(object)?;
            Ok(AttrDir::Absent)
        }
        Err(err) => Err(err),
    }
}

/// Find or create the attribute directory of `object`.
///
/// A racing creator winning the create still counts as success; the store's
/// `AlreadyExists` is resolved by looking the directory up again.
pub(crate) fn resolve_or_create(
    store: &dyn ObjectStore,
    object: ObjectId,
    attr_dir_name: &str,
    creds: &Credentials,
) -> FsResult<ObjectId> {
    match store.lookup(object, attr_dir_name, LookupFlags::CREATE_ATTR_DIR, creds) {
        Ok(dir) => Ok(dir),
        Err(FsError::AlreadyExists) => {
            store.lookup(object, attr_dir_name, LookupFlags::ATTR_DIR, creds)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EnumerateFn, InMemoryStore};
    use crate::types::{CreateAttrs, ObjectKind, ObjectMeta};
    use std::sync::atomic::{AtomicBool, Ordering};

    const CREDS: Credentials = Credentials::new(1000, 1000);
    const DIR_NAME: &str = ".xattr";

    fn store_with_file() -> (InMemoryStore, ObjectId) {
        let store = InMemoryStore::new();
        let file = store
            .create(
                store.root(),
                "file",
                &CreateAttrs {
                    kind: ObjectKind::Regular,
                    mode: 0o644,
                    uid: 0,
                    gid: 0,
                },
                &CREDS,
            )
            .unwrap();
        (store, file)
    }

    #[test]
    fn absent_is_not_an_error() {
        let (store, file) = store_with_file();
        let resolved = resolve(&store, file, DIR_NAME, &CREDS).unwrap();
        assert_eq!(resolved, AttrDir::Absent);
    }

    #[test]
    fn missing_object_is_an_error() {
        let store = InMemoryStore::new();
        let err = resolve(&store, ObjectId::new(999), DIR_NAME, &CREDS).unwrap_err();
        assert!(matches!(err, FsError::NotFound));
    }

    #[test]
    fn create_then_resolve() {
        let (store, file) = store_with_file();
        let dir = resolve_or_create(&store, file, DIR_NAME, &CREDS).unwrap();
        assert_eq!(
            resolve(&store, file, DIR_NAME, &CREDS).unwrap(),
            AttrDir::Present(dir)
        );
    }

    /// Store wrapper whose attribute-directory create loses one race.
    struct RacyStore {
        inner: InMemoryStore,
        raced: AtomicBool,
    }

    impl ObjectStore for RacyStore {
        fn lookup(
            &self,
            parent: ObjectId,
            name: &str,
            flags: LookupFlags,
            creds: &Credentials,
        ) -> FsResult<ObjectId> {
            if flags.create_attr_dir && !self.raced.swap(true, Ordering::SeqCst) {
                // Another creator got there first; the directory now exists.
                self.inner
                    .lookup(parent, name, LookupFlags::CREATE_ATTR_DIR, creds)?;
                return Err(FsError::AlreadyExists);
            }
            self.inner.lookup(parent, name, flags, creds)
        }

        fn create(
            &self,
            parent: ObjectId,
            name: &str,
            attrs: &CreateAttrs,
            creds: &Credentials,
        ) -> FsResult<ObjectId> {
            self.inner.create(parent, name, attrs, creds)
        }

        fn read(
            &self,
            object: ObjectId,
            offset: u64,
            buf: &mut [u8],
            creds: &Credentials,
        ) -> FsResult<usize> {
            self.inner.read(object, offset, buf, creds)
        }

        fn write(
            &self,
            object: ObjectId,
            offset: u64,
            data: &[u8],
            creds: &Credentials,
        ) -> FsResult<usize> {
            self.inner.write(object, offset, data, creds)
        }

        fn truncate(&self, object: ObjectId, new_len: u64, creds: &Credentials) -> FsResult<()> {
            self.inner.truncate(object, new_len, creds)
        }

        fn remove(&self, parent: ObjectId, name: &str, creds: &Credentials) -> FsResult<()> {
            self.inner.remove(parent, name, creds)
        }

        fn metadata(&self, object: ObjectId) -> FsResult<ObjectMeta> {
            self.inner.metadata(object)
        }

        fn enumerate(&self, dir: ObjectId, f: &mut EnumerateFn<'_>) -> FsResult<()> {
            self.inner.enumerate(dir, f)
        }
    }

    #[test]
    fn lost_create_race_is_success() {
        let (inner, file) = store_with_file();
        let store = RacyStore {
            inner,
            raced: AtomicBool::new(false),
        };
        let dir = resolve_or_create(&store, file, DIR_NAME, &CREDS).unwrap();
        assert_eq!(
            resolve(&store, file, DIR_NAME, &CREDS).unwrap(),
            AttrDir::Present(dir)
        );
    }
}
