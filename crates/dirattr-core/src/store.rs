//! Object store abstraction and the in-memory reference store.
//!
//! The emulation layer treats its substrate as a black-box directory/file
//! service: lookup, create, read, write, remove, enumerate. Each call is
//! assumed atomic; no locking is layered on top of what the store already
//! guarantees.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{FsError, FsResult};
use crate::types::{CreateAttrs, Credentials, DirEntry, ObjectId, ObjectKind, ObjectMeta};

/// Flags for [`ObjectStore::lookup`].
///
/// With `attr_dir` set, the lookup addresses the hidden per-object attribute
/// container rather than a named child; `name` is then only the container's
/// reserved display name. `create_attr_dir` asks the store to create the
/// container if it is missing, atomically with respect to racing creators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LookupFlags {
    pub attr_dir: bool,
    pub create_attr_dir: bool,
}

impl LookupFlags {
    pub const ATTR_DIR: LookupFlags = LookupFlags {
        attr_dir: true,
        create_attr_dir: false,
    };

    pub const CREATE_ATTR_DIR: LookupFlags = LookupFlags {
        attr_dir: true,
        create_attr_dir: true,
    };
}

/// Per-entry callback for [`ObjectStore::enumerate`]. Returning an error
/// aborts the enumeration and surfaces that error to the caller.
pub type EnumerateFn<'a> = dyn FnMut(&DirEntry) -> FsResult<()> + 'a;

/// Black-box directory/file substrate the emulation layer runs on.
///
/// Concurrency safety is delegated entirely to implementations: every method
/// must behave atomically per call, and attribute-directory creation must
/// resolve concurrent creators through create-or-fail semantics.
pub trait ObjectStore: Send + Sync {
    /// Look up a named child of `parent`, or the hidden attribute directory
    /// when `flags.attr_dir` is set. A missing child (or missing attribute
    /// directory) is `NotFound`.
    fn lookup(
        &self,
        parent: ObjectId,
        name: &str,
        flags: LookupFlags,
        creds: &Credentials,
    ) -> FsResult<ObjectId>;

    /// Create a named child of `parent`. Fails with `AlreadyExists` if the
    /// name is taken; ownership and mode come from `attrs`, not from ambient
    /// state.
    fn create(
        &self,
        parent: ObjectId,
        name: &str,
        attrs: &CreateAttrs,
        creds: &Credentials,
    ) -> FsResult<ObjectId>;

    /// Read up to `buf.len()` bytes from `offset`. A read past the end of the
    /// object transfers zero bytes.
    fn read(
        &self,
        object: ObjectId,
        offset: u64,
        buf: &mut [u8],
        creds: &Credentials,
    ) -> FsResult<usize>;

    /// Write `data` at `offset`, extending the object as needed.
    fn write(
        &self,
        object: ObjectId,
        offset: u64,
        data: &[u8],
        creds: &Credentials,
    ) -> FsResult<usize>;

    /// Truncate or extend the object to exactly `new_len` bytes.
    fn truncate(&self, object: ObjectId, new_len: u64, creds: &Credentials) -> FsResult<()>;

    /// Remove the named child of `parent`.
    fn remove(&self, parent: ObjectId, name: &str, creds: &Credentials) -> FsResult<()>;

    /// Report size, kind, and ownership of one object.
    fn metadata(&self, object: ObjectId) -> FsResult<ObjectMeta>;

    /// Enumerate entries of `dir` in store-native order, including the `.`
    /// and `..` pseudo-entries. No sort order is guaranteed.
    fn enumerate(&self, dir: ObjectId, f: &mut EnumerateFn<'_>) -> FsResult<()>;
}

/// Filesystem node kinds for the in-memory store
#[derive(Clone, Debug)]
enum NodeKind {
    File { data: Vec<u8> },
    Directory { children: HashMap<String, ObjectId> },
}

/// In-memory filesystem node
#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    mode: u32,
    uid: u32,
    gid: u32,
    /// Hidden attribute container; reachable only through flagged lookup,
    /// never through ordinary lookup or enumeration
    attr_dir: Option<ObjectId>,
}

/// In-memory reference implementation of [`ObjectStore`].
///
/// Used by the test suite and by embedders that want the emulation layer
/// without a real backing store.
pub struct InMemoryStore {
    nodes: Mutex<HashMap<ObjectId, Node>>,
    next_id: Mutex<u64>,
    root: ObjectId,
}

impl InMemoryStore {
    pub fn new() -> Self {
        let root = ObjectId::new(1);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                kind: NodeKind::Directory {
                    children: HashMap::new(),
                },
                mode: 0o755,
                uid: 0,
                gid: 0,
                attr_dir: None,
            },
        );
        Self {
            nodes: Mutex::new(nodes),
            next_id: Mutex::new(2),
            root,
        }
    }

    /// The root directory object
    pub fn root(&self) -> ObjectId {
        self.root
    }

    fn allocate_id(&self) -> ObjectId {
        let mut next_id = self.next_id.lock().unwrap();
        let id = ObjectId::new(*next_id);
        *next_id += 1;
        id
    }

    fn build_node(attrs: &CreateAttrs) -> Node {
        let kind = match attrs.kind {
            ObjectKind::Regular => NodeKind::File { data: Vec::new() },
            ObjectKind::Directory => NodeKind::Directory {
                children: HashMap::new(),
            },
        };
        Node {
            kind,
            mode: attrs.mode,
            uid: attrs.uid,
            gid: attrs.gid,
            attr_dir: None,
        }
    }

    fn insert_node(&self, attrs: &CreateAttrs) -> ObjectId {
        let id = self.allocate_id();
        self.nodes.lock().unwrap().insert(id, Self::build_node(attrs));
        id
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryStore {
    fn lookup(
        &self,
        parent: ObjectId,
        name: &str,
        flags: LookupFlags,
        creds: &Credentials,
    ) -> FsResult<ObjectId> {
        if flags.attr_dir {
            {
                let nodes = self.nodes.lock().unwrap();
                let node = nodes.get(&parent).ok_or(FsError::NotFound)?;
                if let Some(dir) = node.attr_dir {
                    return Ok(dir);
                }
                if !flags.create_attr_dir {
                    return Err(FsError::NotFound);
                }
            }
            let dir = self.insert_node(&CreateAttrs::attribute_directory(creds));
            let mut nodes = self.nodes.lock().unwrap();
            let node = nodes.get_mut(&parent).ok_or(FsError::NotFound)?;
            if let Some(existing) = node.attr_dir {
                // Racing creator won between the two lock scopes; theirs wins.
                nodes.remove(&dir);
                return Ok(existing);
            }
            node.attr_dir = Some(dir);
            Ok(dir)
        } else {
            let nodes = self.nodes.lock().unwrap();
            let node = nodes.get(&parent).ok_or(FsError::NotFound)?;
            match &node.kind {
                NodeKind::Directory { children } => {
                    children.get(name).copied().ok_or(FsError::NotFound)
                }
                NodeKind::File { .. } => Err(FsError::NotADirectory),
            }
        }
    }

    fn create(
        &self,
        parent: ObjectId,
        name: &str,
        attrs: &CreateAttrs,
        _creds: &Credentials,
    ) -> FsResult<ObjectId> {
        let id = self.allocate_id();
        // Existence check and insertion happen under one lock acquisition so
        // racing creators of the same name cannot both succeed.
        let mut nodes = self.nodes.lock().unwrap();
        let parent_node = nodes.get(&parent).ok_or(FsError::NotFound)?;
        match &parent_node.kind {
            NodeKind::Directory { children } => {
                if children.contains_key(name) {
                    return Err(FsError::AlreadyExists);
                }
            }
            NodeKind::File { .. } => return Err(FsError::NotADirectory),
        }

        nodes.insert(id, Self::build_node(attrs));
        if let Some(parent_node) = nodes.get_mut(&parent) {
            if let NodeKind::Directory { children } = &mut parent_node.kind {
                children.insert(name.to_string(), id);
            }
        }
        Ok(id)
    }

    fn read(
        &self,
        object: ObjectId,
        offset: u64,
        buf: &mut [u8],
        _creds: &Credentials,
    ) -> FsResult<usize> {
        let nodes = self.nodes.lock().unwrap();
        let node = nodes.get(&object).ok_or(FsError::NotFound)?;
        match &node.kind {
            NodeKind::File { data } => {
                let start = offset as usize;
                if start >= data.len() {
                    return Ok(0);
                }
                let end = std::cmp::min(start + buf.len(), data.len());
                let count = end - start;
                buf[..count].copy_from_slice(&data[start..end]);
                Ok(count)
            }
            NodeKind::Directory { .. } => Err(FsError::IsADirectory),
        }
    }

    fn write(
        &self,
        object: ObjectId,
        offset: u64,
        data: &[u8],
        _creds: &Credentials,
    ) -> FsResult<usize> {
        let mut nodes = self.nodes.lock().unwrap();
        let node = nodes.get_mut(&object).ok_or(FsError::NotFound)?;
        match &mut node.kind {
            NodeKind::File { data: content } => {
                let start = offset as usize;
                let end = start + data.len();
                if end > content.len() {
                    content.resize(end, 0);
                }
                content[start..end].copy_from_slice(data);
                Ok(data.len())
            }
            NodeKind::Directory { .. } => Err(FsError::IsADirectory),
        }
    }

    fn truncate(&self, object: ObjectId, new_len: u64, _creds: &Credentials) -> FsResult<()> {
        let mut nodes = self.nodes.lock().unwrap();
        let node = nodes.get_mut(&object).ok_or(FsError::NotFound)?;
        match &mut node.kind {
            NodeKind::File { data } => {
                data.resize(new_len as usize, 0);
                Ok(())
            }
            NodeKind::Directory { .. } => Err(FsError::IsADirectory),
        }
    }

    fn remove(&self, parent: ObjectId, name: &str, _creds: &Credentials) -> FsResult<()> {
        let mut nodes = self.nodes.lock().unwrap();
        let parent_node = nodes.get_mut(&parent).ok_or(FsError::NotFound)?;
        let removed = match &mut parent_node.kind {
            NodeKind::Directory { children } => children.remove(name).ok_or(FsError::NotFound)?,
            NodeKind::File { .. } => return Err(FsError::NotADirectory),
        };
        nodes.remove(&removed);
        Ok(())
    }

    fn metadata(&self, object: ObjectId) -> FsResult<ObjectMeta> {
        let nodes = self.nodes.lock().unwrap();
        let node = nodes.get(&object).ok_or(FsError::NotFound)?;
        let (kind, len) = match &node.kind {
            NodeKind::File { data } => (ObjectKind::Regular, data.len() as u64),
            NodeKind::Directory { children } => (ObjectKind::Directory, children.len() as u64),
        };
        Ok(ObjectMeta {
            kind,
            len,
            mode: node.mode,
            uid: node.uid,
            gid: node.gid,
        })
    }

    fn enumerate(&self, dir: ObjectId, f: &mut EnumerateFn<'_>) -> FsResult<()> {
        // Snapshot the names so the callback can call back into the store.
        let names: Vec<(String, ObjectKind)> = {
            let nodes = self.nodes.lock().unwrap();
            let node = nodes.get(&dir).ok_or(FsError::NotFound)?;
            match &node.kind {
                NodeKind::Directory { children } => children
                    .iter()
                    .map(|(name, id)| {
                        let kind = match nodes.get(id).map(|n| &n.kind) {
                            Some(NodeKind::Directory { .. }) => ObjectKind::Directory,
                            _ => ObjectKind::Regular,
                        };
                        (name.clone(), kind)
                    })
                    .collect(),
                NodeKind::File { .. } => return Err(FsError::NotADirectory),
            }
        };

        for name in [".", ".."] {
            f(&DirEntry {
                name: name.to_string(),
                kind: ObjectKind::Directory,
            })?;
        }
        for (name, kind) in names {
            f(&DirEntry { name, kind })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREDS: Credentials = Credentials::new(1000, 1000);

    fn file_attrs() -> CreateAttrs {
        CreateAttrs {
            kind: ObjectKind::Regular,
            mode: 0o644,
            uid: CREDS.uid,
            gid: CREDS.gid,
        }
    }

    #[test]
    fn create_lookup_read_write() {
        let store = InMemoryStore::new();
        let file = store
            .create(store.root(), "data.bin", &file_attrs(), &CREDS)
            .unwrap();

        let n = store.write(file, 0, b"hello world", &CREDS).unwrap();
        assert_eq!(n, 11);

        let found = store
            .lookup(store.root(), "data.bin", LookupFlags::default(), &CREDS)
            .unwrap();
        assert_eq!(found, file);

        let mut buf = [0u8; 5];
        let n = store.read(file, 6, &mut buf, &CREDS).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buf, b"world");
    }

    #[test]
    fn read_past_eof_transfers_nothing() {
        let store = InMemoryStore::new();
        let file = store
            .create(store.root(), "short", &file_attrs(), &CREDS)
            .unwrap();
        store.write(file, 0, b"short", &CREDS).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(store.read(file, 100, &mut buf, &CREDS).unwrap(), 0);
    }

    #[test]
    fn create_is_exclusive() {
        let store = InMemoryStore::new();
        store
            .create(store.root(), "dup", &file_attrs(), &CREDS)
            .unwrap();
        let err = store
            .create(store.root(), "dup", &file_attrs(), &CREDS)
            .unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists));
    }

    #[test]
    fn concurrent_create_of_same_name_has_one_winner() {
        use std::sync::{Arc, Barrier};

        let store = Arc::new(InMemoryStore::new());
        for round in 0..64 {
            let name = format!("contended{round}");
            let barrier = Arc::new(Barrier::new(2));

            let results: Vec<FsResult<ObjectId>> = [0, 1]
                .map(|_| {
                    let store = store.clone();
                    let name = name.clone();
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        store.create(store.root(), &name, &file_attrs(), &CREDS)
                    })
                })
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect();

            let winners: Vec<ObjectId> = results.iter().filter_map(|r| r.as_ref().ok().copied()).collect();
            assert_eq!(winners.len(), 1, "exactly one create may succeed");
            for result in &results {
                if let Err(err) = result {
                    assert!(matches!(err, FsError::AlreadyExists));
                }
            }

            // The name resolves to the winner, and the loser left no orphan
            // behind that a write could land on invisibly.
            let resolved = store
                .lookup(store.root(), &name, LookupFlags::default(), &CREDS)
                .unwrap();
            assert_eq!(resolved, winners[0]);
        }
    }

    #[test]
    fn truncate_shrinks_and_extends() {
        let store = InMemoryStore::new();
        let file = store
            .create(store.root(), "t", &file_attrs(), &CREDS)
            .unwrap();
        store.write(file, 0, b"0123456789", &CREDS).unwrap();

        store.truncate(file, 4, &CREDS).unwrap();
        assert_eq!(store.metadata(file).unwrap().len, 4);

        store.truncate(file, 8, &CREDS).unwrap();
        let mut buf = [0xffu8; 8];
        let n = store.read(file, 0, &mut buf, &CREDS).unwrap();
        assert_eq!(n, 8);
        assert_eq!(&buf, b"0123\0\0\0\0");
    }

    #[test]
    fn attr_dir_is_hidden_from_plain_lookup() {
        let store = InMemoryStore::new();
        let file = store
            .create(store.root(), "owner", &file_attrs(), &CREDS)
            .unwrap();

        assert!(matches!(
            store.lookup(file, ".xattr", LookupFlags::ATTR_DIR, &CREDS),
            Err(FsError::NotFound)
        ));

        let dir = store
            .lookup(file, ".xattr", LookupFlags::CREATE_ATTR_DIR, &CREDS)
            .unwrap();
        // Subsequent flagged lookups find the same container.
        let again = store
            .lookup(file, ".xattr", LookupFlags::ATTR_DIR, &CREDS)
            .unwrap();
        assert_eq!(dir, again);

        // The container never shows up in ordinary enumeration of the parent.
        let mut seen = Vec::new();
        store
            .enumerate(store.root(), &mut |entry| {
                seen.push(entry.name.clone());
                Ok(())
            })
            .unwrap();
        assert!(seen.contains(&"owner".to_string()));
        assert!(!seen.iter().any(|n| n == ".xattr"));
    }

    #[test]
    fn attr_dir_ownership_comes_from_creator() {
        let store = InMemoryStore::new();
        let file = store
            .create(store.root(), "f", &file_attrs(), &CREDS)
            .unwrap();
        let writer = Credentials::new(42, 43);
        let dir = store
            .lookup(file, ".xattr", LookupFlags::CREATE_ATTR_DIR, &writer)
            .unwrap();
        let meta = store.metadata(dir).unwrap();
        assert_eq!((meta.uid, meta.gid), (42, 43));
        assert_eq!(meta.kind, ObjectKind::Directory);
    }

    #[test]
    fn enumerate_yields_pseudo_entries_first() {
        let store = InMemoryStore::new();
        store
            .create(store.root(), "a", &file_attrs(), &CREDS)
            .unwrap();

        let mut names = Vec::new();
        store
            .enumerate(store.root(), &mut |entry| {
                names.push(entry.name.clone());
                Ok(())
            })
            .unwrap();
        assert_eq!(&names[..2], &[".".to_string(), "..".to_string()]);
        assert!(names.contains(&"a".to_string()));
    }

    #[test]
    fn enumerate_abort_propagates() {
        let store = InMemoryStore::new();
        let err = store
            .enumerate(store.root(), &mut |_| Err(FsError::Range))
            .unwrap_err();
        assert!(matches!(err, FsError::Range));
    }

    #[test]
    fn remove_drops_the_node() {
        let store = InMemoryStore::new();
        store
            .create(store.root(), "gone", &file_attrs(), &CREDS)
            .unwrap();
        store.remove(store.root(), "gone", &CREDS).unwrap();
        assert!(matches!(
            store.lookup(store.root(), "gone", LookupFlags::default(), &CREDS),
            Err(FsError::NotFound)
        ));
        assert!(matches!(
            store.remove(store.root(), "gone", &CREDS),
            Err(FsError::NotFound)
        ));
    }
}
