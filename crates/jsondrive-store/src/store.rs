use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec;
use crate::config::{StoreConfig, StoreOptions};
use crate::error::{Result, StoreError};
use crate::locks::{lock_ignoring_poison, CollectionLocks};
use crate::logger::Logger;
use crate::names::{validate_collection, validate_resource};

/// Extension of every stored record.
const RECORD_EXT: &str = ".json";
/// Suffix appended to a record path while it is being written.
const TMP_SUFFIX: &str = ".tmp";

/// File-backed JSON document store.
///
/// Each record lives at `<root>/<collection>/<resource>.json`. Writes and
/// deletes within a collection are serialized on a per-collection lock and
/// writes go through a temporary sibling that is renamed into place, so a
/// reader sees either the old or the new document, never a torn one.
///
/// Reads take no lock. The store keeps no file handles or cached documents
/// between calls and is safe to share across threads.
pub struct Store {
    root: PathBuf,
    locks: CollectionLocks,
    config: StoreConfig,
    log: Arc<dyn Logger>,
}

impl Store {
    /// Open the store at `dir` with default options, creating the directory
    /// (and missing parents) if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_options(dir, StoreOptions::default())
    }

    /// Open the store at `dir` with the given options.
    pub fn with_options(dir: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let root = clean_path(dir.as_ref());
        let (config, log) = options.into_parts();

        match fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {
                log.debug(format_args!(
                    "using '{}' (database already exists)",
                    root.display()
                ));
            }
            Ok(_) => return Err(StoreError::NotADirectory(root)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log.debug(format_args!("creating database at '{}'", root.display()));
                create_dir_all(&root, config.dir_mode)?;
            }
            Err(e) => return Err(StoreError::io(&root, e)),
        }

        Ok(Self {
            root,
            locks: CollectionLocks::new(),
            config,
            log,
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configuration the store was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of collections that have been locked at least once.
    pub fn collection_lock_count(&self) -> usize {
        self.locks.len()
    }

    /// Write `value` as the record `resource` in `collection`, replacing any
    /// previous version atomically.
    ///
    /// The collection directory is created if missing. If encoding fails no
    /// file is touched; if writing the temporary file or renaming it fails,
    /// the temporary file is removed and the previous record survives.
    pub fn write<T>(&self, collection: &str, resource: &str, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        validate_collection(collection)?;
        validate_resource(resource)?;

        let lock = self.locks.get_or_create(collection);
        let _guard = lock_ignoring_poison(&lock);

        let bytes = codec::encode(value, &self.config.indent).map_err(StoreError::Encode)?;

        let dir = self.collection_dir(collection);
        create_dir_all(&dir, self.config.dir_mode)?;

        let final_path = dir.join(format!("{resource}{RECORD_EXT}"));
        let tmp_path = tmp_path_for(&final_path);

        if let Err(err) = self.replace_file(&tmp_path, &final_path, &bytes) {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    self.log.warn(format_args!(
                        "failed to remove temporary file '{}': {}",
                        tmp_path.display(),
                        cleanup
                    ));
                }
            }
            self.log.error(format_args!(
                "write {collection}/{resource} failed: {err}"
            ));
            return Err(err);
        }

        self.log.debug(format_args!(
            "wrote {collection}/{resource} ({} bytes)",
            bytes.len()
        ));
        Ok(())
    }

    /// Read the record `resource` from `collection` and decode it as `T`.
    ///
    /// `resource` may be given with or without its `.json` extension.
    pub fn read<T: DeserializeOwned>(&self, collection: &str, resource: &str) -> Result<T> {
        let path = self.locate(collection, resource)?;
        let bytes = fs::read(&path).map_err(|e| self.read_error(collection, resource, &path, e))?;
        codec::decode(&bytes).map_err(|source| StoreError::Decode { path, source })
    }

    /// Read the record `resource` from `collection` as raw JSON text.
    pub fn read_raw(&self, collection: &str, resource: &str) -> Result<String> {
        let path = self.locate(collection, resource)?;
        fs::read_to_string(&path).map_err(|e| self.read_error(collection, resource, &path, e))
    }

    /// Read every record in `collection` as raw JSON text.
    ///
    /// Documents are returned in directory iteration order, which is not
    /// sorted and differs between filesystems. Temporary files of in-flight
    /// writes and subdirectories are skipped. The first unreadable file
    /// aborts the whole call.
    pub fn read_all(&self, collection: &str) -> Result<Vec<String>> {
        validate_collection(collection)?;

        let dir = self.collection_dir(collection);
        if !dir.is_dir() {
            return Err(StoreError::CollectionNotFound {
                collection: collection.to_string(),
            });
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))? {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            let path = entry.path();
            if !path.is_file() || is_tmp_file(&path) {
                continue;
            }
            let text = fs::read_to_string(&path).map_err(|e| StoreError::io(&path, e))?;
            records.push(text);
        }

        self.log.trace(format_args!(
            "read {} records from {collection}",
            records.len()
        ));
        Ok(records)
    }

    /// Remove the record `resource` from `collection`, together with a
    /// leftover temporary file for it. Other records and the collection
    /// directory are left in place.
    pub fn delete(&self, collection: &str, resource: &str) -> Result<()> {
        validate_collection(collection)?;
        validate_resource(resource)?;

        let lock = self.locks.get_or_create(collection);
        let _guard = lock_ignoring_poison(&lock);

        let dir = self.collection_dir(collection);
        let path = resolve_record(&dir, resource).ok_or_else(|| not_found(collection, resource))?;

        fs::remove_file(&path).map_err(|e| self.read_error(collection, resource, &path, e))?;

        let tmp_path = tmp_path_for(&path);
        match fs::remove_file(&tmp_path) {
            Ok(()) => self.log.debug(format_args!(
                "removed stale temporary file '{}'",
                tmp_path.display()
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StoreError::io(&tmp_path, e)),
        }

        self.log.debug(format_args!("deleted {collection}/{resource}"));
        Ok(())
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(collection)
    }

    /// Validate the names and resolve the record's path on disk.
    fn locate(&self, collection: &str, resource: &str) -> Result<PathBuf> {
        validate_collection(collection)?;
        validate_resource(resource)?;
        resolve_record(&self.collection_dir(collection), resource)
            .ok_or_else(|| not_found(collection, resource))
    }

    fn replace_file(&self, tmp_path: &Path, final_path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = open_for_write(tmp_path, self.config.file_mode)
            .map_err(|e| StoreError::io(tmp_path, e))?;
        file.write_all(bytes).map_err(|e| StoreError::io(tmp_path, e))?;
        if self.config.sync_writes {
            file.sync_all().map_err(|e| StoreError::io(tmp_path, e))?;
        }
        drop(file);

        fs::rename(tmp_path, final_path).map_err(|e| StoreError::io(final_path, e))
    }

    /// A record that vanished between resolution and I/O is reported as not found.
    fn read_error(&self, collection: &str, resource: &str, path: &Path, e: io::Error) -> StoreError {
        if e.kind() == io::ErrorKind::NotFound {
            not_found(collection, resource)
        } else {
            StoreError::io(path, e)
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("root", &self.root)
            .field("collections_locked", &self.locks.len())
            .field("config", &self.config)
            .finish()
    }
}

fn not_found(collection: &str, resource: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        resource: resource.to_string(),
    }
}

/// Find the record file for `resource`: `<resource>.json` first, then
/// `<resource>` itself when the name already carries the extension.
fn resolve_record(dir: &Path, resource: &str) -> Option<PathBuf> {
    let with_ext = dir.join(format!("{resource}{RECORD_EXT}"));
    if with_ext.is_file() {
        return Some(with_ext);
    }
    if resource.ends_with(RECORD_EXT) {
        let bare = dir.join(resource);
        if bare.is_file() {
            return Some(bare);
        }
    }
    None
}

fn tmp_path_for(record: &Path) -> PathBuf {
    let mut name = record.as_os_str().to_os_string();
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

/// Whether `path` is the temporary file of an in-flight record write.
fn is_tmp_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(TMP_SUFFIX))
        .is_some_and(|n| n.ends_with(RECORD_EXT))
}

#[cfg(unix)]
fn create_dir_all(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(mode)
        .create(path)
        .map_err(|e| StoreError::io(path, e))
}

#[cfg(not(unix))]
fn create_dir_all(path: &Path, _mode: u32) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| StoreError::io(path, e))
}

#[cfg(unix)]
fn open_for_write(path: &Path, mode: u32) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_write(path: &Path, _mode: u32) -> io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// Lexically normalize a path: drop `.` components, fold `..` into a
/// preceding normal component and map the empty path to `.`.
pub(crate) fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
