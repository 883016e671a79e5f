//! Document store and its builder.

use crate::error::{Error, Result};
use crate::persist::{atomic_write, content_tag, load, load_existing, read_raw};
use crate::serializer::{JsonSerializer, Serializer};
use crate::Document;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

/// Persistent single-file JSON document.
///
/// The whole array is the unit of ownership: [`read`](Self::read) hands out
/// a fresh copy, [`replace`](Self::replace) swaps the file wholesale.
///
/// # Concurrency
///
/// Every operation goes through one `RwLock` owned by the store. Reads share
/// it; `replace`, [`replace_if`](Self::replace_if) and [`update`](Self::update)
/// hold it exclusively for the whole temp-write-fsync-rename, so replaces are
/// totally ordered and no read ever sees a half-written file. The lock also
/// guards a revision counter that bumps on every successful replace; use it
/// with `replace_if` for optimistic read-modify-write across requests, or use
/// `update` to do the whole cycle under the lock.
///
/// The revision restarts at 0 with every new store and knows nothing about
/// edits made to the file behind the store's back. Where the check has to
/// outlive the process (HTTP clients holding an `ETag`), use the content tag
/// instead: [`read_existing`](Self::read_existing) and
/// [`replace_if_tag`](Self::replace_if_tag) compare a SHA-256 of the bytes
/// actually on disk.
///
/// **Single-process only.** Two processes opening the same file are not
/// coordinated beyond the atomic rename.
pub struct DocumentStore {
    path: PathBuf,
    serializer: JsonSerializer,
    create_dirs: bool,
    revision: RwLock<u64>,
}

impl DocumentStore {
    /// Open a store at `path` with pretty-printed output. The file doesn't
    /// have to exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).build()
    }

    /// Start configuring a new store. Call [`.build()`](DocumentStoreBuilder::build)
    /// when ready.
    pub fn builder(path: impl AsRef<Path>) -> DocumentStoreBuilder {
        DocumentStoreBuilder::new(path)
    }

    // ---- reads ----

    /// Load the current document. Missing or empty file reads as `[]`;
    /// anything that isn't a JSON array is [`Error::CorruptDocument`].
    pub fn read(&self) -> Result<Document> {
        let _guard = self.revision.read();
        load(&self.path, &self.serializer)
    }

    /// Load the current document together with the revision it belongs to.
    pub fn read_with_revision(&self) -> Result<(Document, u64)> {
        let guard = self.revision.read();
        let doc = load(&self.path, &self.serializer)?;
        Ok((doc, *guard))
    }

    /// Strict read for the HTTP surface: a missing file is
    /// [`Error::StorageUnavailable`] rather than `[]`. A blank file still reads
    /// as `[]`. Also returns the content tag of what was read.
    pub fn read_existing(&self) -> Result<(Document, String)> {
        let _guard = self.revision.read();
        load_existing(&self.path, &self.serializer)
    }

    /// Content tag of the file as it is now. A missing file is tagged as
    /// empty contents.
    pub fn content_tag(&self) -> Result<String> {
        let _guard = self.revision.read();
        Ok(content_tag(&read_raw(&self.path)?.unwrap_or_default()))
    }

    /// Number of successful replaces since this store was opened.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.read()
    }

    /// Path to the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ---- writes ----

    /// Replace the stored document with `doc`, atomically.
    pub fn replace(&self, doc: &[serde_json::Value]) -> Result<()> {
        let mut rev = self.revision.write();
        self.write_locked(doc, &mut rev).map(|_| ())
    }

    /// Replace only if nobody else replaced since `expected` was observed.
    /// Returns the new revision.
    pub fn replace_if(&self, expected: u64, doc: &[serde_json::Value]) -> Result<u64> {
        let mut rev = self.revision.write();
        if *rev != expected {
            log::info!(
                "rejected replace of {}: based on revision {expected}, store at {}",
                self.path.display(),
                *rev
            );
            return Err(Error::Conflict {
                expected,
                actual: *rev,
            });
        }
        self.write_locked(doc, &mut rev)?;
        Ok(*rev)
    }

    /// Replace only if the file still has content tag `expected`. Returns the
    /// tag of the new contents. Fails with [`Error::Stale`] otherwise, which
    /// also catches edits made outside this store or before a restart.
    pub fn replace_if_tag(&self, expected: &str, doc: &[serde_json::Value]) -> Result<String> {
        let mut rev = self.revision.write();
        let actual = content_tag(&read_raw(&self.path)?.unwrap_or_default());
        if actual != expected {
            log::info!(
                "rejected replace of {}: based on content {expected}, file is at {actual}",
                self.path.display()
            );
            return Err(Error::Stale {
                expected: expected.to_owned(),
                actual,
            });
        }
        let bytes = self.write_locked(doc, &mut rev)?;
        Ok(content_tag(&bytes))
    }

    /// Read, let `f` mutate the document, write it back. The exclusive lock
    /// is held throughout, so concurrent `update` calls never lose each
    /// other's changes.
    ///
    /// If `f` panics or the write fails the file is left as it was.
    pub fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Document) -> R,
    {
        let mut rev = self.revision.write();
        let mut doc = load(&self.path, &self.serializer)?;
        let ret = f(&mut doc);
        self.write_locked(&doc, &mut rev)?;
        Ok(ret)
    }

    // ---- internal ----

    fn write_locked(&self, doc: &[serde_json::Value], rev: &mut u64) -> Result<Vec<u8>> {
        let bytes = self.serializer.serialize(doc)?;
        atomic_write(&self.path, &bytes, self.create_dirs)?;
        *rev += 1;
        log::info!(
            "replaced {} with {} record(s), revision {}",
            self.path.display(),
            doc.len(),
            *rev
        );
        Ok(bytes)
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("path", &self.path)
            .field("pretty", &self.serializer.is_pretty())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures and opens a [`DocumentStore`].
///
/// ```rust,no_run
/// use json_roster::DocumentStore;
///
/// let store = DocumentStore::builder("data/data.json")
///     .pretty(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct DocumentStoreBuilder {
    path: PathBuf,
    pretty: bool,
    create_dirs: bool,
}

impl DocumentStoreBuilder {
    fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pretty: true,
            create_dirs: true,
        }
    }

    /// Write indented JSON (default: `true`).
    pub fn pretty(mut self, yes: bool) -> Self {
        self.pretty = yes;
        self
    }

    /// Create the parent directory on the first replace if it is missing
    /// (default: `true`).
    pub fn create_dirs(mut self, yes: bool) -> Self {
        self.create_dirs = yes;
        self
    }

    /// Check the configuration and return the store. Nothing is read or
    /// written yet.
    pub fn build(self) -> Result<DocumentStore> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::Config("document path is empty".into()));
        }
        if self.path.is_dir() {
            return Err(Error::Config(format!(
                "{} is a directory, expected a file path",
                self.path.display()
            )));
        }

        let serializer = if self.pretty {
            JsonSerializer::pretty()
        } else {
            JsonSerializer::new()
        };

        Ok(DocumentStore {
            path: self.path,
            serializer,
            create_dirs: self.create_dirs,
            revision: RwLock::new(0),
        })
    }
}
