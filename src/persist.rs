//! Disk I/O helpers: load from file and atomic write.
//!
//! The rename-over approach is atomic on POSIX filesystems as long as the
//! temp file and the target live in the same directory, which is why the temp
//! file is a sibling of the target. On FAT32 or network shares there are no
//! hard guarantees.

use crate::error::{Error, Result};
use crate::serializer::Serializer;
use crate::Document;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Raw bytes of the file at `path`, or `None` if it doesn't exist.
pub fn read_raw(path: &Path) -> Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(b) => Ok(Some(b)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::StorageUnavailable(e.to_string())),
    }
}

/// Decode file contents. Blank contents decode to an empty document.
pub fn decode<S>(bytes: &[u8], serializer: &S) -> Result<Document>
where
    S: Serializer,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }
    serializer.deserialize(bytes)
}

/// Reads and deserializes the file at `path`. Returns an empty document if the
/// file is missing or empty (not an error).
pub fn load<S>(path: &Path, serializer: &S) -> Result<Document>
where
    S: Serializer,
{
    match read_raw(path)? {
        Some(bytes) => decode(&bytes, serializer),
        None => {
            log::debug!("{} does not exist yet, reading as empty", path.display());
            Ok(Document::new())
        }
    }
}

/// Like [`load`], but a missing file is [`Error::StorageUnavailable`]. Also
/// returns the [`content_tag`] of the bytes that were decoded.
pub fn load_existing<S>(path: &Path, serializer: &S) -> Result<(Document, String)>
where
    S: Serializer,
{
    let bytes = read_raw(path)?.ok_or_else(|| {
        Error::StorageUnavailable(format!("{} does not exist", path.display()))
    })?;
    let doc = decode(&bytes, serializer)?;
    Ok((doc, content_tag(&bytes)))
}

/// Hex SHA-256 of file contents, used as an HTTP entity tag.
pub fn content_tag(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Sibling temp path used by [`atomic_write`]: `data.json` -> `data.json.tmp`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    path.with_extension(format!("{ext}.tmp"))
}

/// Write `bytes` to `<path>.tmp`, fsync it, then rename over `path`. Readers
/// see either the old file or the new one, never a prefix of either.
///
/// Callers must serialize concurrent writers themselves; two writers sharing
/// the same temp path would clobber each other before the rename.
pub fn atomic_write(path: &Path, bytes: &[u8], create_dirs: bool) -> Result<()> {
    if create_dirs {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }
    let tmp = temp_path_for(path);
    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        Error::StorageUnavailable(e.to_string())
    })?;
    log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
