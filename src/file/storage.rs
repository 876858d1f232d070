//! Blob storage for Cabinet.
//!
//! Uploaded bytes live outside the metadata store and are addressed by an
//! opaque location string kept on the file record.

use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::{CabinetError, Result};

/// A blob that has been written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Unique filename inside the store (UUID.extension).
    pub stored_name: String,
    /// Opaque location used for later `open` / `remove` calls.
    pub location: String,
    /// Number of bytes written.
    pub size: u64,
}

/// Readable blob content.
pub struct BlobReader {
    /// Content reader.
    pub reader: Box<dyn Read + Send>,
    /// Size in bytes.
    pub size: u64,
}

impl BlobReader {
    /// Read the whole blob into memory.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        let mut content = Vec::with_capacity(self.size as usize);
        self.reader.read_to_end(&mut content)?;
        Ok(content)
    }
}

impl std::fmt::Debug for BlobReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobReader")
            .field("size", &self.size)
            .finish()
    }
}

/// Storage backend for file content.
pub trait BlobStore: Send + Sync {
    /// Persist `content`, deriving the stored name's extension from `suggested_name`.
    fn store(&self, content: &[u8], suggested_name: &str) -> Result<StoredBlob>;

    /// Remove a blob.
    ///
    /// Returns `false` when there was nothing to remove.
    fn remove(&self, location: &str) -> Result<bool>;

    /// Open a blob for reading.
    ///
    /// A missing blob surfaces as `CabinetError::Io`, not as a domain `NotFound`.
    fn open(&self, location: &str) -> Result<BlobReader>;
}

/// Filesystem blob store.
///
/// Files are stored in a sharded directory structure:
/// ```text
/// {base_path}/
/// ├── ab/
/// │   └── ab12cd34-5678-90ab-cdef-123456789012.txt
/// └── cd/
///     └── cd90ab12-3456-7890-abcd-ef1234567890.bin
/// ```
/// The location of a blob is its path relative to `base_path`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage rooted at `base_path`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Absolute path for a location.
    ///
    /// Locations must be relative and must not step outside the base directory.
    pub fn resolve(&self, location: &str) -> Result<PathBuf> {
        let relative = Path::new(location);
        let escapes = location.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(CabinetError::Validation(format!(
                "invalid blob location: {location}"
            )));
        }
        Ok(self.base_path.join(relative))
    }

    /// Location string for a stored name: `{shard}/{stored_name}`.
    pub fn location_for(stored_name: &str) -> String {
        format!("{}/{}", Self::shard(stored_name), stored_name)
    }

    /// First two characters of the stored name (UUID prefix).
    fn shard(stored_name: &str) -> &str {
        stored_name.get(..2).unwrap_or(stored_name)
    }

    /// File extension of `filename`, or "bin" when it has none.
    fn extract_extension(filename: &str) -> &str {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("bin")
    }

    /// Generate a new UUID-based stored name keeping the original extension.
    pub fn generate_stored_name(original_name: &str) -> String {
        let ext = Self::extract_extension(original_name);
        format!("{}.{ext}", Uuid::new_v4())
    }
}

impl BlobStore for FileStorage {
    fn store(&self, content: &[u8], suggested_name: &str) -> Result<StoredBlob> {
        let stored_name = Self::generate_stored_name(suggested_name);
        let location = Self::location_for(&stored_name);
        let path = self.resolve(&location)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;

        Ok(StoredBlob {
            stored_name,
            location,
            size: content.len() as u64,
        })
    }

    fn remove(&self, location: &str) -> Result<bool> {
        let path = self.resolve(location)?;

        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn open(&self, location: &str) -> Result<BlobReader> {
        let path = self.resolve(location)?;
        let file = fs::File::open(&path)?;
        let size = file.metadata()?.len();

        Ok(BlobReader {
            reader: Box::new(file),
            size,
        })
    }
}
