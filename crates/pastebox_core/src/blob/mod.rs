//! Attachment blob store: one file per [`BlobId`] directly under a root directory.
//!
//! The filesystem is the only index. Writes land in `<id>.part` and are renamed
//! onto `<id>.bin` once fully flushed, so a reader either sees a complete blob
//! or none at all. Committed files are never modified in place, which makes
//! concurrent readers of the same blob safe without locking.

mod checksum;
mod error;


pub use checksum::{checksum_of, ChecksumReader, ContentDigest};
pub use error::BlobError;

use crate::constants::{BLOB_COPY_CHUNK_SIZE, BLOB_PARTIAL_GRACE, BLOB_PARTIAL_SUFFIX};
use crate::models::attachment::BlobId;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::SystemTime;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt, BufReader, ReadBuf};

/// Handle to a blob root directory.
///
/// Cheap to clone; holds no open files and no locks.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open (and create, if needed) a blob store rooted at `root`.
    ///
    /// Calling this repeatedly for the same root is harmless: committed blobs
    /// are kept, and only `.part` leftovers idle for longer than
    /// [`BLOB_PARTIAL_GRACE`] are removed. Writes still in flight through
    /// another handle keep their file.
    ///
    /// # Errors
    /// [`BlobError::Configuration`] when `root` is relative, or
    /// [`BlobError::Io`] when the directory cannot be created or scanned.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, BlobError> {
        let root = root.as_ref();
        if !root.is_absolute() {
            return Err(BlobError::Configuration(format!(
                "blob store root must be an absolute path, got '{}'",
                root.display()
            )));
        }
        std::fs::create_dir_all(root).map_err(BlobError::Io)?;

        let store = Self {
            root: root.to_path_buf(),
        };
        let swept = store.sweep_partial_writes().map_err(BlobError::Io)?;
        if swept > 0 {
            tracing::warn!(
                root = %store.root.display(),
                swept,
                "Removed leftovers of interrupted blob writes"
            );
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn blob_path(&self, id: &BlobId) -> PathBuf {
        self.root.join(id.file_name())
    }

    fn partial_path(&self, id: &BlobId) -> PathBuf {
        self.root.join(format!("{}.{}", id, BLOB_PARTIAL_SUFFIX))
    }

    fn sweep_partial_writes(&self) -> io::Result<usize> {
        let mut removed = 0;
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_partial =
                path.extension().and_then(|ext| ext.to_str()) == Some(BLOB_PARTIAL_SUFFIX);
            if !is_partial || !is_abandoned(&path)? {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err),
            }
        }
        Ok(removed)
    }

    /// Stream `source` to disk as the blob for `id`.
    ///
    /// Bytes are copied in [`BLOB_COPY_CHUNK_SIZE`] chunks, flushed and synced,
    /// then atomically moved into place, replacing any earlier blob with the
    /// same id. On failure or cancellation the in-flight `.part` file is
    /// removed and no `.bin` file appears.
    ///
    /// # Returns
    /// Number of bytes written.
    ///
    /// # Errors
    /// [`BlobError::Io`] when the file cannot be created, the source fails
    /// mid-copy, or the final rename fails.
    pub async fn write<R>(&self, id: &BlobId, source: R) -> Result<u64, BlobError>
    where
        R: AsyncRead + Unpin,
    {
        let partial = PartialWrite::new(self.partial_path(id));
        let mut file = fs::File::create(partial.path())
            .await
            .map_err(BlobError::Io)?;

        let mut reader = BufReader::with_capacity(BLOB_COPY_CHUNK_SIZE, source);
        let written = tokio::io::copy_buf(&mut reader, &mut file)
            .await
            .map_err(BlobError::Io)?;
        file.flush().await.map_err(BlobError::Io)?;
        file.sync_all().await.map_err(BlobError::Io)?;
        drop(file);

        fs::rename(partial.path(), self.blob_path(id))
            .await
            .map_err(BlobError::Io)?;
        partial.committed();
        Ok(written)
    }

    /// Open the blob for `id` for streaming.
    ///
    /// The returned reader owns the file handle; dropping it releases the
    /// handle whether or not the stream was consumed.
    ///
    /// # Errors
    /// [`BlobError::NotFound`] when no committed blob exists, otherwise
    /// [`BlobError::Io`].
    pub async fn read(&self, id: &BlobId) -> Result<BlobReader, BlobError> {
        let file = fs::File::open(self.blob_path(id)).await?;
        let len = file.metadata().await.map_err(BlobError::Io)?.len();
        Ok(BlobReader { file, len })
    }

    /// Remove the blob for `id`.
    ///
    /// # Errors
    /// [`BlobError::NotFound`] when no committed blob exists, otherwise
    /// [`BlobError::Io`].
    pub async fn delete(&self, id: &BlobId) -> Result<(), BlobError> {
        fs::remove_file(self.blob_path(id)).await?;
        Ok(())
    }

    /// Whether a committed blob exists for `id`.
    pub async fn contains(&self, id: &BlobId) -> Result<bool, BlobError> {
        fs::try_exists(self.blob_path(id))
            .await
            .map_err(BlobError::Io)
    }
}

/// Whether a `.part` file has gone unmodified for longer than the grace period.
///
/// A live writer bumps the modification time with every chunk. Timestamps in
/// the future count as fresh.
fn is_abandoned(path: &Path) -> io::Result<bool> {
    let modified = match std::fs::metadata(path) {
        Ok(meta) => meta.modified()?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    Ok(SystemTime::now()
        .duration_since(modified)
        .is_ok_and(|idle| idle > BLOB_PARTIAL_GRACE))
}

/// Removes an uncommitted `.part` file when dropped.
struct PartialWrite {
    path: PathBuf,
    committed: bool,
}

impl PartialWrite {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn committed(mut self) {
        self.committed = true;
    }
}

impl Drop for PartialWrite {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Discarded incomplete blob write");
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Failed to discard incomplete blob write"
                );
            }
        }
    }
}

/// Single-pass byte stream over one committed blob.
#[derive(Debug)]
pub struct BlobReader {
    file: fs::File,
    len: u64,
}

impl BlobReader {
    /// Size of the blob in bytes, taken when it was opened.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsyncRead for BlobReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}
