//! Shared constants used across Pastebox crates.

use std::time::Duration;

/// Default API port for Pastebox.
pub const DEFAULT_PORT: u16 = 38411;

/// Default maximum paste text size accepted by the JSON API.
pub const DEFAULT_MAX_PASTE_SIZE: usize = 10 * 1024 * 1024;

/// Default header an authenticating reverse proxy uses to name the caller.
pub const DEFAULT_AUTH_HEADER: &str = "x-remote-user";

/// File name for the redb metadata database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";

/// Suffix of committed blob files (`<uuid>.bin`).
pub const BLOB_FILE_SUFFIX: &str = "bin";
/// Suffix of in-flight blob writes; renamed onto the `.bin` name on commit.
pub const BLOB_PARTIAL_SUFFIX: &str = "part";
/// A `.part` file untouched for this long is treated as abandoned by a dead writer.
pub const BLOB_PARTIAL_GRACE: Duration = Duration::from_secs(60 * 60);

/// Chunk size used when copying blob bytes in either direction.
pub const BLOB_COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Length of generated paste slugs.
pub const SLUG_SHORT_LEN: usize = 10;
/// Length of generated "long" paste slugs, meant to resist enumeration.
pub const SLUG_LONG_LEN: usize = 40;
/// Upper bound for caller-provided slugs.
pub const SLUG_MAX_LEN: usize = 128;

/// MIME type recorded when an upload does not declare one.
pub const DEFAULT_ATTACHMENT_MIME: &str = "application/octet-stream";
