//! Core domain library for Pastebox (config, blob storage, metadata, access rules).

/// Attachment access path and read-side paste views.
pub mod access;
/// On-disk attachment blob storage.
pub mod blob;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Metadata database layer.
pub mod db;
/// Process environment helpers.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Data models for API requests and persistence.
pub mod models;
/// Write-side paste and attachment operations.
pub mod paste_ops;
/// Paste and attachment slug helpers.
pub mod slug;

#[cfg(test)]
pub(crate) mod test_support;

pub use blob::{BlobError, BlobReader, BlobStore};
pub use config::Config;
pub use constants::{DEFAULT_MAX_PASTE_SIZE, DEFAULT_PORT};
pub use db::Database;
pub use error::AppError;
pub use models::identity::Identity;
