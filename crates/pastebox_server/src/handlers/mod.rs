//! HTTP request handlers.

/// Attachment download, upload, and delete endpoints.
pub mod attachment;
pub(crate) mod normalize;
/// Paste-related endpoints.
pub mod paste;
