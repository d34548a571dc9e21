//! Data models shared by storage, access rules, and the HTTP layer.

/// Attachment metadata and blob identifiers.
pub mod attachment;
/// Caller identity.
pub mod identity;
/// Paste records, visibility, and request payloads.
pub mod paste;
