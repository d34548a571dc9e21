//! redb table definitions shared by storage modules.

use redb::TableDefinition;

/// Canonical paste rows keyed by paste id (`Paste`, bincode-encoded).
pub const PASTES: TableDefinition<&str, &[u8]> = TableDefinition::new("pastes");
/// Address index: `(owner, slug)` to paste id.
pub const PASTES_BY_SLUG: TableDefinition<(&str, &str), &str> =
    TableDefinition::new("pastes_by_slug");
/// Attachment rows keyed by `(paste_id, attachment_slug)` (`AttachmentRecord`, bincode-encoded).
pub const ATTACHMENTS: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("attachments");
