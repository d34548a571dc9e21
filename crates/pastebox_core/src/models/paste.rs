//! Paste data models.

use super::attachment::AttachmentSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who may see a paste.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasteVisibility {
    /// Visible to everyone and listed on the owner's page.
    #[default]
    Public,
    /// Visible to anyone holding the address; listed only to the owner.
    Unlisted,
    /// Visible to the owner (and elevated identities) only.
    Private,
}

/// Paste row stored in the metadata database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paste {
    pub id: String,
    pub owner: String,
    pub slug: String,
    pub title: Option<String>,
    pub content: String,
    pub visibility: PasteVisibility,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Listing row for an owner's paste page (no content).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PasteSummary {
    pub id: String,
    pub owner: String,
    pub slug: String,
    pub title: Option<String>,
    pub visibility: PasteVisibility,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub content_len: usize,
}

/// A paste together with its attachment records.
#[derive(Debug, Clone, Serialize)]
pub struct PasteView {
    #[serde(flatten)]
    pub paste: Paste,
    pub attachments: Vec<AttachmentSummary>,
}

/// Request payload for creating a paste.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePasteRequest {
    pub content: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub long_slug: bool,
    pub title: Option<String>,
    pub visibility: Option<PasteVisibility>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Paste {
    /// Create a public, non-expiring paste owned by `owner`.
    pub fn new(owner: String, slug: String, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner,
            slug,
            title: None,
            content,
            visibility: PasteVisibility::Public,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Whether the paste has passed its expiry time at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Whether the paste has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl From<&Paste> for PasteSummary {
    fn from(value: &Paste) -> Self {
        Self {
            id: value.id.clone(),
            owner: value.owner.clone(),
            slug: value.slug.clone(),
            title: value.title.clone(),
            visibility: value.visibility,
            created_at: value.created_at,
            expires_at: value.expires_at,
            content_len: value.content.len(),
        }
    }
}
