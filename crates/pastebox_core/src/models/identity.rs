//! Caller identity as resolved by the surrounding authentication layer.

use super::paste::{Paste, PasteVisibility};

/// The identity a request is made under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    User {
        username: String,
        /// Elevated identities may view and modify any paste.
        elevated: bool,
    },
}

impl Identity {
    /// Regular (non-elevated) user identity.
    pub fn user(username: impl Into<String>) -> Self {
        Self::User {
            username: username.into(),
            elevated: false,
        }
    }

    /// User identity holding the elevated capability.
    pub fn admin(username: impl Into<String>) -> Self {
        Self::User {
            username: username.into(),
            elevated: true,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::User { username, .. } => Some(username.as_str()),
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::User { elevated: true, .. })
    }

    /// Whether this identity owns `paste` or holds the elevated capability.
    pub fn can_modify(&self, paste: &Paste) -> bool {
        match self {
            Self::Anonymous => false,
            Self::User { username, elevated } => *elevated || *username == paste.owner,
        }
    }

    /// Whether `paste` may be shown when addressed directly.
    pub fn can_view(&self, paste: &Paste) -> bool {
        match paste.visibility {
            PasteVisibility::Public | PasteVisibility::Unlisted => true,
            PasteVisibility::Private => self.can_modify(paste),
        }
    }

    /// Whether `paste` appears in its owner's listing for this identity.
    pub fn can_list(&self, paste: &Paste) -> bool {
        match paste.visibility {
            PasteVisibility::Public => true,
            PasteVisibility::Unlisted | PasteVisibility::Private => self.can_modify(paste),
        }
    }
}
