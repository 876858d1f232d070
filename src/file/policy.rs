//! Visibility and ownership rules for files.
//!
//! These are pure predicates over records that have already been fetched.
//! Callers turn a `false` into `NotFound` so that private files stay hidden
//! from everyone but their owner.

use super::metadata::FileMetadata;

/// The party making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Principal {
    /// No authenticated user.
    #[default]
    Anonymous,
    /// An authenticated user, identified by ID.
    User(i64),
}

impl Principal {
    /// Build a principal from an optional user ID.
    pub fn from_user_id(user_id: Option<i64>) -> Self {
        user_id.map_or(Principal::Anonymous, Principal::User)
    }

    /// The authenticated user ID, if any.
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Principal::Anonymous => None,
            Principal::User(id) => Some(*id),
        }
    }

    /// Whether the principal is the given user.
    pub fn is(&self, user_id: i64) -> bool {
        self.user_id() == Some(user_id)
    }
}

/// Whether `principal` may read `file`.
///
/// Public files are readable by anyone; private files only by their owner.
pub fn can_read(principal: &Principal, file: &FileMetadata) -> bool {
    file.is_public || principal.is(file.user_id)
}

/// Whether `principal` may delete, move or edit `file`.
///
/// Only the owner may; visibility grants no mutation rights.
pub fn can_mutate(principal: &Principal, file: &FileMetadata) -> bool {
    principal.is(file.user_id)
}
