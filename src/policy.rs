//! Access policy evaluation.
//!
//! Pure decision functions shared by the real-time path and any outer CRUD
//! surface. Read and edit share one rule: there is no read-only permitted
//! tier, so anyone who can view a note can also edit it. Sharing is
//! owner-only.

use crate::store::{Note, Visibility};
use std::collections::HashSet;

/// May `user_id` read `note`?
///
/// True for public notes, the owner, and explicitly permitted users. The
/// owner never needs to appear in the permitted set.
pub fn can_read(note: &Note, user_id: &str, permitted: &HashSet<String>) -> bool {
    note.visibility == Visibility::Public || note.owner == user_id || permitted.contains(user_id)
}

/// May `user_id` edit `note`? Identical to [`can_read`] in this system.
pub fn can_edit(note: &Note, user_id: &str, permitted: &HashSet<String>) -> bool {
    can_read(note, user_id, permitted)
}

/// May `user_id` share `note`? Owner-only.
pub fn can_share(note: &Note, user_id: &str) -> bool {
    note.owner == user_id
}
