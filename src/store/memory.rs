//! In-memory note store for tests and fault injection.

use super::{Note, NoteStore, StoreError, User};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Vec-backed store preserving insertion order, so the "first accessible
/// note is the primary room" behavior is deterministic under test.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    notes: RwLock<Vec<Note>>,
    permissions: RwLock<Vec<(String, String)>>,
    fail_updates: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force subsequent `update_note_content` calls to fail, exercising the
    /// swallowed persistence-failure path.
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().iter().find(|u| u.id == id).cloned())
    }

    async fn get_note_by_id(&self, id: &str) -> Result<Option<Note>, StoreError> {
        Ok(self.notes.read().iter().find(|n| n.id == id).cloned())
    }

    async fn list_accessible_notes(&self, user_id: &str) -> Result<Vec<Note>, StoreError> {
        let permissions = self.permissions.read();
        Ok(self
            .notes
            .read()
            .iter()
            .filter(|n| {
                n.visibility.is_public()
                    || n.owner == user_id
                    || permissions
                        .iter()
                        .any(|(note, user)| *note == n.id && user == user_id)
            })
            .cloned()
            .collect())
    }

    async fn update_note_content(&self, id: &str, content: &str) -> Result<(), StoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Internal("injected update failure".into()));
        }
        let mut notes = self.notes.write();
        let note = notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| StoreError::NoteMissing(id.to_string()))?;
        note.content = content.to_string();
        note.updated_at = chrono::Utc::now().timestamp();
        Ok(())
    }

    async fn get_permitted_users(&self, note_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .permissions
            .read()
            .iter()
            .filter(|(note, _)| note == note_id)
            .map(|(_, user)| user.clone())
            .collect())
    }

    async fn create_user(&self, user: &User) -> Result<(), StoreError> {
        self.users.write().push(user.clone());
        Ok(())
    }

    async fn create_note(&self, note: &Note) -> Result<(), StoreError> {
        self.notes.write().push(note.clone());
        Ok(())
    }

    async fn add_permission(&self, note_id: &str, user_id: &str) -> Result<(), StoreError> {
        let mut permissions = self.permissions.write();
        let pair = (note_id.to_string(), user_id.to_string());
        if !permissions.contains(&pair) {
            permissions.push(pair);
        }
        Ok(())
    }
}
