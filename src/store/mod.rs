//! Note store - the persistence collaborator.
//!
//! The synchronization core talks to storage only through the [`NoteStore`]
//! trait, injected at construction. Two implementations are provided:
//! SQLite via SQLx for the standalone daemon, and an in-memory store for
//! tests and fault injection.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use thiserror::Error;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("no such note: {0}")]
    NoteMissing(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// A known user record. Existence of a record is what turns a handshake
/// identity claim into a bound session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
}

/// Note visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Map from the stored integer flag.
    pub fn from_flag(public: bool) -> Self {
        if public { Self::Public } else { Self::Private }
    }

    /// Whether this is the public visibility.
    pub fn is_public(self) -> bool {
        self == Self::Public
    }
}

/// A shared text note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    /// Owning user id. The owner is always implicitly authorized.
    pub owner: String,
    pub content: String,
    pub visibility: Visibility,
    /// Unix timestamp of the last content update.
    pub updated_at: i64,
}

/// Storage collaborator interface consumed by the synchronization core.
///
/// The create/share operations at the bottom belong to the external CRUD
/// surface; they are carried here so the daemon and its tests can seed
/// state without reaching around the trait.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Look up a user record by id.
    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Look up a note by id.
    async fn get_note_by_id(&self, id: &str) -> Result<Option<Note>, StoreError>;

    /// All notes `user_id` may read: public, owned, or granted.
    ///
    /// Returned in stable insertion order; the first entry is the primary
    /// room for the initial roster snapshot.
    async fn list_accessible_notes(&self, user_id: &str) -> Result<Vec<Note>, StoreError>;

    /// Replace a note's content. Visibility is never changed by an edit.
    async fn update_note_content(&self, id: &str, content: &str) -> Result<(), StoreError>;

    /// User ids granted access to a private note. The owner need not appear.
    async fn get_permitted_users(&self, note_id: &str) -> Result<Vec<String>, StoreError>;

    /// Create a user record.
    async fn create_user(&self, user: &User) -> Result<(), StoreError>;

    /// Create a note.
    async fn create_note(&self, note: &Note) -> Result<(), StoreError>;

    /// Grant `user_id` access to `note_id`. Idempotent.
    async fn add_permission(&self, note_id: &str, user_id: &str) -> Result<(), StoreError>;
}
