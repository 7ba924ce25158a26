pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::structs::{CardRecord, OwnershipEntry, User};
use crate::Result;

/// Persistence used by the ledger.
///
/// Implementations must make [`Store::insert_entry`] atomic per
/// `(user_id, card_id)` pair.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert the user or refresh their display name.
    async fn upsert_user(&self, user: &User) -> Result<()>;
    async fn find_card(&self, id: &str) -> Result<Option<CardRecord>>;
    async fn find_cards(&self, ids: &[String]) -> Result<Vec<CardRecord>>;
    /// Store card metadata, keeping an existing record as is.
    async fn insert_card(&self, card: &CardRecord) -> Result<()>;
    /// `false` when the pair was already present.
    async fn insert_entry(&self, entry: &OwnershipEntry) -> Result<bool>;
    async fn entry_exists(&self, entry: &OwnershipEntry) -> Result<bool>;
    /// `false` when there was nothing to delete.
    async fn delete_entry(&self, entry: &OwnershipEntry) -> Result<bool>;
    async fn list_entries(&self, user_id: i64) -> Result<Vec<OwnershipEntry>>;
}
