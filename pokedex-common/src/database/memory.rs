use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::database::Store;
use crate::structs::{CardRecord, OwnershipEntry, User};
use crate::Result;

#[derive(Default)]
struct Tables {
    users: HashMap<i64, User>,
    cards: HashMap<String, CardRecord>,
    pokedex: HashSet<OwnershipEntry>,
}

/// Store kept in process memory, lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub async fn user(&self, id: i64) -> Option<User> {
        self.tables.lock().await.users.get(&id).cloned()
    }

    pub async fn entry_count(&self) -> usize {
        self.tables.lock().await.pokedex.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert_user(&self, user: &User) -> Result<()> {
        self.tables.lock().await.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_card(&self, id: &str) -> Result<Option<CardRecord>> {
        Ok(self.tables.lock().await.cards.get(id).cloned())
    }

    async fn find_cards(&self, ids: &[String]) -> Result<Vec<CardRecord>> {
        let tables = self.tables.lock().await;
        // Deduplicated and sorted by id, like an index scan.
        let found: BTreeMap<&String, &CardRecord> = ids
            .iter()
            .filter_map(|id| tables.cards.get(id).map(|card| (id, card)))
            .collect();
        Ok(found.into_values().cloned().collect())
    }

    async fn insert_card(&self, card: &CardRecord) -> Result<()> {
        self.tables
            .lock()
            .await
            .cards
            .entry(card.id.clone())
            .or_insert_with(|| card.clone());
        Ok(())
    }

    async fn insert_entry(&self, entry: &OwnershipEntry) -> Result<bool> {
        Ok(self.tables.lock().await.pokedex.insert(entry.clone()))
    }

    async fn entry_exists(&self, entry: &OwnershipEntry) -> Result<bool> {
        Ok(self.tables.lock().await.pokedex.contains(entry))
    }

    async fn delete_entry(&self, entry: &OwnershipEntry) -> Result<bool> {
        Ok(self.tables.lock().await.pokedex.remove(entry))
    }

    async fn list_entries(&self, user_id: i64) -> Result<Vec<OwnershipEntry>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .pokedex
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect())
    }
}
