use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::database::Store;
use crate::structs::{CardRecord, OwnershipEntry, User};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(CardRecord),
    AlreadyOwned(CardRecord),
    /// Neither the store nor the catalog know the id.
    UnknownCard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted(CardRecord),
    NotOwned,
}

/// Which cards each user owns.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn Store>,
    catalog: Arc<dyn Catalog>,
}

impl Ledger {
    pub fn new(store: Arc<dyn Store>, catalog: Arc<dyn Catalog>) -> Ledger {
        Ledger { store, catalog }
    }

    pub async fn register(&self, user: &User) -> Result<()> {
        self.store.upsert_user(user).await
    }

    /// Local record first, catalog second. Cards fetched from the catalog
    /// are stored so later lookups stay local.
    async fn resolve_card(&self, card_id: &str) -> Result<Option<CardRecord>> {
        if let Some(card) = self.store.find_card(card_id).await? {
            return Ok(Some(card));
        }
        let card = match self.catalog.find(card_id).await? {
            Some(card) => card,
            None => return Ok(None),
        };
        self.store.insert_card(&card).await?;
        debug!("Stored card {} ({})", card.name, card.id);
        Ok(Some(card))
    }

    pub async fn add(&self, user: &User, card_id: &str) -> Result<AddOutcome> {
        let card = match self.resolve_card(card_id).await? {
            Some(card) => card,
            None => return Ok(AddOutcome::UnknownCard),
        };
        self.store.upsert_user(user).await?;
        let entry = OwnershipEntry::new(user.id, &card.id);
        if self.store.insert_entry(&entry).await? {
            info!("User {} added {}", user.id, card.id);
            Ok(AddOutcome::Added(card))
        } else {
            Ok(AddOutcome::AlreadyOwned(card))
        }
    }

    /// Owned cards sorted by name, then id.
    pub async fn list(&self, user_id: i64) -> Result<Vec<CardRecord>> {
        let entries = self.store.list_entries(user_id).await?;
        let ids: Vec<String> = entries.into_iter().map(|entry| entry.card_id).collect();
        let mut known: HashMap<String, CardRecord> = self
            .store
            .find_cards(&ids)
            .await?
            .into_iter()
            .map(|card| (card.id.clone(), card))
            .collect();
        let mut cards = Vec::with_capacity(ids.len());
        for id in ids {
            match known.remove(&id) {
                Some(card) => cards.push(card),
                None => match self.resolve_card(&id).await? {
                    Some(card) => cards.push(card),
                    None => {
                        warn!("Owned card {} is unknown to the catalog", id);
                        cards.push(CardRecord::unresolved(&id));
                    }
                },
            }
        }
        cards.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(cards)
    }

    pub async fn remove(&self, user_id: i64, card_id: &str) -> Result<RemoveOutcome> {
        let entry = OwnershipEntry::new(user_id, card_id);
        if !self.store.entry_exists(&entry).await? {
            return Ok(RemoveOutcome::NotOwned);
        }
        // Read the name while the entry still exists.
        let card = match self.resolve_card(card_id).await? {
            Some(card) => card,
            None => CardRecord::unresolved(card_id),
        };
        if !self.store.delete_entry(&entry).await? {
            return Ok(RemoveOutcome::NotOwned);
        }
        info!("User {} deleted {}", user_id, card_id);
        Ok(RemoveOutcome::Deleted(card))
    }
}
