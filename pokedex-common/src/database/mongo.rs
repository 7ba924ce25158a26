use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, Credential, FindOptions, IndexOptions, UpdateOptions};
use mongodb::{Client, Collection, IndexModel};
use std::env;
use tracing::{debug, info};

use crate::constants::{
    CARDS_COLLECTION, DUPLICATE_KEY_CODE, POKEDEX_COLLECTION, USERS_COLLECTION,
};
use crate::database::Store;
use crate::structs::{CardRecord, OwnershipEntry, User};
use crate::{Error, Result};

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(why)) => why.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Connection string from `MONGODB_URL`, or `MONGODB_HOST_PORT` as a fallback.
fn connection_url() -> Result<String> {
    if let Ok(url) = env::var("MONGODB_URL") {
        return Ok(url);
    }
    match env::var("MONGODB_HOST_PORT") {
        Ok(host_port) => Ok(format!("mongodb://{}", host_port)),
        Err(_) => Err(Error::MissingEnv("MONGODB_URL")),
    }
}

pub struct MongoStore {
    users: Collection<User>,
    cards: Collection<CardRecord>,
    pokedex: Collection<OwnershipEntry>,
}

impl MongoStore {
    ///
    /// Connect using the `MONGODB_*` environment variables and make sure the
    /// unique index on ownership pairs exists.
    ///
    pub async fn from_env(database: &str) -> Result<MongoStore> {
        let mut options = ClientOptions::parse(connection_url()?).await?;
        match env::var("MONGODB_USERNAME") {
            Ok(username) => {
                let password = env::var("MONGODB_PASSWORD")
                    .map_err(|_| Error::MissingEnv("MONGODB_PASSWORD"))?;
                options.credential = Some(
                    Credential::builder()
                        .username(username)
                        .password(password)
                        .build(),
                );
            }
            Err(_) => {
                info!("No MongoDB username provided, using authentication provided in the url");
            }
        }
        options.app_name = Some("pokedex".to_string());
        let client = Client::with_options(options)?;
        let store = MongoStore::new(&client, database);
        store.ensure_indexes().await?;
        Ok(store)
    }

    pub fn new(client: &Client, database: &str) -> MongoStore {
        let database = client.database(database);
        MongoStore {
            users: database.collection::<User>(USERS_COLLECTION),
            cards: database.collection::<CardRecord>(CARDS_COLLECTION),
            pokedex: database.collection::<OwnershipEntry>(POKEDEX_COLLECTION),
        }
    }

    async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "card_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.pokedex.create_index(index, None).await?;
        debug!("Ensured unique index on {}", POKEDEX_COLLECTION);
        Ok(())
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn upsert_user(&self, user: &User) -> Result<()> {
        self.users
            .update_one(
                doc! { "_id": user.id },
                doc! { "$set": { "username": user.username.as_str() } },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;
        Ok(())
    }

    async fn find_card(&self, id: &str) -> Result<Option<CardRecord>> {
        Ok(self.cards.find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_cards(&self, ids: &[String]) -> Result<Vec<CardRecord>> {
        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let cursor = self
            .cards
            .find(doc! { "_id": { "$in": ids.to_vec() } }, options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_card(&self, card: &CardRecord) -> Result<()> {
        match self.cards.insert_one(card, None).await {
            Ok(_) => Ok(()),
            // Another request stored the same card first.
            Err(why) if is_duplicate_key(&why) => Ok(()),
            Err(why) => Err(why.into()),
        }
    }

    async fn insert_entry(&self, entry: &OwnershipEntry) -> Result<bool> {
        match self.pokedex.insert_one(entry, None).await {
            Ok(_) => Ok(true),
            Err(why) if is_duplicate_key(&why) => Ok(false),
            Err(why) => Err(why.into()),
        }
    }

    async fn entry_exists(&self, entry: &OwnershipEntry) -> Result<bool> {
        let found = self
            .pokedex
            .find_one(
                doc! { "user_id": entry.user_id, "card_id": entry.card_id.as_str() },
                None,
            )
            .await?;
        Ok(found.is_some())
    }

    async fn delete_entry(&self, entry: &OwnershipEntry) -> Result<bool> {
        let result = self
            .pokedex
            .delete_one(
                doc! { "user_id": entry.user_id, "card_id": entry.card_id.as_str() },
                None,
            )
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_entries(&self, user_id: i64) -> Result<Vec<OwnershipEntry>> {
        let cursor = self.pokedex.find(doc! { "user_id": user_id }, None).await?;
        Ok(cursor.try_collect().await?)
    }
}
