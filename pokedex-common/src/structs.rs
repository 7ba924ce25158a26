use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: i64,
    pub username: String,
}

/// Card metadata as stored next to ownership entries.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CardRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub hp: Option<i32>,
    pub image: String,
    pub rarity: Option<String>,
    pub supertype: String,
    #[serde(default)]
    pub subtypes: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl CardRecord {
    /// Stand-in for a card neither the store nor the catalog can describe,
    /// named after its id.
    pub fn unresolved(id: &str) -> CardRecord {
        CardRecord {
            id: id.to_string(),
            name: id.to_string(),
            hp: None,
            image: String::new(),
            rarity: None,
            supertype: String::new(),
            subtypes: Vec::new(),
            types: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Hash)]
pub struct OwnershipEntry {
    pub user_id: i64,
    pub card_id: String,
}

impl OwnershipEntry {
    pub fn new(user_id: i64, card_id: &str) -> OwnershipEntry {
        OwnershipEntry {
            user_id,
            card_id: card_id.to_string(),
        }
    }
}
