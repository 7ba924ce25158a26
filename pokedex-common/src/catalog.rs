use std::future::Future;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::constants::CATALOG_PAGE_SIZE;
use crate::structs::CardRecord;
use crate::{Error, Result};

/// Lookup side of the card catalog service.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch a single card, `None` when the id is unknown.
    async fn find(&self, id: &str) -> Result<Option<CardRecord>>;
    /// All cards whose name matches `name`, in a stable order.
    async fn search(&self, name: &str) -> Result<Vec<CardRecord>>;
}

#[derive(Debug, Deserialize)]
struct Images {
    large: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCard {
    id: String,
    name: String,
    hp: Option<String>,
    images: Images,
    rarity: Option<String>,
    supertype: String,
    #[serde(default)]
    subtypes: Vec<String>,
    #[serde(default)]
    types: Vec<String>,
}

impl From<ApiCard> for CardRecord {
    fn from(card: ApiCard) -> CardRecord {
        CardRecord {
            // hp comes as a string ("60") and is absent for trainers and energies.
            hp: card.hp.and_then(|hp| hp.trim().parse().ok()),
            id: card.id,
            name: card.name,
            image: card.images.large,
            rarity: card.rarity,
            supertype: card.supertype,
            subtypes: card.subtypes,
            types: card.types,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CardResponse {
    data: ApiCard,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    data: Vec<ApiCard>,
    total_count: usize,
}

/// Card ids look like `sm1-1` or `swsh12pt5gg-GG01`.
fn is_card_id(id: &str) -> bool {
    // "." and ".." would be normalized away into the list endpoint.
    !id.starts_with('.')
        && id.chars().any(|c| c.is_ascii_alphanumeric())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

fn check_status(status: StatusCode) -> Result<()> {
    if !status.is_success() {
        return Err(Error::CatalogStatus(status.as_u16()));
    }
    Ok(())
}

///
/// Walk the search pages from page 1 until `totalCount` cards are collected
/// or the catalog hands out an empty page.
///
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<CardRecord>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<SearchResponse>>,
{
    let mut cards: Vec<CardRecord> = Vec::new();
    let mut page = 1usize;
    loop {
        let body = fetch(page).await?;
        let received = body.data.len();
        cards.extend(body.data.into_iter().map(CardRecord::from));
        if received == 0 || cards.len() >= body.total_count {
            return Ok(cards);
        }
        page += 1;
    }
}

/// Builds the `q` parameter for an exact name search.
fn name_query(name: &str) -> String {
    format!("name:\"{}\"", name.replace('"', ""))
}

/// Client for the pokemontcg.io v2 REST API.
pub struct PokemonTcgClient {
    client: reqwest::Client,
    api_url: String,
}

impl PokemonTcgClient {
    pub fn new(api_url: &str, api_key: Option<String>) -> Result<PokemonTcgClient> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            match HeaderValue::from_str(&key) {
                Ok(value) => {
                    headers.insert("x-api-key", value);
                }
                Err(_) => {
                    warn!("Ignoring catalog API key with invalid characters");
                }
            }
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(PokemonTcgClient {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Catalog for PokemonTcgClient {
    async fn find(&self, id: &str) -> Result<Option<CardRecord>> {
        if !is_card_id(id) {
            debug!("Refusing to look up malformed card id {:?}", id);
            return Ok(None);
        }
        trace!("Fetching card {}", id);
        let response = self
            .client
            .get(format!("{}/cards/{}", self.api_url, id))
            .send()
            .await?;
        // The API answers 404 for unknown ids and 400 for ids it cannot parse.
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST
        ) {
            debug!("Card {} not found in catalog", id);
            return Ok(None);
        }
        check_status(response.status())?;
        let body: CardResponse = response.json().await?;
        Ok(Some(body.data.into()))
    }

    async fn search(&self, name: &str) -> Result<Vec<CardRecord>> {
        let query = name_query(name);
        let page_size = CATALOG_PAGE_SIZE.to_string();
        let cards = collect_pages(|page| {
            let query = query.as_str();
            let page_size = page_size.as_str();
            async move {
                trace!("Searching catalog for {} (page {})", query, page);
                let page_str = page.to_string();
                let response = self
                    .client
                    .get(format!("{}/cards", self.api_url))
                    .query(&[
                        ("q", query),
                        ("orderBy", "id"),
                        ("page", page_str.as_str()),
                        ("pageSize", page_size),
                    ])
                    .send()
                    .await?;
                check_status(response.status())?;
                Ok::<_, Error>(response.json::<SearchResponse>().await?)
            }
        })
        .await?;
        debug!("Catalog search for {} returned {} cards", name, cards.len());
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_api_card() {
        let body = r#"{
            "data": {
                "id": "sm1-1",
                "name": "Caterpie",
                "supertype": "Pokémon",
                "subtypes": ["Basic"],
                "hp": "40",
                "types": ["Grass"],
                "rarity": "Common",
                "images": {
                    "small": "https://images.pokemontcg.io/sm1/1.png",
                    "large": "https://images.pokemontcg.io/sm1/1_hires.png"
                }
            }
        }"#;
        let response: CardResponse = serde_json::from_str(body).unwrap();
        let card = CardRecord::from(response.data);
        assert_eq!(card.id, "sm1-1");
        assert_eq!(card.name, "Caterpie");
        assert_eq!(card.hp, Some(40));
        assert_eq!(card.image, "https://images.pokemontcg.io/sm1/1_hires.png");
        assert_eq!(card.subtypes, vec!["Basic".to_string()]);
        assert_eq!(card.types, vec!["Grass".to_string()]);
    }

    #[test]
    fn trainer_without_hp_or_types() {
        let body = r#"{
            "data": [{
                "id": "sm1-119",
                "name": "Hau",
                "supertype": "Trainer",
                "subtypes": ["Supporter"],
                "images": { "large": "https://images.pokemontcg.io/sm1/119_hires.png" }
            }],
            "page": 1,
            "pageSize": 250,
            "count": 1,
            "totalCount": 1
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.total_count, 1);
        let card = CardRecord::from(response.data.into_iter().next().unwrap());
        assert_eq!(card.hp, None);
        assert_eq!(card.rarity, None);
        assert!(card.types.is_empty());
    }

    #[test]
    fn card_id_shape() {
        assert!(is_card_id("sm1-1"));
        assert!(is_card_id("swsh12pt5gg-GG01"));
        assert!(!is_card_id(""));
        assert!(!is_card_id("../sets"));
        assert!(!is_card_id("sm1 1"));
        assert!(!is_card_id("."));
        assert!(!is_card_id(".."));
        assert!(!is_card_id("--"));
        assert!(!is_card_id(".sm1-1"));
    }

    #[test]
    fn name_query_is_quoted() {
        assert_eq!(name_query("Pikachu"), "name:\"Pikachu\"");
        assert_eq!(name_query("Mr. \"Mime\""), "name:\"Mr. Mime\"");
    }

    fn api_card(number: usize) -> ApiCard {
        ApiCard {
            id: format!("base1-{}", number),
            name: "Pikachu".to_string(),
            hp: Some("40".to_string()),
            images: Images {
                large: format!("https://images.pokemontcg.io/base1/{}_hires.png", number),
            },
            rarity: None,
            supertype: "Pokémon".to_string(),
            subtypes: vec![],
            types: vec![],
        }
    }

    fn search_page(numbers: std::ops::Range<usize>, total_count: usize) -> SearchResponse {
        SearchResponse {
            data: numbers.map(api_card).collect(),
            total_count,
        }
    }

    #[tokio::test]
    async fn collects_every_page_in_order() {
        let mut requested = Vec::new();
        let cards = collect_pages(|page| {
            requested.push(page);
            let body = match page {
                1 => search_page(0..250, 253),
                2 => search_page(250..253, 253),
                _ => panic!("asked for page {} past totalCount", page),
            };
            async move { Ok::<_, Error>(body) }
        })
        .await
        .unwrap();
        assert_eq!(requested, vec![1, 2]);
        assert_eq!(cards.len(), 253);
        assert_eq!(cards[0].id, "base1-0");
        assert_eq!(cards[252].id, "base1-252");
    }

    #[tokio::test]
    async fn stops_on_empty_page() {
        let mut requested = 0;
        let cards = collect_pages(|page| {
            requested += 1;
            // totalCount claims more than the catalog ever returns.
            let body = match page {
                1 => search_page(0..3, 10),
                _ => search_page(0..0, 10),
            };
            async move { Ok::<_, Error>(body) }
        })
        .await
        .unwrap();
        assert_eq!(requested, 2);
        assert_eq!(cards.len(), 3);
    }

    #[tokio::test]
    async fn no_matches_is_one_request() {
        let mut requested = 0;
        let cards = collect_pages(|_| {
            requested += 1;
            async move { Ok::<_, Error>(search_page(0..0, 0)) }
        })
        .await
        .unwrap();
        assert_eq!(requested, 1);
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn failing_page_aborts_search() {
        let result = collect_pages(|page| async move {
            match page {
                1 => Ok(search_page(0..250, 253)),
                _ => check_status(StatusCode::SERVICE_UNAVAILABLE).map(|_| search_page(0..0, 0)),
            }
        })
        .await;
        assert!(matches!(result, Err(Error::CatalogStatus(503))));
    }

    #[test]
    fn status_check() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS),
            Err(Error::CatalogStatus(429))
        ));
    }
}
