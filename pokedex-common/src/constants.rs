/// Maximum number of cards shown in one gallery message.
pub const PAGE_SIZE: usize = 10;

pub const POKEMONTCG_API_URL: &str = "https://api.pokemontcg.io/v2";
/// Largest page the catalog service hands out per request.
pub const CATALOG_PAGE_SIZE: usize = 250;

/// Discord rejects component `custom_id`s longer than this.
pub const MAX_CURSOR_LEN: usize = 100;

pub const DEFAULT_DATABASE: &str = "pokedex";
pub const USERS_COLLECTION: &str = "users";
pub const CARDS_COLLECTION: &str = "pokemon";
pub const POKEDEX_COLLECTION: &str = "pokedex";

/// MongoDB server error code for unique index violations.
pub const DUPLICATE_KEY_CODE: i32 = 11000;
