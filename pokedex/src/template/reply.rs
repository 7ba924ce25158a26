use pokedex_common::command::UsageError;
use pokedex_common::ledger::{AddOutcome, RemoveOutcome};
use pokedex_common::structs::CardRecord;
use pokedex_common::Error;

/// Discord caps embed descriptions at this many characters.
pub const MAX_DESCRIPTION_LEN: usize = 4096;

pub const NO_RESULTS: &str = "Sorry, no pokemons found with this name";
pub const EXHAUSTED: &str = "There are no more pokemons with this name";
pub const FORWARD_PROMPT: &str = "Please forward me the picture of the card that you have";
pub const EMPTY_POKEDEX: &str = "Your Pokedex is empty";
pub const NOT_OWNED: &str = "You don't have a pokemon with this id";
pub const INCORRECT_PICTURE: &str = "Incorrect picture or pokemon id is missing, please try again";
pub const DELIVERY_FAILED: &str = "Sorry, I couldn't send the pictures of these cards";
pub const CATALOG_FAILED: &str = "Sorry, the card catalog is not reachable right now, please try again later";
pub const STORAGE_FAILED: &str = "Sorry, something went wrong with your Pokedex, please try again later";

pub fn help(prefix: &str) -> String {
    format!(
        "Hello. Check the list of the commands:\n\
        `{0}start`: Start Bot\n\
        `{0}find <name>`: Find all existing cards by the pokemon name\n\
        `{0}list`: Show the list of your cards\n\
        `{0}delete <id>`: Delete pokemon by the pokemon id\n\
        Send a picture with the card id as its text to add it to your Pokedex.",
        prefix
    )
}

pub fn usage(error: UsageError) -> &'static str {
    match error {
        UsageError::MissingName => "Please specify the pokemon name after the command",
        UsageError::MissingId => "Please specify the pokemon id after the command",
        UsageError::MissingCaption => INCORRECT_PICTURE,
    }
}

/// Generic reply for a failed external dependency.
pub fn failure(error: &Error) -> &'static str {
    if error.is_catalog() {
        CATALOG_FAILED
    } else {
        STORAGE_FAILED
    }
}

pub fn added(outcome: &AddOutcome) -> String {
    match outcome {
        AddOutcome::Added(card) => {
            format!("{} ({}) has been added to your Pokedex", card.name, card.id)
        }
        AddOutcome::AlreadyOwned(card) => {
            format!("You have {} ({}) in your Pokedex already", card.name, card.id)
        }
        AddOutcome::UnknownCard => INCORRECT_PICTURE.to_string(),
    }
}

pub fn removed(outcome: &RemoveOutcome) -> String {
    match outcome {
        RemoveOutcome::Deleted(card) => {
            format!("{} ({}) has been deleted from your Pokedex", card.name, card.id)
        }
        RemoveOutcome::NotOwned => NOT_OWNED.to_string(),
    }
}

pub fn pokedex(cards: &[CardRecord]) -> String {
    if cards.is_empty() {
        return EMPTY_POKEDEX.to_string();
    }
    let mut message = String::new();
    for (i, card) in cards.iter().enumerate() {
        message.push_str(&format!("{}. {} ({})\n", i + 1, card.name, card.id));
    }
    message
}

///
/// Split `text` into pieces of at most `limit` characters, breaking at line
/// ends when possible.
///
pub fn chunk(text: &str, limit: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();
        if current_len + line_len > limit && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > limit {
            // A single line longer than a whole chunk.
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, name: &str) -> CardRecord {
        CardRecord {
            id: id.to_string(),
            name: name.to_string(),
            hp: Some(40),
            image: String::new(),
            rarity: None,
            supertype: "Pokémon".to_string(),
            subtypes: vec![],
            types: vec![],
        }
    }

    #[test]
    fn add_replies() {
        let caterpie = card("sm1-1", "Caterpie");
        assert_eq!(
            added(&AddOutcome::Added(caterpie.clone())),
            "Caterpie (sm1-1) has been added to your Pokedex"
        );
        assert_eq!(
            added(&AddOutcome::AlreadyOwned(caterpie)),
            "You have Caterpie (sm1-1) in your Pokedex already"
        );
        assert_eq!(added(&AddOutcome::UnknownCard), INCORRECT_PICTURE);
    }

    #[test]
    fn delete_replies() {
        assert_eq!(
            removed(&RemoveOutcome::Deleted(card("sm1-1", "Caterpie"))),
            "Caterpie (sm1-1) has been deleted from your Pokedex"
        );
        assert_eq!(
            removed(&RemoveOutcome::NotOwned),
            "You don't have a pokemon with this id"
        );
    }

    #[test]
    fn pokedex_listing() {
        assert_eq!(pokedex(&[]), EMPTY_POKEDEX);
        let cards = vec![card("sm1-1", "Caterpie"), card("base1-58", "Pikachu")];
        assert_eq!(
            pokedex(&cards),
            "1. Caterpie (sm1-1)\n2. Pikachu (base1-58)\n"
        );
    }

    #[test]
    fn help_uses_prefix() {
        let text = help("~");
        assert!(text.contains("`~find <name>`"));
        assert!(!text.contains("`/find"));
    }

    #[test]
    fn failure_names_the_dependency() {
        assert_eq!(failure(&Error::CatalogStatus(503)), CATALOG_FAILED);
        assert_eq!(failure(&Error::MissingEnv("MONGODB_URL")), STORAGE_FAILED);
    }

    #[test]
    fn no_results_and_exhausted_differ() {
        assert_ne!(NO_RESULTS, EXHAUSTED);
    }

    #[test]
    fn chunks_at_line_ends() {
        let text = "aaaa\nbbbb\ncccc\n";
        assert_eq!(chunk(text, 10), vec!["aaaa\nbbbb\n", "cccc\n"]);
        assert_eq!(chunk(text, 100), vec![text]);
        assert!(chunk("", 10).is_empty());
    }

    #[test]
    fn chunks_long_lines() {
        let text = "x".repeat(25);
        let chunks = chunk(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.concat(), text);
    }
}
